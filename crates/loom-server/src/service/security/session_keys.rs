//! JWT signing key management.
//!
//! Tokens are signed with HMAC-SHA256 over a single shared secret rather than
//! an asymmetric keypair, since every component that issues or verifies a
//! token trusts the same process boundary.

use std::fmt;
use std::sync::Arc;

#[cfg(any(test, feature = "config"))]
use clap::Args;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use serde::{Deserialize, Serialize};

use crate::service::{Result, ServiceError};
use crate::utility::tracing_targets::SESSION_KEYS as TRACING_TARGET;

/// JWT signing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "config"), derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct AuthKeysConfig {
    /// Shared HMAC secret used to sign and verify JWTs.
    #[cfg_attr(any(test, feature = "config"), arg(long, env = "JWT_SECRET"))]
    pub jwt_secret: String,
}

/// Keys used to sign and verify JWT tokens.
#[derive(Clone)]
pub struct AuthKeys {
    inner: Arc<AuthKeysInner>,
}

struct AuthKeysInner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    secret: Box<[u8]>,
}

impl AuthKeys {
    /// The JWT algorithm used for signing and verification.
    pub const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Builds keys from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] if the configured secret is empty.
    pub fn from_config(config: &AuthKeysConfig) -> Result<Self> {
        Self::new(&config.jwt_secret)
    }

    /// Builds keys directly from a shared secret.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] if `secret` is empty.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(ServiceError::config("JWT_SECRET must not be empty"));
        }

        tracing::debug!(target: TRACING_TARGET, "loaded JWT signing secret");

        let inner = Arc::new(AuthKeysInner {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            secret: secret.into(),
        });

        Ok(Self { inner })
    }

    /// Returns the key used to sign outgoing tokens.
    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }

    /// Returns the key used to verify incoming tokens.
    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }

    /// Returns the raw shared secret, for HMAC uses other than JWT signing
    /// (e.g. resume token signatures).
    #[inline]
    pub fn secret_bytes(&self) -> &[u8] {
        &self.inner.secret
    }
}

impl fmt::Debug for AuthKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthKeys").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_secret() {
        assert!(AuthKeys::new("").is_err());
    }

    #[test]
    fn builds_from_config() {
        let config = AuthKeysConfig {
            jwt_secret: "test-secret-at-least-this-long".to_string(),
        };
        assert!(AuthKeys::from_config(&config).is_ok());
    }
}
