//! JWT claims structure and token encoding/decoding.
//!
//! This module provides [`AuthClaims`], the core JWT claims structure used for
//! authentication tokens. Each token scopes the caller to a single
//! organization; there is no per-account or per-role information, since
//! authorization here is a matter of matching the caller's organization
//! against the resource being accessed.

use std::borrow::Cow;

use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use jiff::{Span, Timestamp};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extract::auth::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{ErrorKind, Result};

/// JWT claims for authentication tokens.
///
/// This structure contains both RFC 7519 standard JWT claims and service-specific claims.
#[derive(Debug, Clone, Deserialize, Serialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthClaims<T = ()> {
    // Standard (or registered) claims.
    /// Issuer (who created the token).
    #[serde(rename = "iss")]
    issued_by: Cow<'static, str>,
    /// Audience (who the token is intended for).
    #[serde(rename = "aud")]
    audience: Cow<'static, str>,
    /// Subject (the organization this token is scoped to).
    #[serde(rename = "sub")]
    pub organization_id: Uuid,

    /// Issued at (as Unix timestamp).
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Expiration time (as Unix timestamp).
    #[serde(rename = "exp")]
    pub expires_at: i64,

    // Private (or custom) claims
    #[serde(flatten)]
    pub custom_claims: T,
}

impl AuthClaims<()> {
    /// Creates a new JWT claims structure scoped to an organization.
    pub fn new(organization_id: Uuid, ttl: Span) -> Self {
        Self::with_custom_claims(organization_id, ttl, ())
    }
}

impl<T> AuthClaims<T> {
    /// Default JWT audience identifier for authentication tokens.
    const JWT_AUDIENCE: &str = "loom:server";
    /// Default JWT issuer identifier for authentication tokens.
    const JWT_ISSUER: &str = "loom";
    /// Default threshold for token expiration (5 minutes).
    const SOON_THRESHOLD_MINUTES: i64 = 5;

    /// Creates a new JWT claims structure with custom claims.
    pub fn with_custom_claims(organization_id: Uuid, ttl: Span, custom_claims: T) -> Self {
        let now = Timestamp::now();
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or(now)
            .as_second();

        Self {
            issued_by: Cow::Borrowed(Self::JWT_ISSUER),
            audience: Cow::Borrowed(Self::JWT_AUDIENCE),
            organization_id,
            issued_at: now.as_second(),
            expires_at,
            custom_claims,
        }
    }

    /// Checks if the token has expired based on current UTC time.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Timestamp::now().as_second()
    }

    /// Checks if the token will expire soon and should be refreshed.
    #[inline]
    #[must_use]
    pub fn expires_soon(&self) -> bool {
        let remaining_seconds = self.expires_at - Timestamp::now().as_second();
        remaining_seconds < Self::SOON_THRESHOLD_MINUTES * 60
    }

    /// Returns the remaining lifetime of this token.
    #[inline]
    #[must_use]
    pub fn remaining_lifetime(&self) -> Span {
        let remaining_seconds = self.expires_at - Timestamp::now().as_second();
        if remaining_seconds > 0 {
            Span::new().seconds(remaining_seconds)
        } else {
            Span::new()
        }
    }
}

impl<T> AuthClaims<T>
where
    T: Clone + Serialize,
{
    /// Encodes the claims into a signed JWT token string.
    ///
    /// # Errors
    ///
    /// Returns errors for JWT encoding failures.
    pub fn into_string(self, encoding_key: &EncodingKey) -> Result<String> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, &self, encoding_key).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %e,
                organization_id = %self.organization_id,
                "Failed to encode JWT token"
            );

            ErrorKind::InternalServerError
                .with_message("Authentication token generation failed")
                .with_context("Unable to create session token")
                .with_resource("authentication")
        })
    }

    /// Encodes the claims into a signed JWT token and creates an Authorization header.
    ///
    /// # Errors
    ///
    /// Returns errors for JWT encoding failures or invalid token format.
    pub fn into_header(
        self,
        encoding_key: &EncodingKey,
    ) -> Result<TypedHeader<Authorization<Bearer>>> {
        let organization_id = self.organization_id;
        let jwt_token = self.into_string(encoding_key)?;

        let bearer_auth = Authorization::bearer(&jwt_token).map_err(|_| {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                %organization_id,
                "Generated JWT token has invalid format for Authorization header"
            );

            ErrorKind::InternalServerError
                .with_message("Authentication header creation failed")
                .with_context("Generated token format is invalid")
                .with_resource("authentication")
        })?;

        Ok(TypedHeader(bearer_auth))
    }
}

impl<T> AuthClaims<T>
where
    T: Clone + for<'de> Deserialize<'de>,
{
    /// Parses and validates a JWT token from an Authorization header.
    ///
    /// This method performs comprehensive validation including:
    /// - Signature verification using HMAC-SHA256
    /// - Standard JWT claims validation (iss, aud, exp, etc.)
    /// - Expiration checking with detailed logging
    ///
    /// # Errors
    ///
    /// Returns various authentication errors for invalid tokens.
    pub fn from_header(
        auth_header: TypedHeader<Authorization<Bearer>>,
        decoding_key: &DecodingKey,
    ) -> Result<Self> {
        let auth_token = auth_header.token();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.validate_aud = true;
        validation.set_audience(&[Self::JWT_AUDIENCE]);
        validation.set_issuer(&[Self::JWT_ISSUER]);
        validation.set_required_spec_claims(&["iss", "aud", "sub", "iat", "exp"]);

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            audience = Self::JWT_AUDIENCE,
            issuer = Self::JWT_ISSUER,
            "Validating JWT token with strict security settings"
        );

        let token_data = decode::<Self>(auth_token, decoding_key, &validation).map_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %e,
                error_kind = ?e.kind(),
                "JWT token decode failed"
            );
            e
        })?;
        let claims = token_data.claims;

        if claims.is_expired() {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                organization_id = %claims.organization_id,
                expired_at = %claims.expires_at,
                "JWT token validation failed: token expired"
            );

            return Err(ErrorKind::Unauthorized
                .with_message("Authentication session has expired")
                .with_context("Please sign in again to continue")
                .with_resource("authentication"));
        }

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            organization_id = %claims.organization_id,
            expires_soon = claims.expires_soon(),
            remaining = ?claims.remaining_lifetime(),
            "JWT token validation completed successfully"
        );

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_hmac_signing() {
        let keys = crate::service::AuthKeys::new("test-secret-at-least-this-long").unwrap();
        let organization_id = Uuid::new_v4();
        let claims = AuthClaims::new(organization_id, Span::new().hours(1));

        let token = claims.clone().into_string(keys.encoding_key()).unwrap();

        let header = TypedHeader(Authorization::bearer(&token).unwrap());
        let decoded = AuthClaims::<()>::from_header(header, keys.decoding_key()).unwrap();

        assert_eq!(decoded.organization_id, organization_id);
    }

    #[test]
    fn rejects_expired_token() {
        let keys = crate::service::AuthKeys::new("test-secret-at-least-this-long").unwrap();
        let claims = AuthClaims::new(Uuid::new_v4(), Span::new().seconds(-60));
        let token = claims.into_string(keys.encoding_key()).unwrap();

        let header = TypedHeader(Authorization::bearer(&token).unwrap());
        assert!(AuthClaims::<()>::from_header(header, keys.decoding_key()).is_err());
    }
}
