//! XChaCha20-Poly1305 encryption keys.

use chacha20poly1305::aead::{KeyInit, OsRng, rand_core::RngCore};
use hkdf::Hkdf;
use sha2::Sha256;

use super::error::{CryptoError, CryptoResult};

const KEY_SIZE: usize = 32;

/// A 256-bit symmetric encryption key.
#[derive(Clone)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    /// Generates a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Builds a key from exactly 32 raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds a key from a byte slice, failing if its length is not 32.
    pub fn try_from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        let array: [u8; KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength)?;
        Ok(Self(array))
    }

    /// Derives a key from a long-lived master secret and a purpose-specific
    /// `info` string via HKDF-SHA256, so different subsystems (e.g. connection
    /// credentials vs. resume tokens) never share the same derived key even
    /// when configured from the same root secret.
    pub fn derive_from_secret(secret: &[u8], info: &[u8]) -> CryptoResult<Self> {
        let hk = Hkdf::<Sha256>::new(None, secret);
        let mut okm = [0u8; KEY_SIZE];
        hk.expand(info, &mut okm)
            .map_err(|_| CryptoError::InvalidKeyLength)?;
        Ok(Self(okm))
    }

    /// Returns the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey").field("0", &"[redacted]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_distinct_keys() {
        let a = EncryptionKey::generate();
        let b = EncryptionKey::generate();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn derive_is_deterministic_for_same_info() {
        let secret = b"root-secret";
        let a = EncryptionKey::derive_from_secret(secret, b"connection-credentials").unwrap();
        let b = EncryptionKey::derive_from_secret(secret, b"connection-credentials").unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn derive_differs_by_info() {
        let secret = b"root-secret";
        let a = EncryptionKey::derive_from_secret(secret, b"connection-credentials").unwrap();
        let b = EncryptionKey::derive_from_secret(secret, b"resume-tokens").unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn rejects_wrong_length_slice() {
        let short = vec![0u8; 10];
        assert!(EncryptionKey::try_from_slice(&short).is_err());
    }
}
