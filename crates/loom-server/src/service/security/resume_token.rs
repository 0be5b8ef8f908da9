//! Resume token signature construction and verification.
//!
//! A resume token's signature is not stored; it is recomputed on
//! consumption from the token's own durable fields, so a forged or
//! tampered `tokenId`/`executionId`/`nodeId` always fails verification.

use hmac::{Hmac, Mac};
use jiff::Timestamp;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Computes the resume token signature: `HMAC-SHA256(secret, tokenId ++
/// executionId ++ nodeId ++ expiresAt.as_millisecond().to_be_bytes())`,
/// hex-encoded.
pub fn sign_resume_token(
    secret: &[u8],
    token_id: Uuid,
    execution_id: Uuid,
    node_id: &str,
    expires_at: Timestamp,
) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(token_id.as_bytes());
    mac.update(execution_id.as_bytes());
    mac.update(node_id.as_bytes());
    mac.update(&expires_at.as_millisecond().to_be_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies `candidate_hex` against the expected signature, in constant time.
pub fn verify_resume_token(
    secret: &[u8],
    token_id: Uuid,
    execution_id: Uuid,
    node_id: &str,
    expires_at: Timestamp,
    candidate_hex: &str,
) -> bool {
    let expected = sign_resume_token(secret, token_id, execution_id, node_id, expires_at);
    let expected = expected.as_bytes();
    let candidate = candidate_hex.as_bytes();
    expected.len() == candidate.len() && bool::from(expected.ct_eq(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trips() {
        let secret = b"resume-secret";
        let token_id = Uuid::new_v4();
        let execution_id = Uuid::new_v4();
        let expires_at = Timestamp::now();

        let signature = sign_resume_token(secret, token_id, execution_id, "node-1", expires_at);
        assert!(verify_resume_token(secret, token_id, execution_id, "node-1", expires_at, &signature));
    }

    #[test]
    fn signature_rejects_tampered_node_id() {
        let secret = b"resume-secret";
        let token_id = Uuid::new_v4();
        let execution_id = Uuid::new_v4();
        let expires_at = Timestamp::now();

        let signature = sign_resume_token(secret, token_id, execution_id, "node-1", expires_at);
        assert!(!verify_resume_token(secret, token_id, execution_id, "node-2", expires_at, &signature));
    }
}
