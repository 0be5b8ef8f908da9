#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod request;
pub mod signature;

use jiff::{SignedDuration, Timestamp};

pub use loom_core::{Error, ErrorKind, Result, ServiceHealth, ServiceStatus};
pub use request::{IncomingWebhook, WebhookContext};
pub use signature::SignatureStrategy;

/// Tracing target for webhook ingress operations.
pub const TRACING_TARGET: &str = "loom_webhook::ingress";

/// Default replay tolerance, in seconds, when a trigger does not override it.
pub const DEFAULT_REPLAY_TOLERANCE_SECONDS: i64 = 300;

/// Verifies an incoming webhook's signature and replay freshness.
///
/// Extracts and checks `(timestamp, signature)` per `strategy`, then, when
/// the strategy supplies a signed timestamp, rejects deliveries older than
/// `replay_tolerance`. Providers that sign no timestamp (GitHub) are checked
/// against the gateway's own `received_at` instead.
#[tracing::instrument(skip(secret, webhook), target = "loom_webhook::ingress", fields(request_id = %webhook.request_id))]
pub fn verify_delivery(
    strategy: SignatureStrategy,
    secret: &[u8],
    webhook: &IncomingWebhook,
    replay_tolerance: SignedDuration,
) -> Result<()> {
    let signed_at = strategy
        .verify(secret, &webhook.headers, &webhook.body)?
        .unwrap_or(webhook.received_at);

    let age = webhook.received_at.duration_since(signed_at).abs();
    if age > replay_tolerance {
        return Err(Error::with_source(
            ErrorKind::Signature,
            format!(
                "delivery timestamp is outside the replay tolerance ({replay_tolerance:?})"
            )
            .into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn hmac_hex(secret: &[u8], message: &[u8]) -> String {
        use hmac::{Hmac, Mac};
        use sha2::Sha256;
        let mut mac = Hmac::<Sha256>::new_from_slice(secret).unwrap();
        mac.update(message);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn rejects_stale_slack_signature() {
        let secret = b"slack-secret";
        let body = b"{\"event\":\"message\"}";
        let stale_timestamp = (Timestamp::now().as_second() - 600).to_string();
        let message = [b"v0:", stale_timestamp.as_bytes(), b":", body.as_slice()].concat();
        let signature = format!("v0={}", hmac_hex(secret, &message));

        let mut headers = HashMap::new();
        headers.insert("X-Slack-Signature".to_string(), signature);
        headers.insert("X-Slack-Request-Timestamp".to_string(), stale_timestamp);
        let webhook = IncomingWebhook::new(headers, body.to_vec());

        let result = verify_delivery(
            SignatureStrategy::SlackV0,
            secret,
            &webhook,
            SignedDuration::from_secs(DEFAULT_REPLAY_TOLERANCE_SECONDS),
        );

        let err = result.expect_err("stale signature must be rejected");
        assert_eq!(err.kind, ErrorKind::Signature);
        let message = err.source.as_ref().expect("source carries detail").to_string();
        assert!(message.contains("tolerance"), "error should mention tolerance: {message}");
    }

    #[test]
    fn accepts_fresh_slack_signature() {
        let secret = b"slack-secret";
        let body = b"{\"event\":\"message\"}";
        let timestamp = Timestamp::now().as_second().to_string();
        let message = [b"v0:", timestamp.as_bytes(), b":", body.as_slice()].concat();
        let signature = format!("v0={}", hmac_hex(secret, &message));

        let mut headers = HashMap::new();
        headers.insert("X-Slack-Signature".to_string(), signature);
        headers.insert("X-Slack-Request-Timestamp".to_string(), timestamp);
        let webhook = IncomingWebhook::new(headers, body.to_vec());

        let result = verify_delivery(
            SignatureStrategy::SlackV0,
            secret,
            &webhook,
            SignedDuration::from_secs(DEFAULT_REPLAY_TOLERANCE_SECONDS),
        );

        assert!(result.is_ok());
    }
}
