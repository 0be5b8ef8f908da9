//! Inbound webhook request representation.

use std::collections::HashMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A received webhook delivery, prior to signature verification.
#[derive(Debug, Clone)]
pub struct IncomingWebhook {
    /// Unique identifier assigned to this delivery for tracing and the
    /// webhook log.
    pub request_id: Uuid,
    /// Request headers, as received. Lookups are case-insensitive.
    pub headers: HashMap<String, String>,
    /// Raw request body, undecoded (signatures are computed over these
    /// exact bytes).
    pub body: Vec<u8>,
    /// When the gateway received the request.
    pub received_at: Timestamp,
}

impl IncomingWebhook {
    /// Builds an incoming webhook from its raw parts, stamping the receipt
    /// time and a fresh request id.
    pub fn new(headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        Self {
            request_id: Uuid::now_v7(),
            headers,
            body,
            received_at: Timestamp::now(),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parses the body as JSON, for triggers whose `triggerData` embeds the
    /// decoded payload alongside the raw bytes.
    pub fn body_as_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }

    /// A short digest of the body, used as the dedupe fallback token when a
    /// provider does not supply its own event id.
    pub fn body_digest(&self) -> String {
        use sha2::{Digest, Sha256};
        let digest = Sha256::digest(&self.body);
        hex::encode(digest)
    }
}

/// Identity of the trigger a webhook delivery was routed to, carried
/// alongside the verification result for logging and execution handoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct WebhookContext {
    /// The webhook trigger that received this delivery.
    pub webhook_id: Uuid,
    /// The workflow the trigger belongs to.
    pub workflow_id: Uuid,
    /// The organization that owns the workflow.
    pub organization_id: Uuid,
    /// The connector app the trigger is configured for (e.g. "slack",
    /// "github", "stripe"), used to select a [`crate::signature::SignatureStrategy`].
    pub app_id: String,
}

impl WebhookContext {
    /// Creates a new context identifying the target of a webhook delivery.
    pub fn new(
        webhook_id: Uuid,
        workflow_id: Uuid,
        organization_id: Uuid,
        app_id: impl Into<String>,
    ) -> Self {
        Self {
            webhook_id,
            workflow_id,
            organization_id,
            app_id: app_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("X-Signature".to_string(), "abc".to_string());
        let webhook = IncomingWebhook::new(headers, b"{}".to_vec());

        assert_eq!(webhook.header("x-signature"), Some("abc"));
        assert_eq!(webhook.header("X-Missing"), None);
    }

    #[test]
    fn body_digest_is_stable_for_same_body() {
        let a = IncomingWebhook::new(HashMap::new(), b"payload".to_vec());
        let b = IncomingWebhook::new(HashMap::new(), b"payload".to_vec());
        assert_eq!(a.body_digest(), b.body_digest());
    }

    #[test]
    fn context_carries_app_id() {
        let context = WebhookContext::new(
            Uuid::now_v7(),
            Uuid::now_v7(),
            Uuid::now_v7(),
            "slack",
        );
        assert_eq!(context.app_id, "slack");
    }
}
