//! Per-organization quota enforcement.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Quota ceilings for a single organization.
///
/// `None` means the corresponding dimension is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuotaLimits {
    /// Maximum number of connector calls.
    pub max_api_calls: Option<u64>,
    /// Maximum number of tokens consumed (connector-reported usage, e.g. LLM tokens).
    pub max_tokens: Option<u64>,
}

#[derive(Debug, Default)]
struct UsageStats {
    api_calls: u64,
    tokens: u64,
}

/// Tracks connector-call and token usage per organization across an engine's
/// lifetime, enforced immediately before every connector dispatch.
///
/// Mirrors the request-scoped usage accounting pattern used elsewhere in this
/// codebase, scoped per organization instead of per request.
#[derive(Debug, Clone, Default)]
pub struct QuotaTracker {
    usage: Arc<RwLock<HashMap<Uuid, UsageStats>>>,
}

impl QuotaTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks `limits` against the organization's recorded usage, then, if
    /// within bounds, records one more connector call and `tokens` consumed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QuotaExceeded`] if recording this call would breach
    /// either limit. Usage is not recorded in that case.
    pub async fn check_and_record(
        &self,
        organization_id: Uuid,
        limits: QuotaLimits,
        tokens: u64,
    ) -> Result<()> {
        let mut usage = self.usage.write().await;
        let entry = usage.entry(organization_id).or_default();

        if let Some(max) = limits.max_api_calls
            && entry.api_calls + 1 > max
        {
            return Err(Error::QuotaExceeded {
                organization_id,
                limit: format!("maxApiCalls={max}"),
            });
        }
        if let Some(max) = limits.max_tokens
            && entry.tokens + tokens > max
        {
            return Err(Error::QuotaExceeded {
                organization_id,
                limit: format!("maxTokens={max}"),
            });
        }

        entry.api_calls += 1;
        entry.tokens += tokens;
        Ok(())
    }

    /// Records token usage reported after a connector call completes,
    /// independent of the call-count check already performed before dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QuotaExceeded`] if recording `tokens` would breach
    /// `limits.max_tokens`. Usage is not recorded in that case, so the next
    /// call's pre-dispatch check still sees the organization over budget.
    pub async fn record_tokens(
        &self,
        organization_id: Uuid,
        limits: QuotaLimits,
        tokens: u64,
    ) -> Result<()> {
        if tokens == 0 {
            return Ok(());
        }
        let mut usage = self.usage.write().await;
        let entry = usage.entry(organization_id).or_default();
        if let Some(max) = limits.max_tokens
            && entry.tokens + tokens > max
        {
            return Err(Error::QuotaExceeded {
                organization_id,
                limit: format!("maxTokens={max}"),
            });
        }
        entry.tokens += tokens;
        Ok(())
    }

    /// Returns the recorded usage for an organization, `(api_calls, tokens)`.
    pub async fn usage_for(&self, organization_id: Uuid) -> (u64, u64) {
        let usage = self.usage.read().await;
        usage
            .get(&organization_id)
            .map_or((0, 0), |stats| (stats.api_calls, stats.tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_calls_under_the_limit() {
        let tracker = QuotaTracker::new();
        let org = Uuid::now_v7();
        let limits = QuotaLimits {
            max_api_calls: Some(2),
            max_tokens: None,
        };
        tracker.check_and_record(org, limits, 0).await.unwrap();
        tracker.check_and_record(org, limits, 0).await.unwrap();
        assert_eq!(tracker.usage_for(org).await, (2, 0));
    }

    #[tokio::test]
    async fn rejects_the_call_that_breaches_the_limit() {
        let tracker = QuotaTracker::new();
        let org = Uuid::now_v7();
        let limits = QuotaLimits {
            max_api_calls: Some(1),
            max_tokens: None,
        };
        tracker.check_and_record(org, limits, 0).await.unwrap();
        let err = tracker.check_and_record(org, limits, 0).await.unwrap_err();
        assert!(matches!(err, Error::QuotaExceeded { .. }));
    }

    #[tokio::test]
    async fn token_budget_is_tracked_independently_per_organization() {
        let tracker = QuotaTracker::new();
        let org_a = Uuid::now_v7();
        let org_b = Uuid::now_v7();
        let limits = QuotaLimits {
            max_api_calls: None,
            max_tokens: Some(100),
        };
        tracker.check_and_record(org_a, limits, 80).await.unwrap();
        tracker.check_and_record(org_b, limits, 80).await.unwrap();
        assert!(tracker.check_and_record(org_a, limits, 30).await.is_err());
    }

    #[tokio::test]
    async fn record_tokens_is_independent_of_call_count_accounting() {
        let tracker = QuotaTracker::new();
        let org = Uuid::now_v7();
        let limits = QuotaLimits {
            max_api_calls: None,
            max_tokens: Some(50),
        };
        tracker.record_tokens(org, limits, 40).await.unwrap();
        assert_eq!(tracker.usage_for(org).await, (0, 40));
        let err = tracker.record_tokens(org, limits, 20).await.unwrap_err();
        assert!(matches!(err, Error::QuotaExceeded { .. }));
        assert_eq!(tracker.usage_for(org).await, (0, 40));
    }
}
