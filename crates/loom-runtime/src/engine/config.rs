//! Engine configuration.

use std::time::Duration;

use derive_builder::Builder;

/// Configuration for the workflow execution engine.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct EngineConfig {
    /// Maximum number of concurrent workflow executions.
    #[builder(default = "10")]
    pub max_concurrent_runs: usize,

    /// Execution-wide deadline. Waiting executions are exempt.
    #[builder(default = "Duration::from_secs(24 * 3600)")]
    pub execution_timeout: Duration,

    /// Per-connector-call timeout, applied around every [`super::Connector::execute`].
    #[builder(default = "Duration::from_secs(30)")]
    pub connector_timeout: Duration,

    /// How often a running worker renews its execution heartbeat.
    #[builder(default = "Duration::from_secs(10)")]
    pub heartbeat_interval: Duration,

    /// Age past which a heartbeat is considered stale and the execution is
    /// eligible for requeue by another worker.
    #[builder(default = "Duration::from_secs(120)")]
    pub stale_threshold: Duration,
}

impl EngineConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(max) = self.max_concurrent_runs
            && max == 0
        {
            return Err("max_concurrent_runs must be at least 1".into());
        }
        if let Some(stale) = self.stale_threshold
            && let Some(heartbeat) = self.heartbeat_interval
            && stale <= heartbeat
        {
            return Err("stale_threshold must be greater than heartbeat_interval".into());
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_runs: 10,
            execution_timeout: Duration::from_secs(24 * 3600),
            connector_timeout: Duration::from_secs(30),
            heartbeat_interval: Duration::from_secs(10),
            stale_threshold: Duration::from_secs(120),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_internally_consistent() {
        let config = EngineConfig::default();
        assert!(config.stale_threshold > config.heartbeat_interval);
    }

    #[test]
    fn builder_rejects_zero_concurrency() {
        let err = EngineConfigBuilder::default()
            .max_concurrent_runs(0usize)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("max_concurrent_runs"));
    }
}
