//! Route categorization for metrics and logging.
//!
//! This module provides a categorization system for routes based on their
//! URI path, enabling aggregated metrics and monitoring by functional area.

use axum::http::Uri;

/// Route classification for metrics grouping.
///
/// Categorizes routes based on their URI path for aggregated metrics
/// and monitoring purposes. Each category represents a distinct
/// functional area of the API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteCategory {
    WebhookIngress,
    Executions,
    Resume,
    Workers,
    Monitoring,
    Unknown,
}

impl RouteCategory {
    /// Categorizes a route based on its URI path.
    pub fn from_uri(uri: &Uri) -> Self {
        let path = uri.path();

        if path.starts_with("/webhooks/") {
            Self::WebhookIngress
        } else if path.starts_with("/runs/") {
            Self::Resume
        } else if path.starts_with("/executions") {
            Self::Executions
        } else if path.starts_with("/workers/") {
            Self::Workers
        } else if path.starts_with("/production/queue/") || path.starts_with("/monitors/") {
            Self::Monitoring
        } else {
            Self::Unknown
        }
    }

    /// Returns the string representation for logging and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebhookIngress => "webhooks",
            Self::Executions => "executions",
            Self::Resume => "resume",
            Self::Workers => "workers",
            Self::Monitoring => "monitoring",
            Self::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorization_maps_paths_correctly() {
        assert_eq!(
            RouteCategory::from_uri(&"/webhooks/abc123".parse().unwrap()),
            RouteCategory::WebhookIngress
        );
        assert_eq!(
            RouteCategory::from_uri(&"/executions".parse().unwrap()),
            RouteCategory::Executions
        );
        assert_eq!(
            RouteCategory::from_uri(&"/executions/123/retry".parse().unwrap()),
            RouteCategory::Executions
        );
        assert_eq!(
            RouteCategory::from_uri(&"/runs/123/nodes/456/resume".parse().unwrap()),
            RouteCategory::Resume
        );
        assert_eq!(
            RouteCategory::from_uri(&"/workers/status".parse().unwrap()),
            RouteCategory::Workers
        );
        assert_eq!(
            RouteCategory::from_uri(&"/production/queue/heartbeat".parse().unwrap()),
            RouteCategory::Monitoring
        );
        assert_eq!(
            RouteCategory::from_uri(&"/unknown/path".parse().unwrap()),
            RouteCategory::Unknown
        );
    }
}
