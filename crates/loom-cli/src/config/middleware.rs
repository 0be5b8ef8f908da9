//! Middleware configuration for the HTTP server.
//!
//! This module groups the CLI-configurable middleware settings that
//! [`loom_server::middleware`] already exposes as clap [`Args`] (behind its
//! `config` feature): CORS, OpenAPI/Scalar documentation, and request
//! recovery (timeouts/panic handling).
//!
//! # Example
//!
//! ```bash
//! # Configure CORS origins and request timeout
//! loom-cli --cors-origins "https://example.com" --request-timeout 60
//! ```

use clap::Args;
use loom_server::middleware::{CorsConfig, OpenApiConfig, RecoveryConfig};
use serde::{Deserialize, Serialize};

/// Middleware configuration combining CORS, OpenAPI, and recovery settings.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// CORS (Cross-Origin Resource Sharing) configuration.
    #[clap(flatten)]
    pub cors: CorsConfig,

    /// OpenAPI documentation configuration.
    #[clap(flatten)]
    pub openapi: OpenApiConfig,

    /// Recovery middleware configuration.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}
