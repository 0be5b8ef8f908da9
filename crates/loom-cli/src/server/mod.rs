//! HTTP server configuration and startup.

mod error;
mod http_server;
#[cfg(feature = "tls")]
mod https_server;
mod shutdown;

use axum::Router;
pub use error::{ServerError, ServerResult};
pub use http_server::serve_http;
#[cfg(feature = "tls")]
pub use https_server::serve_https;
pub(crate) use shutdown::shutdown_signal;

use crate::config::ServerConfig;

/// Tracing target for server startup events.
const TRACING_TARGET_STARTUP: &str = "loom_cli::server::startup";

/// Tracing target for server shutdown events.
const TRACING_TARGET_SHUTDOWN: &str = "loom_cli::server::shutdown";

/// Starts the server with the appropriate protocol (HTTP or HTTPS).
///
/// This function automatically determines whether to start an HTTP or HTTPS
/// server based on the TLS configuration:
/// - If TLS certificate and key paths are provided (when the `tls` feature is
///   enabled), starts an HTTPS server.
/// - Otherwise, starts a regular HTTP server.
///
/// # Errors
///
/// Returns an error if the server configuration is invalid, TLS certificates
/// cannot be loaded, the port cannot be bound, or the server encounters a
/// fatal runtime error.
pub async fn serve(app: Router, config: ServerConfig) -> ServerResult<()> {
    config
        .validate()
        .map_err(|e| ServerError::invalid_config(&e))?;

    #[cfg(feature = "tls")]
    {
        if let (Some(cert_path), Some(key_path)) =
            (config.tls_cert_path.clone(), config.tls_key_path.clone())
        {
            tracing::info!(target: TRACING_TARGET_STARTUP, "starting HTTPS server");
            return serve_https(app, config, &cert_path, &key_path).await;
        }
    }

    tracing::info!(target: TRACING_TARGET_STARTUP, "starting HTTP server");
    serve_http(app, config).await
}
