//! HTTP server implementation.

use axum::Router;
use loom_server::extract::AppConnectInfo;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::server::error::{ServerError, ServerResult};
use crate::server::{TRACING_TARGET_SHUTDOWN, TRACING_TARGET_STARTUP, shutdown_signal};

/// Binds and serves `app` over plain HTTP until a shutdown signal arrives.
pub async fn serve_http(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    let server_addr = server_config.server_addr();
    let shutdown_timeout = server_config.shutdown_timeout();

    let listener = TcpListener::bind(server_addr)
        .await
        .map_err(|e| ServerError::bind_error(&server_addr.to_string(), e))?;

    tracing::info!(target: TRACING_TARGET_STARTUP, addr = %server_addr, "server listening");

    let app = app.into_make_service_with_connect_info::<AppConnectInfo>();
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await
        .map_err(ServerError::Runtime);

    tracing::info!(target: TRACING_TARGET_SHUTDOWN, "server stopped");
    result
}

#[cfg(test)]
mod tests {}
