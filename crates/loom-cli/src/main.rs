#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use loom_server::background;
use loom_server::handler::{CustomRoutes, routes};
use loom_server::middleware::{
    RouterObservabilityExt, RouterOpenApiExt, RouterRecoveryExt, RouterSecurityExt,
    SecurityHeadersConfig,
};
use loom_server::service::ServiceState;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Cli, MiddlewareConfig, log_server_config};

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "loom_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "loom_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "loom_cli::config";

/// How often the in-process trigger index refreshes from Postgres, picking
/// up triggers registered or deactivated by other fleet members.
const TRIGGER_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    init_tracing();
    log_startup_info();
    log_server_config(&cli.server);

    cli.server
        .validate()
        .context("invalid server configuration")?;

    log_middleware_config(&cli.middleware);

    let state = create_service_state(&cli.service).await?;
    let router = create_router(state.clone(), &cli.middleware);

    let process_id = uuid::Uuid::new_v4().to_string();
    let cancellation = CancellationToken::new();

    let refresh_task = tokio::spawn({
        let trigger_registry = state.trigger_registry().clone();
        let cancellation = cancellation.child_token();
        async move {
            trigger_registry
                .run_refresh_loop(TRIGGER_REFRESH_INTERVAL, cancellation)
                .await;
        }
    });

    let polling_task = tokio::spawn(background::run_polling_scheduler(
        state.clone(),
        process_id.clone(),
        cancellation.child_token(),
    ));

    let worker_task = cli.service.enable_inline_worker.then(|| {
        tokio::spawn(background::run_worker_loop(
            state,
            process_id,
            cancellation.child_token(),
        ))
    });

    let serve_result = server::serve(router, cli.server).await;

    cancellation.cancel();
    let _ = refresh_task.await;
    let _ = polling_task.await;
    if let Some(worker_task) = worker_task {
        let _ = worker_task.await;
    }

    serve_result?;
    Ok(())
}

/// Creates the service state from configuration.
async fn create_service_state(
    config: &loom_server::service::ServiceConfig,
) -> anyhow::Result<ServiceState> {
    ServiceState::from_config(config)
        .await
        .context("failed to create service state")
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost) - catches panics and enforces timeouts
/// 2. Observability - request IDs and tracing spans
/// 3. Security - CORS, security headers, compression
/// 4. OpenAPI/Scalar documentation
/// 5. Routes (innermost) - actual request handlers
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    let api_routes = routes(CustomRoutes::new(), state.clone()).with_state(state);

    api_routes
        .with_open_api(middleware.openapi.clone())
        .with_security(&middleware.cors, &SecurityHeadersConfig::default())
        .with_observability()
        .with_recovery(&middleware.recovery)
}

/// Initializes tracing with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Logs startup information.
fn log_startup_info() {
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting loom server"
    );

    tracing::debug!(
        target: TRACING_TARGET_SERVER_STARTUP,
        pid = process::id(),
        arch = std::env::consts::ARCH,
        os = std::env::consts::OS,
        features = ?enabled_features(),
        "build information"
    );
}

/// Logs middleware configuration.
fn log_middleware_config(config: &MiddlewareConfig) {
    tracing::info!(
        target: TRACING_TARGET_CONFIG,
        cors_origins = ?config.cors.allowed_origins,
        cors_credentials = config.cors.allow_credentials,
        openapi_path = %config.openapi.open_api_json,
        scalar_path = %config.openapi.scalar_ui,
        request_timeout_secs = config.recovery.request_timeout,
        "middleware configuration"
    );
}

/// Returns a list of enabled compile-time features.
fn enabled_features() -> Vec<&'static str> {
    [
        cfg!(feature = "tls").then_some("tls"),
        cfg!(feature = "otel").then_some("otel"),
        cfg!(feature = "dotenv").then_some("dotenv"),
    ]
    .into_iter()
    .flatten()
    .collect()
}
