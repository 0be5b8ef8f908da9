//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── service: ServiceConfig       # Postgres, NATS, auth keys, scheduler/polling tuning
//! ├── middleware: MiddlewareConfig # CORS, OpenAPI, recovery/timeouts
//! └── server: ServerConfig         # Host, port, TLS, shutdown
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! # Configure database and server
//! loom-cli --postgres-url "postgresql://..." --port 8080
//!
//! # Or via environment variables
//! POSTGRES_URL="postgresql://..." PORT=8080 loom-cli
//! ```

mod middleware;
mod server;
mod service;

use clap::Parser;
pub use middleware::MiddlewareConfig;
pub use server::{ServerConfig, log_server_config};
pub use service::ServiceConfig;
use serde::{Deserialize, Serialize};

/// Complete CLI configuration.
///
/// Combines all configuration groups for the loom server:
/// - [`ServiceConfig`]: external service connections (Postgres, NATS, auth keys)
/// - [`MiddlewareConfig`]: HTTP middleware (CORS, OpenAPI, recovery)
/// - [`ServerConfig`]: network binding and TLS
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "loom")]
#[command(about = "Loom workflow automation server")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// HTTP middleware configuration (CORS, OpenAPI, timeouts).
    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// External service configuration (databases, message queues, auth).
    #[clap(flatten)]
    pub service: ServiceConfig,
}

impl Cli {
    /// Loads environment variables from a `.env` file (if enabled) and
    /// parses CLI arguments.
    ///
    /// This is the preferred way to initialize the CLI configuration as it
    /// ensures `.env` files are loaded before clap parses arguments, allowing
    /// environment variables from `.env` to be used as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from `.env` file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when the dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}
}
