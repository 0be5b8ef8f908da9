//! Service configuration re-export.
//!
//! [`loom_server::service::ServiceConfig`] already derives [`clap::Args`]
//! behind its own `config` feature (Postgres, NATS, auth keys, scheduler and
//! polling tuning), so the CLI flattens it directly rather than mirroring it
//! behind a conversion layer.

pub use loom_server::service::ServiceConfig;
