#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod definition;
pub mod engine;
mod error;
pub mod graph;

pub use engine::{
    ConnectionRegistry, Connector, ConnectorRegistry, ConnectorRequest, ConnectorResponse, Engine,
    EngineConfig, ExecutionContext, ExecutionOutcome, NodeResult, NoopTokenRefreshHandler,
    PgConnectionLoader, PollRequest, PollResponse, QuotaLimits, QuotaTracker, ResolvedConnection,
    ResumeState, TokenRefreshHandler,
};
pub use error::{Error, Result};
pub use graph::CompiledGraph;

/// Tracing target for runtime operations.
pub const TRACING_TARGET: &str = "loom::runtime";
