//! Application state and dependency injection.

mod cache;
mod config;
mod error;
mod scheduler_lock;
mod security;
mod state;
mod tracing;
mod trigger_registry;

pub use cache::HealthCache;
pub use config::{SchedulerStrategy, ServiceConfig};
pub use error::{Result, ServiceError};
pub use scheduler_lock::{SchedulerLease, SchedulerLockService};
pub use security::{
    AuthKeys, AuthKeysConfig, RateLimitKey, RateLimiter, sign_resume_token, verify_resume_token,
};
pub use state::ServiceState;
pub use tracing::initialize_tracing;
pub use trigger_registry::TriggerRegistry;
