//! Commonly used items from loom-core.
//!
//! This prelude module exports the most commonly used traits and types to
//! simplify imports in consuming code.

pub use crate::common::{Provider, ServiceHealth, ServiceStatus, Timing};
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
