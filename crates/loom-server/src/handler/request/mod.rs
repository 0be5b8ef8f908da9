//! Request types for HTTP handlers.

mod execution;
mod monitor;
mod paths;
mod resume;
mod validations;

pub use execution::*;
pub use monitor::*;
pub use paths::*;
pub use resume::*;
pub use validations::*;
