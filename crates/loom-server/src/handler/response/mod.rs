//! Response types for HTTP handlers.

mod error_response;
mod execution;
mod monitors;
mod page;
mod webhook;
mod worker;

pub use error_response::ErrorResponse;
pub use execution::{Execution, ExecutionAck, ExecutionsPage};
pub use monitors::MonitorStatus;
pub use page::Page;
pub use webhook::WebhookAck;
pub use worker::{QueueDepth, QueueHeartbeat, QueueHeartbeatStatus, WorkerHeartbeatEntry, WorkersStatus};
