//! Database models mapping directly to table rows.

mod connection;
mod dedupe_entry;
mod organization;
mod resume_token;
mod scheduler_lock;
mod webhook_log;
mod worker_heartbeat;
mod workflow;
mod workflow_execution;
mod workflow_trigger;
mod workflow_version;

pub use connection::{Connection, NewConnection, UpdateConnection};
pub use dedupe_entry::{DedupeEntry, NewDedupeEntry};
pub use organization::{NewOrganization, Organization, UpdateOrganization};
pub use resume_token::{NewResumeToken, ResumeToken};
pub use scheduler_lock::{NewSchedulerLock, SchedulerLock};
pub use webhook_log::{NewWebhookLog, WebhookLog};
pub use worker_heartbeat::{NewWorkerHeartbeat, WorkerHeartbeat};
pub use workflow::{NewWorkflow, UpdateWorkflow, Workflow};
pub use workflow_execution::{NewWorkflowExecution, UpdateWorkflowExecution, WorkflowExecution};
pub use workflow_trigger::{NewWorkflowTrigger, UpdateWorkflowTrigger, WorkflowTrigger};
pub use workflow_version::{NewWorkflowVersion, WorkflowVersion};
