//! Contains constraints, enumerations and other custom types.

pub mod constants;
mod constraint;
mod enums;
mod pagination;
mod utilities;

pub use constraint::{
    ConnectionConstraints, ConstraintCategory, ConstraintViolation, OrganizationConstraints,
    ResumeTokenConstraints, WebhookLogConstraints, WorkflowConstraints,
    WorkflowExecutionConstraints, WorkflowTriggerConstraints, WorkflowVersionConstraints,
};
pub use enums::{
    CredentialKind, ExecutionStatus, TriggerKind, TriggerStatus, WebhookLogSource,
};
pub use pagination::{Cursor, CursorPage, CursorPagination, OffsetPage, OffsetPagination};
pub use utilities::{HasCreatedAt, HasDeletedAt, HasExpiresAt, HasLastActivityAt, HasUpdatedAt};
