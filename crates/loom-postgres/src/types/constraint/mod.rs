//! Database constraint violations organized by functional area.
//!
//! This module provides a comprehensive enumeration of all database constraint violations,
//! organized into logical groups for better maintainability.

mod connections;
mod organizations;
mod resume_tokens;
mod webhook_logs;
mod workflow_executions;
mod workflow_triggers;
mod workflow_versions;
mod workflows;

use serde::{Deserialize, Serialize};

pub use self::connections::ConnectionConstraints;
pub use self::organizations::OrganizationConstraints;
pub use self::resume_tokens::ResumeTokenConstraints;
pub use self::webhook_logs::WebhookLogConstraints;
pub use self::workflow_executions::WorkflowExecutionConstraints;
pub use self::workflow_triggers::WorkflowTriggerConstraints;
pub use self::workflow_versions::WorkflowVersionConstraints;
pub use self::workflows::WorkflowConstraints;

/// Unified constraint violation enum that can represent any database constraint.
///
/// This enum wraps all specific constraint types, providing a single interface
/// for handling any constraint violation while maintaining type safety and
/// organizational benefits of the separate modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ConstraintViolation {
    Organization(OrganizationConstraints),
    Connection(ConnectionConstraints),
    Workflow(WorkflowConstraints),
    WorkflowVersion(WorkflowVersionConstraints),
    WorkflowTrigger(WorkflowTriggerConstraints),
    WebhookLog(WebhookLogConstraints),
    WorkflowExecution(WorkflowExecutionConstraints),
    ResumeToken(ResumeTokenConstraints),
}

/// Categories of database constraint violations.
///
/// This enum helps classify constraint violations by their purpose and type,
/// making it easier to handle different categories of errors appropriately.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintCategory {
    /// Data validation constraints (format, length, range checks).
    Validation,
    /// Chronological integrity constraints (timestamp relationships).
    Chronological,
    /// Business logic constraints (domain-specific rules).
    BusinessLogic,
    /// Uniqueness constraints (primary keys, unique indexes).
    Uniqueness,
}

impl ConstraintViolation {
    /// Creates a new [`ConstraintViolation`] from the constraint name.
    ///
    /// This method attempts to parse a constraint name string into the corresponding
    /// enum variant. It returns `None` if the constraint name is not recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use loom_postgres::types::ConstraintViolation;
    ///
    /// let violation = ConstraintViolation::new("organizations_slug_unique_idx");
    /// assert!(violation.is_some());
    ///
    /// let unknown = ConstraintViolation::new("unknown_constraint");
    /// assert!(unknown.is_none());
    /// ```
    pub fn new(constraint: &str) -> Option<Self> {
        let prefix = constraint.split('_').next()?;
        macro_rules! try_parse {
            ($($parser:expr => $variant:ident),+ $(,)?) => {
                None$(.or_else(|| $parser(constraint).map(Self::$variant)))+
            };
        }

        match prefix {
            "organizations" => try_parse!(OrganizationConstraints::new => Organization),
            "connections" => try_parse!(ConnectionConstraints::new => Connection),
            "workflows" => try_parse!(WorkflowConstraints::new => Workflow),
            "workflow" => try_parse! {
                WorkflowVersionConstraints::new => WorkflowVersion,
                WorkflowTriggerConstraints::new => WorkflowTrigger,
                WorkflowExecutionConstraints::new => WorkflowExecution,
            },
            "webhook" => try_parse!(WebhookLogConstraints::new => WebhookLog),
            "resume" => try_parse!(ResumeTokenConstraints::new => ResumeToken),
            _ => None,
        }
    }

    /// Returns the table name associated with this constraint.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConstraintViolation::Organization(_) => "organizations",
            ConstraintViolation::Connection(_) => "connections",
            ConstraintViolation::Workflow(_) => "workflows",
            ConstraintViolation::WorkflowVersion(_) => "workflow_versions",
            ConstraintViolation::WorkflowTrigger(_) => "workflow_triggers",
            ConstraintViolation::WebhookLog(_) => "webhook_logs",
            ConstraintViolation::WorkflowExecution(_) => "workflow_executions",
            ConstraintViolation::ResumeToken(_) => "resume_tokens",
        }
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            ConstraintViolation::Organization(c) => c.categorize(),
            ConstraintViolation::Connection(c) => c.categorize(),
            ConstraintViolation::Workflow(c) => c.categorize(),
            ConstraintViolation::WorkflowVersion(c) => c.categorize(),
            ConstraintViolation::WorkflowTrigger(c) => c.categorize(),
            ConstraintViolation::WebhookLog(c) => c.categorize(),
            ConstraintViolation::WorkflowExecution(c) => c.categorize(),
            ConstraintViolation::ResumeToken(c) => c.categorize(),
        }
    }
}

impl std::fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstraintViolation::Organization(c) => write!(f, "{c}"),
            ConstraintViolation::Connection(c) => write!(f, "{c}"),
            ConstraintViolation::Workflow(c) => write!(f, "{c}"),
            ConstraintViolation::WorkflowVersion(c) => write!(f, "{c}"),
            ConstraintViolation::WorkflowTrigger(c) => write!(f, "{c}"),
            ConstraintViolation::WebhookLog(c) => write!(f, "{c}"),
            ConstraintViolation::WorkflowExecution(c) => write!(f, "{c}"),
            ConstraintViolation::ResumeToken(c) => write!(f, "{c}"),
        }
    }
}

impl From<ConstraintViolation> for String {
    #[inline]
    fn from(val: ConstraintViolation) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ConstraintViolation {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ConstraintViolation::new(&value).ok_or(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_constraint() {
        let violation = ConstraintViolation::new("organizations_slug_unique_idx");
        assert_eq!(violation.unwrap().table_name(), "organizations");
    }

    #[test]
    fn rejects_unknown_constraint() {
        assert!(ConstraintViolation::new("totally_unknown_thing").is_none());
    }
}
