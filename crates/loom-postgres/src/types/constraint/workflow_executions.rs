//! Workflow executions table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Workflow executions table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum WorkflowExecutionConstraints {
    #[strum(serialize = "workflow_executions_attempt_positive")]
    AttemptPositive,
    #[strum(serialize = "workflow_executions_finished_after_started")]
    FinishedAfterStarted,
    #[strum(serialize = "workflow_executions_error_required_when_failed")]
    ErrorRequiredWhenFailed,
}

impl WorkflowExecutionConstraints {
    /// Creates a new [`WorkflowExecutionConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            WorkflowExecutionConstraints::AttemptPositive
            | WorkflowExecutionConstraints::ErrorRequiredWhenFailed => {
                ConstraintCategory::Validation
            }
            WorkflowExecutionConstraints::FinishedAfterStarted => {
                ConstraintCategory::Chronological
            }
        }
    }
}

impl From<WorkflowExecutionConstraints> for String {
    #[inline]
    fn from(val: WorkflowExecutionConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for WorkflowExecutionConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
