//! Workflow versions table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Workflow versions table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum WorkflowVersionConstraints {
    #[strum(serialize = "workflow_versions_number_positive")]
    NumberPositive,
    #[strum(serialize = "workflow_versions_workflow_number_unique_idx")]
    WorkflowNumberUnique,
    #[strum(serialize = "workflow_versions_graph_not_empty")]
    GraphNotEmpty,
}

impl WorkflowVersionConstraints {
    /// Creates a new [`WorkflowVersionConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            WorkflowVersionConstraints::NumberPositive
            | WorkflowVersionConstraints::GraphNotEmpty => ConstraintCategory::Validation,
            WorkflowVersionConstraints::WorkflowNumberUnique => ConstraintCategory::Uniqueness,
        }
    }
}

impl From<WorkflowVersionConstraints> for String {
    #[inline]
    fn from(val: WorkflowVersionConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for WorkflowVersionConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
