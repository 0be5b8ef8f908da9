//! Workflow triggers table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Workflow triggers table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum WorkflowTriggerConstraints {
    #[strum(serialize = "workflow_triggers_app_id_length")]
    AppIdLength,
    #[strum(serialize = "workflow_triggers_endpoint_required_for_webhook")]
    EndpointRequiredForWebhook,
    #[strum(serialize = "workflow_triggers_interval_required_for_polling")]
    IntervalRequiredForPolling,
    #[strum(serialize = "workflow_triggers_endpoint_unique_idx")]
    EndpointUnique,
    #[strum(serialize = "workflow_triggers_backoff_count_positive")]
    BackoffCountPositive,
}

impl WorkflowTriggerConstraints {
    /// Creates a new [`WorkflowTriggerConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            WorkflowTriggerConstraints::AppIdLength
            | WorkflowTriggerConstraints::EndpointRequiredForWebhook
            | WorkflowTriggerConstraints::IntervalRequiredForPolling
            | WorkflowTriggerConstraints::BackoffCountPositive => ConstraintCategory::Validation,
            WorkflowTriggerConstraints::EndpointUnique => ConstraintCategory::Uniqueness,
        }
    }
}

impl From<WorkflowTriggerConstraints> for String {
    #[inline]
    fn from(val: WorkflowTriggerConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for WorkflowTriggerConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
