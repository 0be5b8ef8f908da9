//! Webhook logs table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Webhook logs table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum WebhookLogConstraints {
    #[strum(serialize = "webhook_logs_payload_digest_length")]
    PayloadDigestLength,
    #[strum(serialize = "webhook_logs_executionid_required_when_processed")]
    ExecutionIdRequiredWhenProcessed,
}

impl WebhookLogConstraints {
    /// Creates a new [`WebhookLogConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            WebhookLogConstraints::PayloadDigestLength
            | WebhookLogConstraints::ExecutionIdRequiredWhenProcessed => {
                ConstraintCategory::Validation
            }
        }
    }
}

impl From<WebhookLogConstraints> for String {
    #[inline]
    fn from(val: WebhookLogConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for WebhookLogConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
