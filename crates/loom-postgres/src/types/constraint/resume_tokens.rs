//! Resume tokens table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Resume tokens table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum ResumeTokenConstraints {
    #[strum(serialize = "resume_tokens_expires_after_created")]
    ExpiresAfterCreated,
    #[strum(serialize = "resume_tokens_node_id_length")]
    NodeIdLength,
}

impl ResumeTokenConstraints {
    /// Creates a new [`ResumeTokenConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            ResumeTokenConstraints::ExpiresAfterCreated => ConstraintCategory::Chronological,
            ResumeTokenConstraints::NodeIdLength => ConstraintCategory::Validation,
        }
    }
}

impl From<ResumeTokenConstraints> for String {
    #[inline]
    fn from(val: ResumeTokenConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ResumeTokenConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
