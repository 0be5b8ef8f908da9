//! Organizations table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Organizations table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum OrganizationConstraints {
    #[strum(serialize = "organizations_name_length")]
    NameLength,
    #[strum(serialize = "organizations_slug_format")]
    SlugFormat,
    #[strum(serialize = "organizations_slug_unique_idx")]
    SlugUnique,
    #[strum(serialize = "organizations_updated_after_created")]
    UpdatedAfterCreated,
}

impl OrganizationConstraints {
    /// Creates a new [`OrganizationConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            OrganizationConstraints::NameLength | OrganizationConstraints::SlugFormat => {
                ConstraintCategory::Validation
            }
            OrganizationConstraints::SlugUnique => ConstraintCategory::Uniqueness,
            OrganizationConstraints::UpdatedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<OrganizationConstraints> for String {
    #[inline]
    fn from(val: OrganizationConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for OrganizationConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
