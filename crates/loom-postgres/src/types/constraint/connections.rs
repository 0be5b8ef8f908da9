//! Connections table constraint violations.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::ConstraintCategory;

/// Connections table constraint violations.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[derive(Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(into = "String", try_from = "String")]
pub enum ConnectionConstraints {
    #[strum(serialize = "connections_display_name_length")]
    DisplayNameLength,
    #[strum(serialize = "connections_app_id_length")]
    AppIdLength,
    #[strum(serialize = "connections_encrypted_credentials_not_empty")]
    EncryptedCredentialsNotEmpty,
    #[strum(serialize = "connections_updated_after_created")]
    UpdatedAfterCreated,
    #[strum(serialize = "connections_deleted_after_created")]
    DeletedAfterCreated,
}

impl ConnectionConstraints {
    /// Creates a new [`ConnectionConstraints`] from the constraint name.
    pub fn new(constraint: &str) -> Option<Self> {
        constraint.parse().ok()
    }

    /// Returns the category of this constraint violation.
    pub fn categorize(&self) -> ConstraintCategory {
        match self {
            ConnectionConstraints::DisplayNameLength
            | ConnectionConstraints::AppIdLength
            | ConnectionConstraints::EncryptedCredentialsNotEmpty => ConstraintCategory::Validation,
            ConnectionConstraints::UpdatedAfterCreated
            | ConnectionConstraints::DeletedAfterCreated => ConstraintCategory::Chronological,
        }
    }
}

impl From<ConnectionConstraints> for String {
    #[inline]
    fn from(val: ConnectionConstraints) -> Self {
        val.to_string()
    }
}

impl TryFrom<String> for ConnectionConstraints {
    type Error = strum::ParseError;

    #[inline]
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
