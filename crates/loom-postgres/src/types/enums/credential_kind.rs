//! Credential kind enumeration for stored connection credentials.

use diesel_derive_enum::DbEnum;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Corresponds to the `CREDENTIAL_KIND` PostgreSQL enum.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[derive(Serialize, Deserialize, DbEnum, Display, EnumIter, EnumString)]
#[ExistingTypePath = "crate::schema::sql_types::CredentialKind"]
pub enum CredentialKind {
    /// OAuth2 access/refresh token pair.
    #[db_rename = "oauth2"]
    #[serde(rename = "oauth2")]
    Oauth2,

    /// Static API key.
    #[db_rename = "api_key"]
    #[serde(rename = "api_key")]
    ApiKey,

    /// HTTP basic auth username/password.
    #[db_rename = "basic"]
    #[serde(rename = "basic")]
    Basic,
}

impl CredentialKind {
    /// Returns whether this credential kind requires periodic refresh.
    #[inline]
    pub fn is_refreshable(self) -> bool {
        matches!(self, CredentialKind::Oauth2)
    }
}
