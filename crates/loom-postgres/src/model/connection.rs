//! Connection model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::schema::connections;
use crate::types::{CredentialKind, HasCreatedAt, HasDeletedAt, HasUpdatedAt};

/// Connection model representing an encrypted set of provider credentials
/// scoped to an organization.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = connections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Connection {
    /// Unique connection identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Connector application identifier (e.g. "slack", "github").
    pub app_id: String,
    /// Human-readable connection name.
    pub display_name: String,
    /// Credential kind (oauth2, api-key, basic).
    pub kind: CredentialKind,
    /// AEAD-encrypted credential payload.
    pub encrypted_credentials: Vec<u8>,
    /// Non-encrypted metadata for filtering/display.
    pub metadata: JsonValue,
    /// Timestamp when the connection was created.
    pub created_at: Timestamp,
    /// Timestamp when the connection was last updated.
    pub updated_at: Timestamp,
    /// Timestamp when the connection was soft-deleted.
    pub deleted_at: Option<Timestamp>,
}

/// Data for creating a new connection.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = connections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewConnection {
    /// Owning organization.
    pub organization_id: Uuid,
    /// Connector application identifier.
    pub app_id: String,
    /// Human-readable connection name.
    pub display_name: String,
    /// Credential kind.
    pub kind: CredentialKind,
    /// AEAD-encrypted credential payload.
    pub encrypted_credentials: Vec<u8>,
    /// Non-encrypted metadata.
    pub metadata: Option<JsonValue>,
}

/// Data for updating a connection.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = connections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateConnection {
    /// Human-readable connection name.
    pub display_name: Option<String>,
    /// AEAD-encrypted credential payload, re-encrypted on rotation.
    pub encrypted_credentials: Option<Vec<u8>>,
    /// Non-encrypted metadata.
    pub metadata: Option<JsonValue>,
    /// Soft delete timestamp.
    pub deleted_at: Option<Option<Timestamp>>,
}

impl Connection {
    /// Returns whether the connection is deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl HasCreatedAt for Connection {
    fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }
}

impl HasUpdatedAt for Connection {
    fn updated_at(&self) -> jiff::Timestamp {
        self.updated_at.into()
    }
}

impl HasDeletedAt for Connection {
    fn deleted_at(&self) -> Option<jiff::Timestamp> {
        self.deleted_at.map(Into::into)
    }
}
