//! Organization model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::organizations;
use crate::types::{HasCreatedAt, HasDeletedAt, HasUpdatedAt};

/// Organization model representing the tenancy boundary every other entity
/// is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = organizations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Organization {
    /// Unique organization identifier.
    pub id: Uuid,
    /// Human-readable organization name.
    pub name: String,
    /// URL-safe unique slug.
    pub slug: String,
    /// Timestamp when the organization was created.
    pub created_at: Timestamp,
    /// Timestamp when the organization was last updated.
    pub updated_at: Timestamp,
    /// Timestamp when the organization was soft-deleted.
    pub deleted_at: Option<Timestamp>,
}

/// Data for creating a new organization.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = organizations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewOrganization {
    /// Organization name.
    pub name: String,
    /// URL-safe unique slug.
    pub slug: String,
}

/// Data for updating an organization.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = organizations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateOrganization {
    /// Organization name.
    pub name: Option<String>,
    /// URL-safe unique slug.
    pub slug: Option<String>,
    /// Soft delete timestamp.
    pub deleted_at: Option<Option<Timestamp>>,
}

impl Organization {
    /// Returns whether the organization is deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl HasCreatedAt for Organization {
    fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }
}

impl HasUpdatedAt for Organization {
    fn updated_at(&self) -> jiff::Timestamp {
        self.updated_at.into()
    }
}

impl HasDeletedAt for Organization {
    fn deleted_at(&self) -> Option<jiff::Timestamp> {
        self.deleted_at.map(Into::into)
    }
}
