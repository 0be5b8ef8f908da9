//! Workflow model for PostgreSQL database operations.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::workflows;
use crate::types::{HasCreatedAt, HasDeletedAt, HasUpdatedAt};

/// Workflow model. The graph itself lives on [`super::WorkflowVersion`];
/// this row tracks identity and which version is deployed.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = workflows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Workflow {
    /// Unique workflow identifier.
    pub id: Uuid,
    /// Owning organization.
    pub organization_id: Uuid,
    /// Human-readable workflow name.
    pub name: String,
    /// Version number currently deployed, if any.
    pub active_version: Option<i32>,
    /// Whether the workflow accepts new triggers.
    pub is_active: bool,
    /// Timestamp when the workflow was created.
    pub created_at: Timestamp,
    /// Timestamp when the workflow was last updated.
    pub updated_at: Timestamp,
    /// Timestamp when the workflow was soft-deleted.
    pub deleted_at: Option<Timestamp>,
}

/// Data for creating a new workflow.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = workflows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewWorkflow {
    /// Owning organization.
    pub organization_id: Uuid,
    /// Human-readable workflow name.
    pub name: String,
}

/// Data for updating a workflow.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = workflows)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateWorkflow {
    /// Human-readable workflow name.
    pub name: Option<String>,
    /// Version number to deploy.
    pub active_version: Option<Option<i32>>,
    /// Whether the workflow accepts new triggers.
    pub is_active: Option<bool>,
    /// Soft delete timestamp.
    pub deleted_at: Option<Option<Timestamp>>,
}

impl Workflow {
    /// Returns whether the workflow is deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns whether the workflow has a deployed version.
    pub fn is_deployed(&self) -> bool {
        self.active_version.is_some()
    }
}

impl HasCreatedAt for Workflow {
    fn created_at(&self) -> jiff::Timestamp {
        self.created_at.into()
    }
}

impl HasUpdatedAt for Workflow {
    fn updated_at(&self) -> jiff::Timestamp {
        self.updated_at.into()
    }
}

impl HasDeletedAt for Workflow {
    fn deleted_at(&self) -> Option<jiff::Timestamp> {
        self.deleted_at.map(Into::into)
    }
}
