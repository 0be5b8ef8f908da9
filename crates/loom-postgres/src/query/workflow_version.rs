//! Workflow version repository. Versions are immutable; there is no update path.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewWorkflowVersion, WorkflowVersion};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for workflow version database operations.
pub trait WorkflowVersionRepository {
    /// Creates a new workflow version.
    fn create_workflow_version(
        &mut self,
        new_version: NewWorkflowVersion,
    ) -> impl Future<Output = PgResult<WorkflowVersion>> + Send;

    /// Finds a specific version by its unique identifier.
    fn find_workflow_version_by_id(
        &mut self,
        version_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<WorkflowVersion>>> + Send;

    /// Finds a workflow's version by its version number.
    fn find_workflow_version_by_number(
        &mut self,
        workflow_id: Uuid,
        number: i32,
    ) -> impl Future<Output = PgResult<Option<WorkflowVersion>>> + Send;

    /// Lists all versions of a workflow, newest first.
    fn list_workflow_versions(
        &mut self,
        workflow_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<WorkflowVersion>>> + Send;

    /// Returns the highest version number recorded for a workflow, if any.
    fn latest_workflow_version_number(
        &mut self,
        workflow_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<i32>>> + Send;
}

impl WorkflowVersionRepository for PgConnection {
    async fn create_workflow_version(
        &mut self,
        new_version: NewWorkflowVersion,
    ) -> PgResult<WorkflowVersion> {
        use schema::workflow_versions;

        let version = diesel::insert_into(workflow_versions::table)
            .values(&new_version)
            .returning(WorkflowVersion::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(version)
    }

    async fn find_workflow_version_by_id(
        &mut self,
        version_id: Uuid,
    ) -> PgResult<Option<WorkflowVersion>> {
        use schema::workflow_versions::{self, dsl};

        let version = workflow_versions::table
            .filter(dsl::id.eq(version_id))
            .select(WorkflowVersion::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(version)
    }

    async fn find_workflow_version_by_number(
        &mut self,
        workflow_id: Uuid,
        number: i32,
    ) -> PgResult<Option<WorkflowVersion>> {
        use schema::workflow_versions::{self, dsl};

        let version = workflow_versions::table
            .filter(dsl::workflow_id.eq(workflow_id))
            .filter(dsl::number.eq(number))
            .select(WorkflowVersion::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(version)
    }

    async fn list_workflow_versions(
        &mut self,
        workflow_id: Uuid,
    ) -> PgResult<Vec<WorkflowVersion>> {
        use schema::workflow_versions::{self, dsl};

        let versions = workflow_versions::table
            .filter(dsl::workflow_id.eq(workflow_id))
            .order(dsl::number.desc())
            .select(WorkflowVersion::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(versions)
    }

    async fn latest_workflow_version_number(
        &mut self,
        workflow_id: Uuid,
    ) -> PgResult<Option<i32>> {
        use schema::workflow_versions::{self, dsl};

        let number = workflow_versions::table
            .filter(dsl::workflow_id.eq(workflow_id))
            .order(dsl::number.desc())
            .select(dsl::number)
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(number)
    }
}
