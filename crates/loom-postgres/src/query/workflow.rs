//! Workflow repository for managing workflow identity and deployment state.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewWorkflow, UpdateWorkflow, Workflow};
use crate::types::{CursorPage, CursorPagination, OffsetPagination};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for workflow database operations.
pub trait WorkflowRepository {
    /// Creates a new workflow.
    fn create_workflow(
        &mut self,
        new_workflow: NewWorkflow,
    ) -> impl Future<Output = PgResult<Workflow>> + Send;

    /// Finds a workflow by ID within a specific organization.
    fn find_workflow_in_organization(
        &mut self,
        organization_id: Uuid,
        workflow_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Workflow>>> + Send;

    /// Lists all workflows in an organization with offset pagination.
    fn offset_list_workflows(
        &mut self,
        organization_id: Uuid,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<Vec<Workflow>>> + Send;

    /// Lists all workflows in an organization with cursor pagination.
    fn cursor_list_workflows(
        &mut self,
        organization_id: Uuid,
        pagination: CursorPagination,
    ) -> impl Future<Output = PgResult<CursorPage<Workflow>>> + Send;

    /// Updates a workflow with new data.
    fn update_workflow(
        &mut self,
        organization_id: Uuid,
        workflow_id: Uuid,
        updates: UpdateWorkflow,
    ) -> impl Future<Output = PgResult<Workflow>> + Send;

    /// Soft deletes a workflow.
    fn delete_workflow(
        &mut self,
        organization_id: Uuid,
        workflow_id: Uuid,
    ) -> impl Future<Output = PgResult<()>> + Send;

    /// Counts workflows in an organization.
    fn count_workflows(&mut self, organization_id: Uuid) -> impl Future<Output = PgResult<i64>> + Send;
}

impl WorkflowRepository for PgConnection {
    async fn create_workflow(&mut self, new_workflow: NewWorkflow) -> PgResult<Workflow> {
        use schema::workflows;

        let workflow = diesel::insert_into(workflows::table)
            .values(&new_workflow)
            .returning(Workflow::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(workflow)
    }

    async fn find_workflow_in_organization(
        &mut self,
        organization_id: Uuid,
        workflow_id: Uuid,
    ) -> PgResult<Option<Workflow>> {
        use schema::workflows::{self, dsl};

        let workflow = workflows::table
            .filter(dsl::id.eq(workflow_id))
            .filter(dsl::organization_id.eq(organization_id))
            .filter(dsl::deleted_at.is_null())
            .select(Workflow::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(workflow)
    }

    async fn offset_list_workflows(
        &mut self,
        organization_id: Uuid,
        pagination: OffsetPagination,
    ) -> PgResult<Vec<Workflow>> {
        use schema::workflows::{self, dsl};

        let workflows = workflows::table
            .filter(dsl::organization_id.eq(organization_id))
            .filter(dsl::deleted_at.is_null())
            .order(dsl::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Workflow::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(workflows)
    }

    async fn cursor_list_workflows(
        &mut self,
        organization_id: Uuid,
        pagination: CursorPagination,
    ) -> PgResult<CursorPage<Workflow>> {
        use schema::workflows::{self, dsl};

        let total = if pagination.include_count {
            Some(
                workflows::table
                    .filter(dsl::organization_id.eq(organization_id))
                    .filter(dsl::deleted_at.is_null())
                    .count()
                    .get_result::<i64>(self)
                    .await
                    .map_err(PgError::from)?,
            )
        } else {
            None
        };

        let limit = pagination.fetch_limit();

        let items: Vec<Workflow> = if let Some(cursor) = &pagination.after {
            let cursor_time = jiff_diesel::Timestamp::from(cursor.timestamp);

            workflows::table
                .filter(dsl::organization_id.eq(organization_id))
                .filter(dsl::deleted_at.is_null())
                .filter(
                    dsl::created_at
                        .lt(&cursor_time)
                        .or(dsl::created_at.eq(&cursor_time).and(dsl::id.lt(cursor.id))),
                )
                .select(Workflow::as_select())
                .order((dsl::created_at.desc(), dsl::id.desc()))
                .limit(limit)
                .load(self)
                .await
                .map_err(PgError::from)?
        } else {
            workflows::table
                .filter(dsl::organization_id.eq(organization_id))
                .filter(dsl::deleted_at.is_null())
                .select(Workflow::as_select())
                .order((dsl::created_at.desc(), dsl::id.desc()))
                .limit(limit)
                .load(self)
                .await
                .map_err(PgError::from)?
        };

        Ok(CursorPage::new(
            items,
            total,
            pagination.limit,
            |w: &Workflow| (w.created_at.into(), w.id),
        ))
    }

    async fn update_workflow(
        &mut self,
        organization_id: Uuid,
        workflow_id: Uuid,
        updates: UpdateWorkflow,
    ) -> PgResult<Workflow> {
        use schema::workflows::{self, dsl};

        let workflow = diesel::update(
            workflows::table
                .filter(dsl::id.eq(workflow_id))
                .filter(dsl::organization_id.eq(organization_id)),
        )
        .set(&updates)
        .returning(Workflow::as_returning())
        .get_result(self)
        .await
        .map_err(PgError::from)?;

        Ok(workflow)
    }

    async fn delete_workflow(&mut self, organization_id: Uuid, workflow_id: Uuid) -> PgResult<()> {
        use diesel::dsl::now;
        use schema::workflows::{self, dsl};

        diesel::update(
            workflows::table
                .filter(dsl::id.eq(workflow_id))
                .filter(dsl::organization_id.eq(organization_id)),
        )
        .set(dsl::deleted_at.eq(now))
        .execute(self)
        .await
        .map_err(PgError::from)?;

        Ok(())
    }

    async fn count_workflows(&mut self, organization_id: Uuid) -> PgResult<i64> {
        use schema::workflows::{self, dsl};

        let count = workflows::table
            .filter(dsl::organization_id.eq(organization_id))
            .filter(dsl::deleted_at.is_null())
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(count)
    }
}
