//! Workflow execution repository for run lifecycle and queryable history.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewWorkflowExecution, UpdateWorkflowExecution, WorkflowExecution};
use crate::types::{CursorPage, CursorPagination, ExecutionStatus, OffsetPagination};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for workflow execution database operations.
pub trait WorkflowExecutionRepository {
    /// Creates a new workflow execution.
    fn create_workflow_execution(
        &mut self,
        new_execution: NewWorkflowExecution,
    ) -> impl Future<Output = PgResult<WorkflowExecution>> + Send;

    /// Finds an execution by ID within a specific organization.
    fn find_execution_in_organization(
        &mut self,
        organization_id: Uuid,
        execution_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<WorkflowExecution>>> + Send;

    /// Lists executions in an organization, optionally filtered by status,
    /// with offset pagination.
    fn offset_list_executions(
        &mut self,
        organization_id: Uuid,
        status_filter: Option<ExecutionStatus>,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<Vec<WorkflowExecution>>> + Send;

    /// Lists executions in an organization with cursor pagination.
    fn cursor_list_executions(
        &mut self,
        organization_id: Uuid,
        status_filter: Option<ExecutionStatus>,
        pagination: CursorPagination,
    ) -> impl Future<Output = PgResult<CursorPage<WorkflowExecution>>> + Send;

    /// Applies a partial update to an execution's lifecycle state.
    fn update_workflow_execution(
        &mut self,
        execution_id: Uuid,
        updates: UpdateWorkflowExecution,
    ) -> impl Future<Output = PgResult<WorkflowExecution>> + Send;

    /// Counts executions in an organization by status.
    fn count_executions_by_status(
        &mut self,
        organization_id: Uuid,
        status: ExecutionStatus,
    ) -> impl Future<Output = PgResult<i64>> + Send;
}

impl WorkflowExecutionRepository for PgConnection {
    async fn create_workflow_execution(
        &mut self,
        new_execution: NewWorkflowExecution,
    ) -> PgResult<WorkflowExecution> {
        use schema::workflow_executions;

        let execution = diesel::insert_into(workflow_executions::table)
            .values(&new_execution)
            .returning(WorkflowExecution::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(execution)
    }

    async fn find_execution_in_organization(
        &mut self,
        organization_id: Uuid,
        execution_id: Uuid,
    ) -> PgResult<Option<WorkflowExecution>> {
        use schema::workflow_executions::{self, dsl};

        let execution = workflow_executions::table
            .filter(dsl::id.eq(execution_id))
            .filter(dsl::organization_id.eq(organization_id))
            .select(WorkflowExecution::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(execution)
    }

    async fn offset_list_executions(
        &mut self,
        organization_id: Uuid,
        status_filter: Option<ExecutionStatus>,
        pagination: OffsetPagination,
    ) -> PgResult<Vec<WorkflowExecution>> {
        use schema::workflow_executions::{self, dsl};

        let mut query = workflow_executions::table
            .filter(dsl::organization_id.eq(organization_id))
            .into_boxed();

        if let Some(status) = status_filter {
            query = query.filter(dsl::status.eq(status));
        }

        let executions = query
            .order(dsl::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(WorkflowExecution::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(executions)
    }

    async fn cursor_list_executions(
        &mut self,
        organization_id: Uuid,
        status_filter: Option<ExecutionStatus>,
        pagination: CursorPagination,
    ) -> PgResult<CursorPage<WorkflowExecution>> {
        use schema::workflow_executions::{self, dsl};

        let total = if pagination.include_count {
            let mut count_query = workflow_executions::table
                .filter(dsl::organization_id.eq(organization_id))
                .into_boxed();
            if let Some(status) = status_filter {
                count_query = count_query.filter(dsl::status.eq(status));
            }
            Some(
                count_query
                    .count()
                    .get_result::<i64>(self)
                    .await
                    .map_err(PgError::from)?,
            )
        } else {
            None
        };

        let limit = pagination.fetch_limit();

        let mut query = workflow_executions::table
            .filter(dsl::organization_id.eq(organization_id))
            .into_boxed();
        if let Some(status) = status_filter {
            query = query.filter(dsl::status.eq(status));
        }

        let items: Vec<WorkflowExecution> = if let Some(cursor) = &pagination.after {
            let cursor_time = jiff_diesel::Timestamp::from(cursor.timestamp);

            query
                .filter(
                    dsl::created_at
                        .lt(&cursor_time)
                        .or(dsl::created_at.eq(&cursor_time).and(dsl::id.lt(cursor.id))),
                )
                .select(WorkflowExecution::as_select())
                .order((dsl::created_at.desc(), dsl::id.desc()))
                .limit(limit)
                .load(self)
                .await
                .map_err(PgError::from)?
        } else {
            query
                .select(WorkflowExecution::as_select())
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
            |e: &WorkflowExecution| (e.created_at.into(), e.id),
        ))
    }

    async fn update_workflow_execution(
        &mut self,
        execution_id: Uuid,
        updates: UpdateWorkflowExecution,
    ) -> PgResult<WorkflowExecution> {
        use schema::workflow_executions::{self, dsl};

        let execution = diesel::update(workflow_executions::table.filter(dsl::id.eq(execution_id)))
            .set(&updates)
            .returning(WorkflowExecution::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(execution)
    }

    async fn count_executions_by_status(
        &mut self,
        organization_id: Uuid,
        status: ExecutionStatus,
    ) -> PgResult<i64> {
        use schema::workflow_executions::{self, dsl};

        let count = workflow_executions::table
            .filter(dsl::organization_id.eq(organization_id))
            .filter(dsl::status.eq(status))
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(count)
    }
}
