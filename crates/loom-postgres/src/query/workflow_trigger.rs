//! Workflow trigger repository for webhook/polling trigger records.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewWorkflowTrigger, UpdateWorkflowTrigger, WorkflowTrigger};
use crate::types::{CursorPage, CursorPagination, OffsetPagination};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for workflow trigger database operations.
pub trait WorkflowTriggerRepository {
    /// Creates a new workflow trigger.
    fn create_workflow_trigger(
        &mut self,
        new_trigger: NewWorkflowTrigger,
    ) -> impl Future<Output = PgResult<WorkflowTrigger>> + Send;

    /// Finds a trigger by ID within a specific organization.
    fn find_trigger_in_organization(
        &mut self,
        organization_id: Uuid,
        trigger_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<WorkflowTrigger>>> + Send;

    /// Finds an active webhook trigger by its public endpoint path.
    ///
    /// Endpoints are unique across the whole deployment, so this is not
    /// organization-scoped; the caller derives the organization from the result.
    fn find_webhook_trigger_by_endpoint(
        &mut self,
        endpoint: &str,
    ) -> impl Future<Output = PgResult<Option<WorkflowTrigger>>> + Send;

    /// Finds active polling triggers due for a poll at or before `now`,
    /// up to `limit` rows, ordered oldest-due first.
    fn find_due_polling_triggers(
        &mut self,
        now: jiff::Timestamp,
        limit: i64,
    ) -> impl Future<Output = PgResult<Vec<WorkflowTrigger>>> + Send;

    /// Lists all triggers for a workflow.
    fn list_workflow_triggers(
        &mut self,
        workflow_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<WorkflowTrigger>>> + Send;

    /// Lists every active trigger across every organization, for populating
    /// the in-process trigger registry at startup and on refresh.
    fn list_active_triggers(&mut self) -> impl Future<Output = PgResult<Vec<WorkflowTrigger>>> + Send;

    /// Lists all triggers in an organization with offset pagination.
    fn offset_list_triggers(
        &mut self,
        organization_id: Uuid,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<Vec<WorkflowTrigger>>> + Send;

    /// Lists all triggers in an organization with cursor pagination.
    fn cursor_list_triggers(
        &mut self,
        organization_id: Uuid,
        pagination: CursorPagination,
    ) -> impl Future<Output = PgResult<CursorPage<WorkflowTrigger>>> + Send;

    /// Applies a partial update (cursor, backoff, status, activation) to a trigger.
    fn update_workflow_trigger(
        &mut self,
        trigger_id: Uuid,
        updates: UpdateWorkflowTrigger,
    ) -> impl Future<Output = PgResult<WorkflowTrigger>> + Send;
}

impl WorkflowTriggerRepository for PgConnection {
    async fn create_workflow_trigger(
        &mut self,
        new_trigger: NewWorkflowTrigger,
    ) -> PgResult<WorkflowTrigger> {
        use schema::workflow_triggers;

        let trigger = diesel::insert_into(workflow_triggers::table)
            .values(&new_trigger)
            .returning(WorkflowTrigger::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(trigger)
    }

    async fn find_trigger_in_organization(
        &mut self,
        organization_id: Uuid,
        trigger_id: Uuid,
    ) -> PgResult<Option<WorkflowTrigger>> {
        use schema::workflow_triggers::{self, dsl};

        let trigger = workflow_triggers::table
            .filter(dsl::id.eq(trigger_id))
            .filter(dsl::organization_id.eq(organization_id))
            .select(WorkflowTrigger::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(trigger)
    }

    async fn find_webhook_trigger_by_endpoint(
        &mut self,
        endpoint: &str,
    ) -> PgResult<Option<WorkflowTrigger>> {
        use schema::workflow_triggers::{self, dsl};

        let trigger = workflow_triggers::table
            .filter(dsl::endpoint.eq(endpoint))
            .filter(dsl::is_active.eq(true))
            .select(WorkflowTrigger::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(trigger)
    }

    async fn find_due_polling_triggers(
        &mut self,
        now: jiff::Timestamp,
        limit: i64,
    ) -> PgResult<Vec<WorkflowTrigger>> {
        use schema::workflow_triggers::{self, dsl};

        let now = jiff_diesel::Timestamp::from(now);

        let triggers = workflow_triggers::table
            .filter(dsl::is_active.eq(true))
            .filter(dsl::next_poll_at.le(now))
            .order(dsl::next_poll_at.asc())
            .limit(limit)
            .select(WorkflowTrigger::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(triggers)
    }

    async fn list_workflow_triggers(
        &mut self,
        workflow_id: Uuid,
    ) -> PgResult<Vec<WorkflowTrigger>> {
        use schema::workflow_triggers::{self, dsl};

        let triggers = workflow_triggers::table
            .filter(dsl::workflow_id.eq(workflow_id))
            .order(dsl::created_at.asc())
            .select(WorkflowTrigger::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(triggers)
    }

    async fn list_active_triggers(&mut self) -> PgResult<Vec<WorkflowTrigger>> {
        use schema::workflow_triggers::{self, dsl};

        let triggers = workflow_triggers::table
            .filter(dsl::is_active.eq(true))
            .order(dsl::created_at.asc())
            .select(WorkflowTrigger::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(triggers)
    }

    async fn offset_list_triggers(
        &mut self,
        organization_id: Uuid,
        pagination: OffsetPagination,
    ) -> PgResult<Vec<WorkflowTrigger>> {
        use schema::workflow_triggers::{self, dsl};

        let triggers = workflow_triggers::table
            .filter(dsl::organization_id.eq(organization_id))
            .order(dsl::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(WorkflowTrigger::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(triggers)
    }

    async fn cursor_list_triggers(
        &mut self,
        organization_id: Uuid,
        pagination: CursorPagination,
    ) -> PgResult<CursorPage<WorkflowTrigger>> {
        use schema::workflow_triggers::{self, dsl};

        let total = if pagination.include_count {
            Some(
                workflow_triggers::table
                    .filter(dsl::organization_id.eq(organization_id))
                    .count()
                    .get_result::<i64>(self)
                    .await
                    .map_err(PgError::from)?,
            )
        } else {
            None
        };

        let limit = pagination.fetch_limit();

        let items: Vec<WorkflowTrigger> = if let Some(cursor) = &pagination.after {
            let cursor_time = jiff_diesel::Timestamp::from(cursor.timestamp);

            workflow_triggers::table
                .filter(dsl::organization_id.eq(organization_id))
                .filter(
                    dsl::created_at
                        .lt(&cursor_time)
                        .or(dsl::created_at.eq(&cursor_time).and(dsl::id.lt(cursor.id))),
                )
                .select(WorkflowTrigger::as_select())
                .order((dsl::created_at.desc(), dsl::id.desc()))
                .limit(limit)
                .load(self)
                .await
                .map_err(PgError::from)?
        } else {
            workflow_triggers::table
                .filter(dsl::organization_id.eq(organization_id))
                .select(WorkflowTrigger::as_select())
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
            |t: &WorkflowTrigger| (t.created_at.into(), t.id),
        ))
    }

    async fn update_workflow_trigger(
        &mut self,
        trigger_id: Uuid,
        updates: UpdateWorkflowTrigger,
    ) -> PgResult<WorkflowTrigger> {
        use schema::workflow_triggers::{self, dsl};

        let trigger = diesel::update(workflow_triggers::table.filter(dsl::id.eq(trigger_id)))
            .set(&updates)
            .returning(WorkflowTrigger::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(trigger)
    }
}
