//! Webhook log repository for auditing inbound delivery attempts.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewWebhookLog, WebhookLog};
use crate::types::{CursorPage, CursorPagination};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for webhook log database operations.
pub trait WebhookLogRepository {
    /// Records a new webhook delivery attempt.
    fn create_webhook_log(
        &mut self,
        new_log: NewWebhookLog,
    ) -> impl Future<Output = PgResult<WebhookLog>> + Send;

    /// Lists logs for a trigger in an organization with cursor pagination.
    fn cursor_list_webhook_logs(
        &mut self,
        organization_id: Uuid,
        trigger_id: Uuid,
        pagination: CursorPagination,
    ) -> impl Future<Output = PgResult<CursorPage<WebhookLog>>> + Send;

    /// Counts rejected (non-processed) deliveries for a trigger.
    fn count_rejected_webhook_logs(
        &mut self,
        trigger_id: Uuid,
    ) -> impl Future<Output = PgResult<i64>> + Send;
}

impl WebhookLogRepository for PgConnection {
    async fn create_webhook_log(&mut self, new_log: NewWebhookLog) -> PgResult<WebhookLog> {
        use schema::webhook_logs;

        let log = diesel::insert_into(webhook_logs::table)
            .values(&new_log)
            .returning(WebhookLog::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(log)
    }

    async fn cursor_list_webhook_logs(
        &mut self,
        organization_id: Uuid,
        trigger_id: Uuid,
        pagination: CursorPagination,
    ) -> PgResult<CursorPage<WebhookLog>> {
        use schema::webhook_logs::{self, dsl};

        let total = if pagination.include_count {
            Some(
                webhook_logs::table
                    .filter(dsl::organization_id.eq(organization_id))
                    .filter(dsl::trigger_id.eq(trigger_id))
                    .count()
                    .get_result::<i64>(self)
                    .await
                    .map_err(PgError::from)?,
            )
        } else {
            None
        };

        let limit = pagination.fetch_limit();

        let items: Vec<WebhookLog> = if let Some(cursor) = &pagination.after {
            let cursor_time = jiff_diesel::Timestamp::from(cursor.timestamp);

            webhook_logs::table
                .filter(dsl::organization_id.eq(organization_id))
                .filter(dsl::trigger_id.eq(trigger_id))
                .filter(
                    dsl::received_at
                        .lt(&cursor_time)
                        .or(dsl::received_at.eq(&cursor_time).and(dsl::id.lt(cursor.id))),
                )
                .select(WebhookLog::as_select())
                .order((dsl::received_at.desc(), dsl::id.desc()))
                .limit(limit)
                .load(self)
                .await
                .map_err(PgError::from)?
        } else {
            webhook_logs::table
                .filter(dsl::organization_id.eq(organization_id))
                .filter(dsl::trigger_id.eq(trigger_id))
                .select(WebhookLog::as_select())
                .order((dsl::received_at.desc(), dsl::id.desc()))
                .limit(limit)
                .load(self)
                .await
                .map_err(PgError::from)?
        };

        Ok(CursorPage::new(
            items,
            total,
            pagination.limit,
            |l: &WebhookLog| (l.received_at.into(), l.id),
        ))
    }

    async fn count_rejected_webhook_logs(&mut self, trigger_id: Uuid) -> PgResult<i64> {
        use schema::webhook_logs::{self, dsl};

        let count = webhook_logs::table
            .filter(dsl::trigger_id.eq(trigger_id))
            .filter(dsl::processed.eq(false))
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(count)
    }
}
