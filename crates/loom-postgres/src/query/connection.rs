//! Connection repository for managing encrypted provider credentials.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{Connection, NewConnection, UpdateConnection};
use crate::types::{CursorPage, CursorPagination, OffsetPagination};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for connection database operations.
///
/// Every query is organization-scoped at the SQL layer, not just the
/// handler layer, to enforce cross-organization isolation.
pub trait ConnectionRepository {
    /// Creates a new connection record.
    fn create_connection(
        &mut self,
        new_connection: NewConnection,
    ) -> impl Future<Output = PgResult<Connection>> + Send;

    /// Finds a connection by ID within a specific organization.
    fn find_connection_in_organization(
        &mut self,
        organization_id: Uuid,
        connection_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Connection>>> + Send;

    /// Finds connections by application id within an organization.
    fn find_connections_by_app_id(
        &mut self,
        organization_id: Uuid,
        app_id: &str,
    ) -> impl Future<Output = PgResult<Vec<Connection>>> + Send;

    /// Lists all connections in an organization with offset pagination.
    fn offset_list_connections(
        &mut self,
        organization_id: Uuid,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<Vec<Connection>>> + Send;

    /// Lists all connections in an organization with cursor pagination.
    fn cursor_list_connections(
        &mut self,
        organization_id: Uuid,
        pagination: CursorPagination,
    ) -> impl Future<Output = PgResult<CursorPage<Connection>>> + Send;

    /// Updates a connection with new data.
    fn update_connection(
        &mut self,
        organization_id: Uuid,
        connection_id: Uuid,
        updates: UpdateConnection,
    ) -> impl Future<Output = PgResult<Connection>> + Send;

    /// Soft deletes a connection.
    fn delete_connection(
        &mut self,
        organization_id: Uuid,
        connection_id: Uuid,
    ) -> impl Future<Output = PgResult<()>> + Send;

    /// Counts connections in an organization.
    fn count_connections(
        &mut self,
        organization_id: Uuid,
    ) -> impl Future<Output = PgResult<i64>> + Send;
}

impl ConnectionRepository for PgConnection {
    async fn create_connection(&mut self, new_connection: NewConnection) -> PgResult<Connection> {
        use schema::connections;

        let connection = diesel::insert_into(connections::table)
            .values(&new_connection)
            .returning(Connection::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(connection)
    }

    async fn find_connection_in_organization(
        &mut self,
        organization_id: Uuid,
        connection_id: Uuid,
    ) -> PgResult<Option<Connection>> {
        use schema::connections::{self, dsl};

        let connection = connections::table
            .filter(dsl::id.eq(connection_id))
            .filter(dsl::organization_id.eq(organization_id))
            .filter(dsl::deleted_at.is_null())
            .select(Connection::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(connection)
    }

    async fn find_connections_by_app_id(
        &mut self,
        organization_id: Uuid,
        app_id: &str,
    ) -> PgResult<Vec<Connection>> {
        use schema::connections::{self, dsl};

        let connections = connections::table
            .filter(dsl::organization_id.eq(organization_id))
            .filter(dsl::app_id.eq(app_id))
            .filter(dsl::deleted_at.is_null())
            .order(dsl::display_name.asc())
            .select(Connection::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(connections)
    }

    async fn offset_list_connections(
        &mut self,
        organization_id: Uuid,
        pagination: OffsetPagination,
    ) -> PgResult<Vec<Connection>> {
        use schema::connections::{self, dsl};

        let connections = connections::table
            .filter(dsl::organization_id.eq(organization_id))
            .filter(dsl::deleted_at.is_null())
            .order(dsl::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Connection::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(connections)
    }

    async fn cursor_list_connections(
        &mut self,
        organization_id: Uuid,
        pagination: CursorPagination,
    ) -> PgResult<CursorPage<Connection>> {
        use schema::connections::{self, dsl};

        let total = if pagination.include_count {
            Some(
                connections::table
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

        let items: Vec<Connection> = if let Some(cursor) = &pagination.after {
            let cursor_time = jiff_diesel::Timestamp::from(cursor.timestamp);

            connections::table
                .filter(dsl::organization_id.eq(organization_id))
                .filter(dsl::deleted_at.is_null())
                .filter(
                    dsl::created_at
                        .lt(&cursor_time)
                        .or(dsl::created_at.eq(&cursor_time).and(dsl::id.lt(cursor.id))),
                )
                .select(Connection::as_select())
                .order((dsl::created_at.desc(), dsl::id.desc()))
                .limit(limit)
                .load(self)
                .await
                .map_err(PgError::from)?
        } else {
            connections::table
                .filter(dsl::organization_id.eq(organization_id))
                .filter(dsl::deleted_at.is_null())
                .select(Connection::as_select())
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
            |c: &Connection| (c.created_at.into(), c.id),
        ))
    }

    async fn update_connection(
        &mut self,
        organization_id: Uuid,
        connection_id: Uuid,
        updates: UpdateConnection,
    ) -> PgResult<Connection> {
        use schema::connections::{self, dsl};

        let connection = diesel::update(
            connections::table
                .filter(dsl::id.eq(connection_id))
                .filter(dsl::organization_id.eq(organization_id)),
        )
        .set(&updates)
        .returning(Connection::as_returning())
        .get_result(self)
        .await
        .map_err(PgError::from)?;

        Ok(connection)
    }

    async fn delete_connection(
        &mut self,
        organization_id: Uuid,
        connection_id: Uuid,
    ) -> PgResult<()> {
        use diesel::dsl::now;
        use schema::connections::{self, dsl};

        diesel::update(
            connections::table
                .filter(dsl::id.eq(connection_id))
                .filter(dsl::organization_id.eq(organization_id)),
        )
        .set(dsl::deleted_at.eq(now))
        .execute(self)
        .await
        .map_err(PgError::from)?;

        Ok(())
    }

    async fn count_connections(&mut self, organization_id: Uuid) -> PgResult<i64> {
        use schema::connections::{self, dsl};

        let count = connections::table
            .filter(dsl::organization_id.eq(organization_id))
            .filter(dsl::deleted_at.is_null())
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(count)
    }
}
