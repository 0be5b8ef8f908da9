//! Organization repository for managing the tenancy boundary.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewOrganization, Organization, UpdateOrganization};
use crate::types::{CursorPage, CursorPagination, OffsetPagination};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for organization database operations.
pub trait OrganizationRepository {
    /// Creates a new organization.
    fn create_organization(
        &mut self,
        new_organization: NewOrganization,
    ) -> impl Future<Output = PgResult<Organization>> + Send;

    /// Finds an organization by its unique identifier.
    fn find_organization_by_id(
        &mut self,
        organization_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Organization>>> + Send;

    /// Finds an organization by its unique slug.
    fn find_organization_by_slug(
        &mut self,
        slug: &str,
    ) -> impl Future<Output = PgResult<Option<Organization>>> + Send;

    /// Lists organizations with offset pagination.
    fn offset_list_organizations(
        &mut self,
        pagination: OffsetPagination,
    ) -> impl Future<Output = PgResult<Vec<Organization>>> + Send;

    /// Lists organizations with cursor pagination.
    fn cursor_list_organizations(
        &mut self,
        pagination: CursorPagination,
    ) -> impl Future<Output = PgResult<CursorPage<Organization>>> + Send;

    /// Updates an organization with new data.
    fn update_organization(
        &mut self,
        organization_id: Uuid,
        updates: UpdateOrganization,
    ) -> impl Future<Output = PgResult<Organization>> + Send;

    /// Soft deletes an organization.
    fn delete_organization(
        &mut self,
        organization_id: Uuid,
    ) -> impl Future<Output = PgResult<()>> + Send;

    /// Counts organizations.
    fn count_organizations(&mut self) -> impl Future<Output = PgResult<i64>> + Send;
}

impl OrganizationRepository for PgConnection {
    async fn create_organization(
        &mut self,
        new_organization: NewOrganization,
    ) -> PgResult<Organization> {
        use schema::organizations;

        let organization = diesel::insert_into(organizations::table)
            .values(&new_organization)
            .returning(Organization::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(organization)
    }

    async fn find_organization_by_id(
        &mut self,
        organization_id: Uuid,
    ) -> PgResult<Option<Organization>> {
        use schema::organizations::{self, dsl};

        let organization = organizations::table
            .filter(dsl::id.eq(organization_id))
            .filter(dsl::deleted_at.is_null())
            .select(Organization::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(organization)
    }

    async fn find_organization_by_slug(&mut self, slug: &str) -> PgResult<Option<Organization>> {
        use schema::organizations::{self, dsl};

        let organization = organizations::table
            .filter(dsl::slug.eq(slug))
            .filter(dsl::deleted_at.is_null())
            .select(Organization::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(organization)
    }

    async fn offset_list_organizations(
        &mut self,
        pagination: OffsetPagination,
    ) -> PgResult<Vec<Organization>> {
        use schema::organizations::{self, dsl};

        let organizations = organizations::table
            .filter(dsl::deleted_at.is_null())
            .order(dsl::created_at.desc())
            .limit(pagination.limit)
            .offset(pagination.offset)
            .select(Organization::as_select())
            .load(self)
            .await
            .map_err(PgError::from)?;

        Ok(organizations)
    }

    async fn cursor_list_organizations(
        &mut self,
        pagination: CursorPagination,
    ) -> PgResult<CursorPage<Organization>> {
        use schema::organizations::{self, dsl};

        let total = if pagination.include_count {
            Some(
                organizations::table
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

        let items: Vec<Organization> = if let Some(cursor) = &pagination.after {
            let cursor_time = jiff_diesel::Timestamp::from(cursor.timestamp);

            organizations::table
                .filter(dsl::deleted_at.is_null())
                .filter(
                    dsl::created_at
                        .lt(&cursor_time)
                        .or(dsl::created_at.eq(&cursor_time).and(dsl::id.lt(cursor.id))),
                )
                .select(Organization::as_select())
                .order((dsl::created_at.desc(), dsl::id.desc()))
                .limit(limit)
                .load(self)
                .await
                .map_err(PgError::from)?
        } else {
            organizations::table
                .filter(dsl::deleted_at.is_null())
                .select(Organization::as_select())
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
            |o: &Organization| (o.created_at.into(), o.id),
        ))
    }

    async fn update_organization(
        &mut self,
        organization_id: Uuid,
        updates: UpdateOrganization,
    ) -> PgResult<Organization> {
        use schema::organizations::{self, dsl};

        let organization = diesel::update(organizations::table.filter(dsl::id.eq(organization_id)))
            .set(&updates)
            .returning(Organization::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(organization)
    }

    async fn delete_organization(&mut self, organization_id: Uuid) -> PgResult<()> {
        use diesel::dsl::now;
        use schema::organizations::{self, dsl};

        diesel::update(organizations::table.filter(dsl::id.eq(organization_id)))
            .set(dsl::deleted_at.eq(now))
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(())
    }

    async fn count_organizations(&mut self) -> PgResult<i64> {
        use schema::organizations::{self, dsl};

        let count = organizations::table
            .filter(dsl::deleted_at.is_null())
            .count()
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(count)
    }
}
