//! Resume token repository for suspended execution handoffs.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewResumeToken, ResumeToken};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for resume token database operations.
pub trait ResumeTokenRepository {
    /// Mints a new resume token for a suspended execution.
    fn create_resume_token(
        &mut self,
        new_token: NewResumeToken,
    ) -> impl Future<Output = PgResult<ResumeToken>> + Send;

    /// Finds an unconsumed, unexpired resume token by its id.
    fn find_valid_resume_token(
        &mut self,
        token_id: Uuid,
        now: jiff::Timestamp,
    ) -> impl Future<Output = PgResult<Option<ResumeToken>>> + Send;

    /// Atomically marks a resume token as consumed.
    ///
    /// Returns `None` if the token was already consumed (no row matched),
    /// which callers must treat as "already redeemed" rather than "not found".
    fn consume_resume_token(
        &mut self,
        token_id: Uuid,
        consumed_at: jiff::Timestamp,
    ) -> impl Future<Output = PgResult<Option<ResumeToken>>> + Send;
}

impl ResumeTokenRepository for PgConnection {
    async fn create_resume_token(&mut self, new_token: NewResumeToken) -> PgResult<ResumeToken> {
        use schema::resume_tokens;

        let token = diesel::insert_into(resume_tokens::table)
            .values(&new_token)
            .returning(ResumeToken::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        Ok(token)
    }

    async fn find_valid_resume_token(
        &mut self,
        token_id: Uuid,
        now: jiff::Timestamp,
    ) -> PgResult<Option<ResumeToken>> {
        use schema::resume_tokens::{self, dsl};

        let now = jiff_diesel::Timestamp::from(now);

        let token = resume_tokens::table
            .filter(dsl::id.eq(token_id))
            .filter(dsl::consumed_at.is_null())
            .filter(dsl::expires_at.gt(now))
            .select(ResumeToken::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(token)
    }

    async fn consume_resume_token(
        &mut self,
        token_id: Uuid,
        consumed_at: jiff::Timestamp,
    ) -> PgResult<Option<ResumeToken>> {
        use schema::resume_tokens::{self, dsl};

        let consumed_at = jiff_diesel::Timestamp::from(consumed_at);

        let token = diesel::update(
            resume_tokens::table
                .filter(dsl::id.eq(token_id))
                .filter(dsl::consumed_at.is_null()),
        )
        .set(dsl::consumed_at.eq(consumed_at))
        .returning(ResumeToken::as_returning())
        .get_result(self)
        .await
        .optional()
        .map_err(PgError::from)?;

        Ok(token)
    }
}
