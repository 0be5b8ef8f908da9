//! Authentication state extractor.
//!
//! This module provides [`AuthState`], the primary extractor used by route
//! handlers to obtain the caller's organization scope. Verification is
//! limited to the JWT's cryptographic signature and standard claims (issuer,
//! audience, expiry) — there is no backing account or session table to check
//! against, so a validly signed token is authoritative.

use std::hash::Hash;

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use derive_more::{Deref, DerefMut};
use serde::Deserialize;

use super::AuthClaims;
use crate::handler::{Error, Result};
use crate::service::AuthKeys;

/// Authenticated caller state, scoped to a single organization.
///
/// [`AuthState`] extraction succeeds only when the request carries a JWT
/// signed with the server's configured [`AuthKeys`] and not yet expired.
#[derive(Debug, Clone, Deref, DerefMut, Hash, PartialEq, Eq)]
pub struct AuthState<T = ()>(pub AuthClaims<T>)
where
    T: Clone + Hash + PartialEq + Eq + for<'de> Deserialize<'de>;

impl<T> AuthState<T>
where
    T: Clone + Hash + PartialEq + Eq + for<'de> Deserialize<'de>,
{
    /// Builds an `AuthState` directly from already-verified claims.
    ///
    /// Used by token-issuance handlers, which construct claims locally and
    /// never need to round-trip them through header parsing.
    pub const fn from_verified_claims(claims: AuthClaims<T>) -> Self {
        Self(claims)
    }

    async fn from_unverified_header(
        auth_header: TypedHeader<Authorization<Bearer>>,
        auth_keys: &AuthKeys,
    ) -> Result<Self> {
        let claims = AuthClaims::from_header(auth_header, auth_keys.decoding_key())?;
        Ok(Self(claims))
    }
}

impl<T, S> FromRequestParts<S> for AuthState<T>
where
    T: Clone + Hash + PartialEq + Eq + for<'de> Deserialize<'de> + Send + Sync + 'static,
    S: Sync + Send,
    AuthKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_state) = parts.extensions.get::<Self>() {
            return Ok(auth_state.clone());
        }

        type AuthBearerHeader = TypedHeader<Authorization<Bearer>>;
        let auth_keys = AuthKeys::from_ref(state);
        let bearer_header = AuthBearerHeader::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                crate::handler::ErrorKind::MissingAuthToken
                    .with_message("Authentication required")
                    .with_context("Missing Authorization header with Bearer token")
                    .with_resource("authentication")
            })?;

        let auth_state = Self::from_unverified_header(bearer_header, &auth_keys).await?;
        parts.extensions.insert(auth_state.clone());
        Ok(auth_state)
    }
}

impl<T, S> OptionalFromRequestParts<S> for AuthState<T>
where
    T: Clone + Hash + PartialEq + Eq + for<'de> Deserialize<'de> + Send + Sync + 'static,
    S: Sync + Send,
    AuthKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <Self as FromRequestParts<S>>::from_request_parts(parts, state).await {
            Ok(auth_state) => Ok(Some(auth_state)),
            Err(_) => Ok(None),
        }
    }
}

impl<T> aide::OperationInput for AuthState<T>
where
    T: Clone + Hash + PartialEq + Eq + for<'de> Deserialize<'de>,
{
    fn operation_input(
        _ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        operation
            .security
            .push(aide::openapi::SecurityRequirement::from_iter([(
                "bearer_auth".to_string(),
                Vec::new(),
            )]));
    }
}
