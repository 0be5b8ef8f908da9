//! Authentication and authorization module.
//!
//! This module provides JWT-based authentication and organization-scoped
//! authorization. Every token is issued for exactly one organization; there
//! is no notion of individual user accounts, roles, or permissions at this
//! layer.

mod auth_provider;
mod auth_state;
mod jwt_claims;
mod jwt_header;

pub use self::auth_provider::AuthProvider;
pub use self::auth_state::AuthState;
pub use self::jwt_claims::AuthClaims;
pub use self::jwt_header::AuthHeader;

/// Tracing target for authentication operations.
///
/// Used for logging JWT token validation and other operations that verify
/// caller identity and token validity.
pub const TRACING_TARGET_AUTHENTICATION: &str = "loom_server::extract::authentication";

/// Tracing target for authorization operations.
///
/// Used for logging organization-scope checks on accessed resources.
pub const TRACING_TARGET_AUTHORIZATION: &str = "loom_server::extract::authorization";

impl<T> AuthProvider for AuthClaims<T> {
    fn organization_id(&self) -> uuid::Uuid {
        self.organization_id
    }
}
