//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust
//! use aide::axum::ApiRouter;
//! use axum::routing::get;
//! use loom_server::handler::{CustomRoutes, routes};
//! use loom_server::service::{ServiceConfig, ServiceState};
//!
//! async fn custom_handler() -> &'static str {
//!     "Hello from custom route!"
//! }
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServiceConfig::default();
//! let state = ServiceState::from_config(&config).await?;
//!
//! let custom_private_router = ApiRouter::new().route("/custom-private", get(custom_handler));
//! let custom_public_router = ApiRouter::new().route("/custom-public", get(custom_handler));
//!
//! let custom_routes = CustomRoutes::new()
//!     .with_private_routes(custom_private_router)
//!     .with_public_routes(custom_public_router);
//!
//! let router = routes(custom_routes, state);
//! # Ok(())
//! # }
//! ```
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod error;
mod executions;
mod monitors;
mod queue_heartbeat;
mod request;
mod response;
mod resume;
mod utils;
mod webhooks;
mod workers;

use aide::axum::ApiRouter;
use axum::middleware::from_fn_with_state;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub(crate) use crate::handler::response::ErrorResponse;
pub use crate::handler::utils::{CustomRoutes, Pagination};
use crate::middleware::require_authentication;
use crate::service::ServiceState;

#[inline]
async fn handler() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`ApiRouter`] with all private (authentication-gated) routes.
fn private_routes(additional_routes: Option<ApiRouter<ServiceState>>) -> ApiRouter<ServiceState> {
    let mut router = ApiRouter::new()
        .merge(executions::routes())
        .merge(resume::routes())
        .merge(workers::routes());

    if let Some(additional) = additional_routes {
        router = router.merge(additional);
    }

    router
}

/// Returns an [`ApiRouter`] with all public routes.
fn public_routes(additional_routes: Option<ApiRouter<ServiceState>>) -> ApiRouter<ServiceState> {
    let mut router = ApiRouter::new().merge(webhooks::routes()).merge(queue_heartbeat::routes()).merge(monitors::routes());

    if let Some(additional) = additional_routes {
        router = router.merge(additional);
    }

    router
}

/// Returns an [`ApiRouter`] with all routes.
pub fn routes(routes: CustomRoutes, state: ServiceState) -> ApiRouter<ServiceState> {
    let require_authentication = from_fn_with_state(state.clone(), require_authentication);

    let private_router = private_routes(routes.private_routes).route_layer(require_authentication);
    let public_router = public_routes(routes.public_routes);

    ApiRouter::new().merge(private_router).merge(public_router).fallback(handler)
}

#[cfg(test)]
mod test {
    use aide::axum::ApiRouter;
    use axum_test::TestServer;

    use crate::handler::{CustomRoutes, routes};
    use crate::service::{ServiceConfig, ServiceState};

    /// Returns a new [`TestServer`] with the given router.
    pub async fn create_test_server_with_router(
        router: impl Fn(ServiceState) -> ApiRouter<ServiceState>,
    ) -> anyhow::Result<TestServer> {
        let config = ServiceConfig::default();
        let state = ServiceState::from_config(&config).await?;
        let router = router(state.clone());
        create_test_server_with_state(router, state).await
    }

    /// Returns a new [`TestServer`] with the given router and state.
    pub async fn create_test_server_with_state(
        router: ApiRouter<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        let app: axum::Router = router.with_state(state).into();
        let server = TestServer::new(app)?;
        Ok(server)
    }

    /// Returns a new [`TestServer`] with the default router and state.
    pub async fn create_test_server() -> anyhow::Result<TestServer> {
        let config = ServiceConfig::default();
        let state = ServiceState::from_config(&config).await?;
        let router = routes(CustomRoutes::new(), state.clone());
        create_test_server_with_state(router, state).await
    }

    #[tokio::test]
    async fn handlers() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        assert!(server.is_running());
        Ok(())
    }
}
