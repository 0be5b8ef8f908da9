//! [`Pagination`], [`CustomRoutes`] and other utilities.

mod custom_routes;
mod pagination;

pub use crate::handler::utils::custom_routes::CustomRoutes;
pub use crate::handler::utils::pagination::Pagination;
