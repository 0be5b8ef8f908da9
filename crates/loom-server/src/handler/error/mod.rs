//! [`Error`], [`ErrorKind`] and [`Result`].

mod core_error;
mod http_error;
mod nats_error;
mod pg_error;
mod runtime_error;

pub use http_error::{Error, ErrorKind, Result};
