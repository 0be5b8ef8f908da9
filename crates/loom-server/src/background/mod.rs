//! Background tasks spawned alongside the HTTP server: the polling
//! scheduler and the inline execution worker loop.

pub mod polling;
pub mod worker;

pub use polling::run_polling_scheduler;
pub use worker::run_worker_loop;
