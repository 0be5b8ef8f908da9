//! NATS Key-Value store: generic wrapper, dedupe ledger, scheduler locks, cache.

mod cache;
mod dedupe;
mod lock;
mod store;

pub use cache::{CacheStats, CacheStore};
pub use dedupe::{DedupeOutcome, DedupeStore};
pub use lock::{KvSchedulerLock, Lease};
pub use store::KvStore;
