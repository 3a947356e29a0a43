//! Time-bounded caching layer for platform lookups.
//!
//! This module provides a platform-agnostic cache that:
//! - Stores serialized payloads under namespaced string keys
//! - Treats entries older than the TTL as absent
//! - Never evicts on its own; entries live as long as the process
//! - Takes its notion of "now" from an injectable `Clock`

mod layer;
mod storage;
mod traits;

pub use layer::{CacheLayer, DEFAULT_TTL_SECS};
pub use storage::{CacheStorage, MemoryStorage, NoopStorage};
pub use traits::{CacheResult, Clock, QueryKey, SystemClock};

#[cfg(test)]
pub use storage::FailingStorage;
#[cfg(test)]
pub use traits::ManualClock;
