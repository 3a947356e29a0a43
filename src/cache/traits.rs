//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};

/// Query descriptor that can be turned into a storage key.
///
/// Keys are namespaced by operation kind (e.g. `channel_stats:{id}`) so two
/// operations on the same subject never collide.
pub trait QueryKey {
  /// Composite storage key
  fn cache_key(&self) -> String;

  /// Human readable description for logs
  fn description(&self) -> String;
}

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from cached data.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }

  pub fn is_hit(&self) -> bool {
    self.source == CacheSource::Cache
  }
}

/// Indicates where cached data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fetched from the platform during this call
  Network,
  /// Served from a non-expired entry
  Cache,
}

#[cfg(test)]
pub use manual::ManualClock;
