//! Cache storage trait and in-memory implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// A single cached payload.
#[derive(Debug, Clone)]
pub struct CachedEntry {
  /// Serialized JSON payload
  pub data: Vec<u8>,
  /// When the payload was fetched
  pub cached_at: DateTime<Utc>,
}

/// Trait for cache storage backends.
///
/// Storage knows nothing about expiry; the layer above decides whether an
/// entry is still authoritative.
pub trait CacheStorage: Send + Sync {
  /// Get the entry stored under `key`, regardless of age.
  fn get_entry(&self, key: &str) -> Result<Option<CachedEntry>>;

  /// Store an entry, replacing whatever was there.
  fn store_entry(&self, key: &str, entry: CachedEntry) -> Result<()>;

  /// Number of stored entries, expired ones included.
  fn len(&self) -> Result<usize>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get_entry(&self, _key: &str) -> Result<Option<CachedEntry>> {
    Ok(None) // Always miss
  }

  fn store_entry(&self, _key: &str, _entry: CachedEntry) -> Result<()> {
    Ok(()) // Discard
  }

  fn len(&self) -> Result<usize> {
    Ok(0)
  }
}

/// Process-lifetime storage. Entries are only ever added or replaced.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, CachedEntry>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

impl CacheStorage for MemoryStorage {
  fn get_entry(&self, key: &str) -> Result<Option<CachedEntry>> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    Ok(entries.get(key).cloned())
  }

  fn store_entry(&self, key: &str, entry: CachedEntry) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    entries.insert(key.to_string(), entry);
    Ok(())
  }

  fn len(&self) -> Result<usize> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    Ok(entries.len())
  }
}

#[cfg(test)]
pub use failing::FailingStorage;


#[cfg(test)]
mod tests {
  use super::*;

  fn entry(data: &str) -> CachedEntry {
    CachedEntry {
      data: data.as_bytes().to_vec(),
      cached_at: Utc::now(),
    }
  }

  #[test]
  fn test_memory_storage_last_store_wins() {
    let storage = MemoryStorage::new();
    storage.store_entry("channel_stats:UC1", entry("1")).unwrap();
    storage.store_entry("channel_stats:UC1", entry("2")).unwrap();

    let stored = storage.get_entry("channel_stats:UC1").unwrap().unwrap();
    assert_eq!(stored.data, b"2");
    assert_eq!(storage.len().unwrap(), 1);
  }

  #[test]
  fn test_noop_storage_always_misses() {
    let storage = NoopStorage;
    storage.store_entry("video_views:v1", entry("10")).unwrap();
    assert!(storage.get_entry("video_views:v1").unwrap().is_none());
    assert_eq!(storage.len().unwrap(), 0);
  }
}
