//! Cache layer that applies the TTL on top of a storage backend.

use chrono::{DateTime, Duration, Utc};
use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::storage::{CacheStorage, CachedEntry};
use super::traits::{CacheResult, Clock, QueryKey, SystemClock};
use crate::fetch::FetchOutcome;

/// Default lifetime of a cached entry.
pub const DEFAULT_TTL_SECS: i64 = 600;

/// Time-bounded cache.
///
/// An entry older than the TTL reads exactly like a missing one. Cloning
/// shares the underlying storage, so one layer can serve many discovery
/// invocations.
pub struct CacheLayer<S: CacheStorage, C: Clock = SystemClock> {
  storage: Arc<S>,
  clock: C,
  ttl: Duration,
}

impl<S: CacheStorage> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
      clock: SystemClock,
      ttl: Duration::seconds(DEFAULT_TTL_SECS),
    }
  }
}

impl<S: CacheStorage, C: Clock> CacheLayer<S, C> {
  /// Set the time-to-live for cached data.
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  /// Replace the clock used for expiry checks.
  pub fn with_clock<C2: Clock>(self, clock: C2) -> CacheLayer<S, C2> {
    CacheLayer {
      storage: self.storage,
      clock,
      ttl: self.ttl,
    }
  }

  pub fn now(&self) -> DateTime<Utc> {
    self.clock.now()
  }

  pub fn len(&self) -> Result<usize> {
    self.storage.len()
  }

  fn is_expired(&self, cached_at: DateTime<Utc>) -> bool {
    self.clock.now() - cached_at > self.ttl
  }

  /// Look up a non-expired entry.
  ///
  /// Expired, missing and undecodable entries all come back as `None`.
  #[allow(dead_code)]
  pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
    Ok(self.get_with_time(key)?.map(|(value, _)| value))
  }

  fn get_with_time<T: DeserializeOwned>(&self, key: &str) -> Result<Option<(T, DateTime<Utc>)>> {
    let Some(entry) = self.storage.get_entry(key)? else {
      return Ok(None);
    };

    if self.is_expired(entry.cached_at) {
      return Ok(None);
    }

    match serde_json::from_slice(&entry.data) {
      Ok(value) => Ok(Some((value, entry.cached_at))),
      Err(e) => {
        warn!(key, error = %e, "dropping undecodable cache entry");
        Ok(None)
      }
    }
  }

  /// Store a value stamped with the current time. Last put wins.
  pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
    let data =
      serde_json::to_vec(value).map_err(|e| eyre!("Failed to serialize cache entry {}: {}", key, e))?;

    self.storage.store_entry(
      key,
      CachedEntry {
        data,
        cached_at: self.clock.now(),
      },
    )
  }

  /// Fetch with a cache-first strategy.
  ///
  /// 1. Check cache - if present and fresh, return it without calling `fetcher`
  /// 2. Otherwise call `fetcher`
  /// 3. Store the value only when the platform actually found something
  pub async fn fetch<K, T, F, Fut>(
    &self,
    key: &K,
    fetcher: F,
  ) -> Result<CacheResult<FetchOutcome<T>>>
  where
    K: QueryKey,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = FetchOutcome<T>>,
  {
    let cache_key = key.cache_key();

    if let Some((value, cached_at)) = self.get_with_time(&cache_key)? {
      debug!(key = %cache_key, "cache hit for {}", key.description());
      return Ok(CacheResult::from_cache(FetchOutcome::Found(value), cached_at));
    }

    debug!(key = %cache_key, "cache miss for {}", key.description());
    let outcome = fetcher().await;

    if let FetchOutcome::Found(value) = &outcome {
      self.put(&cache_key, value)?;
    }

    Ok(CacheResult::from_network(outcome))
  }
}

impl<S: CacheStorage, C: Clock + Clone> Clone for CacheLayer<S, C> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      clock: self.clock.clone(),
      ttl: self.ttl,
    }
  }
}
