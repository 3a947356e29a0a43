//! Platform wrapper that puts the TTL cache in front of per-channel and
//! per-video lookups.

use chrono::{DateTime, Utc};
use color_eyre::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::cache::{CacheLayer, CacheResult, CacheStorage, Clock, MemoryStorage, SystemClock};
use crate::fetch::FetchOutcome;
use crate::metrics;

use super::cache::YouTubeQueryKey;
use super::types::{ChannelRecord, SearchHit, VideoRecord, VideoSearch, ViralCheck};
use super::VideoPlatform;

/// Snapshot of the call and hit counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
  pub api_calls: u64,
  pub cache_hits: u64,
}

impl Tally {
  /// Work done since `earlier`.
  pub fn since(&self, earlier: Tally) -> Tally {
    Tally {
      api_calls: self.api_calls.saturating_sub(earlier.api_calls),
      cache_hits: self.cache_hits.saturating_sub(earlier.cache_hits),
    }
  }
}

/// Video platform with transparent caching.
///
/// Statistics lookups go through the cache; searches and the trending chart
/// always hit the platform since they are the point of each pass.
pub struct CachedPlatform<P: VideoPlatform, S: CacheStorage = MemoryStorage, C: Clock = SystemClock> {
  inner: Arc<P>,
  cache: CacheLayer<S, C>,
  hits: AtomicU64,
}

impl<P: VideoPlatform, S: CacheStorage, C: Clock> CachedPlatform<P, S, C> {
  pub fn new(inner: Arc<P>, cache: CacheLayer<S, C>) -> Self {
    Self {
      inner,
      cache,
      hits: AtomicU64::new(0),
    }
  }

  pub fn is_configured(&self) -> bool {
    self.inner.is_configured()
  }

  pub fn now(&self) -> DateTime<Utc> {
    self.cache.now()
  }

  pub fn tally(&self) -> Tally {
    Tally {
      api_calls: self.inner.api_calls(),
      cache_hits: self.hits.load(Ordering::SeqCst),
    }
  }

  /// Stored cache entries, expired ones included. Zero when storage is unreadable.
  pub fn cache_entries(&self) -> usize {
    self.cache.len().unwrap_or(0)
  }

  fn record<T>(&self, result: CacheResult<FetchOutcome<T>>) -> FetchOutcome<T> {
    if result.is_hit() {
      self.hits.fetch_add(1, Ordering::SeqCst);
    }
    result.data
  }

  /// Channel statistics, cached under `channel_stats:{id}`.
  pub async fn channel_stats(&self, channel_id: &str) -> Result<FetchOutcome<ChannelRecord>> {
    let key = YouTubeQueryKey::ChannelStats {
      channel_id: channel_id.to_string(),
    };

    let result = self
      .cache
      .fetch(&key, || self.inner.get_channel_statistics(channel_id))
      .await?;

    Ok(self.record(result))
  }

  /// Latest `sample` uploads and how many reached `threshold` views.
  pub async fn viral_check(
    &self,
    channel_id: &str,
    sample: u32,
    threshold: u64,
  ) -> Result<FetchOutcome<ViralCheck>> {
    let key = YouTubeQueryKey::ViralCheck {
      channel_id: channel_id.to_string(),
      sample,
      threshold,
    };

    let result = self
      .cache
      .fetch(&key, || async {
        self
          .inner
          .get_channel_recent_videos(channel_id, sample)
          .await
          .map(|videos| ViralCheck {
            viral_count: metrics::viral_count(&videos, sample as usize, threshold),
            sample: videos,
          })
      })
      .await?;

    Ok(self.record(result))
  }

  /// Single-video statistics, cached under `video_views:{id}`.
  pub async fn video_views(&self, video_id: &str) -> Result<FetchOutcome<VideoRecord>> {
    let key = YouTubeQueryKey::VideoViews {
      video_id: video_id.to_string(),
    };

    let result = self
      .cache
      .fetch(&key, || self.inner.get_video_statistics(video_id))
      .await?;

    Ok(self.record(result))
  }

  /// Trending chart (not cached).
  pub async fn trending_videos(&self, max_results: u32) -> FetchOutcome<Vec<VideoRecord>> {
    self.inner.trending_videos(max_results).await
  }

  /// Video search (not cached).
  pub async fn search_recent_videos(&self, search: &VideoSearch) -> FetchOutcome<Vec<SearchHit>> {
    self.inner.search_recent_videos(search).await
  }

  /// Channel keyword search (not cached).
  pub async fn search_channels(&self, query: &str, max_results: u32) -> FetchOutcome<Vec<String>> {
    self.inner.search_channels(query, max_results).await
  }
}
