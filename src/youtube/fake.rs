//! In-memory platform for tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::fetch::FetchOutcome;

use super::types::{ChannelRecord, SearchHit, SearchOrder, VideoRecord, VideoSearch};
use super::VideoPlatform;

/// Same instant `ManualClock::new()` starts at
pub fn base_time() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub fn video(video_id: &str, channel_id: &str, views: u64) -> VideoRecord {
  VideoRecord {
    video_id: video_id.to_string(),
    channel_id: channel_id.to_string(),
    title: format!("clip {}", video_id),
    view_count: views,
    like_count: views / 100,
    published_at: Some(base_time() - Duration::days(1)),
  }
}

pub fn hit(video_id: &str, channel_id: &str) -> SearchHit {
  SearchHit {
    video_id: video_id.to_string(),
    channel_id: channel_id.to_string(),
    channel_title: format!("channel {}", channel_id),
    published_at: Some(base_time() - Duration::days(1)),
  }
}

pub fn channel(channel_id: &str, subs: u64, views: u64, videos: u64) -> ChannelRecord {
  let mut c = ChannelRecord::new(channel_id, format!("channel {}", channel_id));
  c.subscriber_count = subs;
  c.view_count = views;
  c.video_count = videos;
  c
}

#[derive(Default)]
pub struct FakePlatform {
  unconfigured: bool,
  trending: Vec<VideoRecord>,
  searches: HashMap<SearchOrder, Vec<SearchHit>>,
  channel_searches: Vec<String>,
  channels: HashMap<String, ChannelRecord>,
  uploads: HashMap<String, Vec<VideoRecord>>,
  videos: HashMap<String, VideoRecord>,
  failing: HashSet<String>,
  calls: AtomicU64,
  search_calls: AtomicU64,
}

impl FakePlatform {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn unconfigured(mut self) -> Self {
    self.unconfigured = true;
    self
  }

  /// Register a channel and its uploads, newest first, one day apart.
  pub fn with_channel(mut self, channel: ChannelRecord, upload_views: &[u64]) -> Self {
    let uploads: Vec<VideoRecord> = upload_views
      .iter()
      .enumerate()
      .map(|(i, &views)| {
        let mut v = video(&format!("{}-u{}", channel.channel_id, i), &channel.channel_id, views);
        v.published_at = Some(base_time() - Duration::days(i as i64 + 1));
        v
      })
      .collect();

    for upload in &uploads {
      self.videos.insert(upload.video_id.clone(), upload.clone());
    }
    if !uploads.is_empty() {
      self.uploads.insert(channel.channel_id.clone(), uploads);
    }
    self.channels.insert(channel.channel_id.clone(), channel);
    self
  }

  pub fn with_trending(mut self, videos: Vec<VideoRecord>) -> Self {
    self.trending = videos;
    self
  }

  pub fn with_search(mut self, order: SearchOrder, hits: Vec<SearchHit>) -> Self {
    self.searches.insert(order, hits);
    self
  }

  pub fn with_video(mut self, video: VideoRecord) -> Self {
    self.videos.insert(video.video_id.clone(), video);
    self
  }

  pub fn with_channel_search(mut self, channel_ids: &[&str]) -> Self {
    self.channel_searches = channel_ids.iter().map(|s| s.to_string()).collect();
    self
  }

  /// Every lookup of this channel fails as if the network dropped.
  pub fn failing(mut self, channel_id: &str) -> Self {
    self.failing.insert(channel_id.to_string());
    self
  }

  /// Number of search requests (video or channel) made
  pub fn search_calls(&self) -> u64 {
    self.search_calls.load(Ordering::SeqCst)
  }

  fn spend(&self, calls: u64) {
    self.calls.fetch_add(calls, Ordering::SeqCst);
  }
}

impl VideoPlatform for FakePlatform {
  fn is_configured(&self) -> bool {
    !self.unconfigured
  }

  fn api_calls(&self) -> u64 {
    self.calls.load(Ordering::SeqCst)
  }

  async fn trending_videos(&self, max_results: u32) -> FetchOutcome<Vec<VideoRecord>> {
    if self.unconfigured {
      return FetchOutcome::Unconfigured;
    }
    self.spend(1);
    FetchOutcome::Found(
      self
        .trending
        .iter()
        .take(max_results as usize)
        .cloned()
        .collect(),
    )
  }

  async fn search_recent_videos(&self, search: &VideoSearch) -> FetchOutcome<Vec<SearchHit>> {
    if self.unconfigured {
      return FetchOutcome::Unconfigured;
    }
    self.spend(1);
    self.search_calls.fetch_add(1, Ordering::SeqCst);
    FetchOutcome::Found(
      self
        .searches
        .get(&search.order)
        .map(|hits| hits.iter().take(search.max_results as usize).cloned().collect())
        .unwrap_or_default(),
    )
  }

  async fn search_channels(&self, _query: &str, max_results: u32) -> FetchOutcome<Vec<String>> {
    if self.unconfigured {
      return FetchOutcome::Unconfigured;
    }
    self.spend(1);
    self.search_calls.fetch_add(1, Ordering::SeqCst);
    FetchOutcome::Found(
      self
        .channel_searches
        .iter()
        .take(max_results as usize)
        .cloned()
        .collect(),
    )
  }

  async fn get_video_statistics(&self, video_id: &str) -> FetchOutcome<VideoRecord> {
    if self.unconfigured {
      return FetchOutcome::Unconfigured;
    }
    self.spend(1);
    match self.videos.get(video_id) {
      Some(v) => FetchOutcome::Found(v.clone()),
      None => FetchOutcome::NotFound,
    }
  }

  async fn get_channel_statistics(&self, channel_id: &str) -> FetchOutcome<ChannelRecord> {
    if self.unconfigured {
      return FetchOutcome::Unconfigured;
    }
    self.spend(1);
    if self.failing.contains(channel_id) {
      return FetchOutcome::Unavailable("connection reset".to_string());
    }
    match self.channels.get(channel_id) {
      Some(c) => FetchOutcome::Found(c.clone()),
      None => FetchOutcome::NotFound,
    }
  }

  async fn get_channel_recent_videos(
    &self,
    channel_id: &str,
    max_results: u32,
  ) -> FetchOutcome<Vec<VideoRecord>> {
    if self.unconfigured {
      return FetchOutcome::Unconfigured;
    }
    // upload listing plus statistics batch
    self.spend(2);
    if self.failing.contains(channel_id) {
      return FetchOutcome::Unavailable("connection reset".to_string());
    }
    match self.uploads.get(channel_id) {
      Some(videos) => FetchOutcome::Found(videos.iter().take(max_results as usize).cloned().collect()),
      None => FetchOutcome::NotFound,
    }
  }
}
