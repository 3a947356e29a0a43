//! YouTube Data API adapter.
//!
//! `client` talks HTTP, `cached_client` puts the TTL cache in front of any
//! [`VideoPlatform`], and `api_types` holds the raw response shapes.

pub mod api_types;
pub mod cache;
pub mod cached_client;
pub mod client;
pub mod types;

#[cfg(test)]
pub mod fake;

use crate::fetch::FetchOutcome;
use types::{ChannelRecord, SearchHit, VideoRecord, VideoSearch};

/// Read-only view of a short-form video platform.
///
/// Every read resolves to a [`FetchOutcome`]; implementations never return
/// a remote fault as an error. Without a credential, every read must answer
/// `Unconfigured` without touching the network.
#[allow(async_fn_in_trait)]
pub trait VideoPlatform: Send + Sync {
  /// Whether a credential is available
  fn is_configured(&self) -> bool;

  /// Remote round trips made so far over the lifetime of this value
  fn api_calls(&self) -> u64;

  /// Currently trending videos, with statistics
  async fn trending_videos(&self, max_results: u32) -> FetchOutcome<Vec<VideoRecord>>;

  async fn search_recent_videos(&self, search: &VideoSearch) -> FetchOutcome<Vec<SearchHit>>;

  /// Channel ids matching a keyword among Shorts creators
  async fn search_channels(&self, query: &str, max_results: u32) -> FetchOutcome<Vec<String>>;

  async fn get_video_statistics(&self, video_id: &str) -> FetchOutcome<VideoRecord>;

  async fn get_channel_statistics(&self, channel_id: &str) -> FetchOutcome<ChannelRecord>;

  /// Latest uploads of a channel, most recent first
  async fn get_channel_recent_videos(
    &self,
    channel_id: &str,
    max_results: u32,
  ) -> FetchOutcome<Vec<VideoRecord>>;
}
