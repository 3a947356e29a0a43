//! Cache keys for YouTube lookups.

use crate::cache::QueryKey;

/// Lookups worth caching, one namespace per operation kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum YouTubeQueryKey {
  /// Channel statistics by id
  ChannelStats { channel_id: String },
  /// Viral count over the latest `sample` uploads at `threshold` views
  ViralCheck {
    channel_id: String,
    sample: u32,
    threshold: u64,
  },
  /// Statistics of a single video
  VideoViews { video_id: String },
}

impl QueryKey for YouTubeQueryKey {
  fn cache_key(&self) -> String {
    match self {
      Self::ChannelStats { channel_id } => format!("channel_stats:{}", channel_id),
      Self::ViralCheck {
        channel_id,
        sample,
        threshold,
      } => format!("viral_check:{}:{}:{}", channel_id, sample, threshold),
      Self::VideoViews { video_id } => format!("video_views:{}", video_id),
    }
  }

  fn description(&self) -> String {
    match self {
      Self::ChannelStats { channel_id } => format!("stats of channel {}", channel_id),
      Self::ViralCheck {
        channel_id,
        sample,
        threshold,
      } => format!(
        "viral check of channel {} (last {} uploads, {} views)",
        channel_id, sample, threshold
      ),
      Self::VideoViews { video_id } => format!("views of video {}", video_id),
    }
  }
}
