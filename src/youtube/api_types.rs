//! Serde-deserializable types matching YouTube Data API v3 responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs. The API sends
//! every counter as a decimal string and omits fields freely, so everything
//! here is optional and parsed leniently.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::types::{truncate_description, ChannelRecord, SearchHit, VideoRecord};

/// Parse a counter the API sends as a string. Missing or garbage reads as 0.
pub fn parse_count(value: Option<&str>) -> u64 {
  value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

/// Parse an RFC 3339 timestamp such as `2024-05-01T12:00:00Z`.
pub fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
  value.and_then(|v| v.parse::<DateTime<Utc>>().ok())
}

// ============================================================================
// Shared envelope
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiListResponse<T> {
  #[serde(default = "Vec::new")]
  pub items: Vec<T>,
}

// ============================================================================
// search endpoint
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSearchId {
  pub video_id: Option<String>,
  pub channel_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSearchSnippet {
  pub published_at: Option<String>,
  pub channel_id: Option<String>,
  #[serde(default)]
  pub channel_title: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiSearchItem {
  #[serde(default)]
  pub id: ApiSearchId,
  #[serde(default)]
  pub snippet: ApiSearchSnippet,
}

impl ApiSearchItem {
  /// Video hit, if this row is a video with a known owner
  pub fn into_video_hit(self) -> Option<SearchHit> {
    let video_id = self.id.video_id?;
    let channel_id = self.snippet.channel_id?;

    Some(SearchHit {
      video_id,
      channel_id,
      channel_title: self.snippet.channel_title,
      published_at: parse_timestamp(self.snippet.published_at.as_deref()),
    })
  }

  /// Channel id of a channel-typed row
  pub fn into_channel_id(self) -> Option<String> {
    self.id.channel_id.or(self.snippet.channel_id)
  }
}

// ============================================================================
// videos endpoint
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVideoSnippet {
  pub published_at: Option<String>,
  #[serde(default)]
  pub channel_id: String,
  #[serde(default)]
  pub title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVideoStatistics {
  pub view_count: Option<String>,
  pub like_count: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiVideo {
  pub id: String,
  #[serde(default)]
  pub snippet: ApiVideoSnippet,
  #[serde(default)]
  pub statistics: ApiVideoStatistics,
}

impl ApiVideo {
  pub fn into_record(self) -> VideoRecord {
    VideoRecord {
      video_id: self.id,
      channel_id: self.snippet.channel_id,
      title: self.snippet.title,
      view_count: parse_count(self.statistics.view_count.as_deref()),
      like_count: parse_count(self.statistics.like_count.as_deref()),
      published_at: parse_timestamp(self.snippet.published_at.as_deref()),
    }
  }
}

// ============================================================================
// channels endpoint
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiChannelSnippet {
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub description: String,
  pub published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiChannelStatistics {
  pub subscriber_count: Option<String>,
  pub view_count: Option<String>,
  pub video_count: Option<String>,
  #[serde(default)]
  pub hidden_subscriber_count: bool,
}

#[derive(Debug, Deserialize)]
pub struct ApiChannel {
  pub id: String,
  #[serde(default)]
  pub snippet: ApiChannelSnippet,
  #[serde(default)]
  pub statistics: ApiChannelStatistics,
}

impl ApiChannel {
  pub fn into_record(self) -> ChannelRecord {
    let subscriber_count = if self.statistics.hidden_subscriber_count {
      0
    } else {
      parse_count(self.statistics.subscriber_count.as_deref())
    };

    let mut record = ChannelRecord::new(self.id, self.snippet.title);
    record.description = truncate_description(&self.snippet.description);
    record.subscriber_count = subscriber_count;
    record.view_count = parse_count(self.statistics.view_count.as_deref());
    record.video_count = parse_count(self.statistics.video_count.as_deref());
    record.published_at = parse_timestamp(self.snippet.published_at.as_deref());
    record
  }
}
