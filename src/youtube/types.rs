use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest description kept on a channel record, in characters
pub const DESCRIPTION_LIMIT: usize = 200;

/// Quality grade assigned by the tiered search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
  Gold,
  Silver,
  Bronze,
}

impl fmt::Display for Tier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Tier::Gold => write!(f, "gold"),
      Tier::Silver => write!(f, "silver"),
      Tier::Bronze => write!(f, "bronze"),
    }
  }
}

/// Channel statistics plus the fields derived from them during discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
  pub channel_id: String,
  pub name: String,
  pub description: String,
  pub subscriber_count: u64,
  pub view_count: u64,
  pub video_count: u64,
  pub published_at: Option<DateTime<Utc>>,

  // Derived
  #[serde(default)]
  pub viral_video_count: u32,
  #[serde(default)]
  pub growth_velocity: f64,
  #[serde(default)]
  pub quality_score: f64,
  #[serde(default)]
  pub potential_score: f64,
  #[serde(default)]
  pub growth_score: Option<f64>,
  #[serde(default)]
  pub channel_age_days: Option<u32>,
  #[serde(default)]
  pub is_emerging: bool,
  #[serde(default)]
  pub tier: Option<Tier>,
  #[serde(default)]
  pub criteria: Option<String>,
}

impl ChannelRecord {
  /// Build a record holding raw statistics only.
  pub fn new(channel_id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      channel_id: channel_id.into(),
      name: name.into(),
      description: String::new(),
      subscriber_count: 0,
      view_count: 0,
      video_count: 0,
      published_at: None,
      viral_video_count: 0,
      growth_velocity: 0.0,
      quality_score: 0.0,
      potential_score: 0.0,
      growth_score: None,
      channel_age_days: None,
      is_emerging: false,
      tier: None,
      criteria: None,
    }
  }

  pub fn with_tier(mut self, tier: Tier, criteria: impl Into<String>) -> Self {
    self.tier = Some(tier);
    self.criteria = Some(criteria.into());
    self
  }

  /// Lifetime views per subscriber, with the +1 guarding empty channels
  pub fn views_per_subscriber(&self) -> f64 {
    self.view_count as f64 / (self.subscriber_count as f64 + 1.0)
  }
}

/// Per-video statistics. Only used to derive channel metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
  pub video_id: String,
  pub channel_id: String,
  pub title: String,
  pub view_count: u64,
  pub like_count: u64,
  pub published_at: Option<DateTime<Utc>>,
}

/// One row of a video search; carries no statistics
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
  pub video_id: String,
  pub channel_id: String,
  pub channel_title: String,
  pub published_at: Option<DateTime<Utc>>,
}

/// Sort order accepted by the search endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchOrder {
  Date,
  ViewCount,
}

impl SearchOrder {
  pub fn as_str(&self) -> &'static str {
    match self {
      SearchOrder::Date => "date",
      SearchOrder::ViewCount => "viewCount",
    }
  }
}

/// Parameters of a recent-video search
#[derive(Debug, Clone)]
pub struct VideoSearch {
  pub query: String,
  pub published_after: DateTime<Utc>,
  pub max_results: u32,
  pub order: SearchOrder,
}

/// Recent uploads of a channel and how many of them went viral
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViralCheck {
  pub viral_count: u32,
  /// Most recent first
  pub sample: Vec<VideoRecord>,
}

/// Cut a description down to `DESCRIPTION_LIMIT` characters.
pub fn truncate_description(text: &str) -> String {
  match text.char_indices().nth(DESCRIPTION_LIMIT) {
    Some((idx, _)) => text[..idx].to_string(),
    None => text.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_description_respects_char_boundaries() {
    let long = "é".repeat(DESCRIPTION_LIMIT + 10);
    let truncated = truncate_description(&long);
    assert_eq!(truncated.chars().count(), DESCRIPTION_LIMIT);

    assert_eq!(truncate_description("short"), "short");
  }

  #[test]
  fn test_tier_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Tier::Gold).unwrap(), "\"gold\"");
    assert_eq!(Tier::Bronze.to_string(), "bronze");
  }

  #[test]
  fn test_views_per_subscriber() {
    let mut channel = ChannelRecord::new("UC1", "One");
    channel.subscriber_count = 49_999;
    channel.view_count = 2_000_000;
    assert!((channel.views_per_subscriber() - 40.0).abs() < 1e-9);
  }
}
