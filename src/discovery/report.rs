//! Response envelope shared by every discovery entry point.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use crate::metrics;
use crate::youtube::cached_client::Tally;
use crate::youtube::types::ChannelRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
  Success,
  NoResults,
  Error,
}

/// Channels graded by the tiered search
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TierLists {
  pub gold: Vec<ChannelRecord>,
  pub silver: Vec<ChannelRecord>,
  pub bronze: Vec<ChannelRecord>,
}

impl TierLists {
  pub fn total(&self) -> usize {
    self.gold.len() + self.silver.len() + self.bronze.len()
  }

  /// Ids of every channel already placed in a tier
  pub fn channel_ids(&self) -> HashSet<String> {
    self
      .iter()
      .map(|c| c.channel_id.clone())
      .collect()
  }

  /// Gold, then silver, then bronze
  pub fn iter(&self) -> impl Iterator<Item = &ChannelRecord> {
    self.gold.iter().chain(&self.silver).chain(&self.bronze)
  }

  pub fn sort_by_potential(&mut self) {
    metrics::sort_by_potential(&mut self.gold);
    metrics::sort_by_potential(&mut self.silver);
    metrics::sort_by_potential(&mut self.bronze);
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierSummary {
  pub gold: usize,
  pub silver: usize,
  pub bronze: usize,
  pub total: usize,
}

impl TierSummary {
  fn of(tiers: &TierLists) -> Self {
    Self {
      gold: tiers.gold.len(),
      silver: tiers.silver.len(),
      bronze: tiers.bronze.len(),
      total: tiers.total(),
    }
  }
}

/// Cost of one invocation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Performance {
  pub api_calls: u64,
  pub cache_hits: u64,
  pub elapsed_seconds: f64,
  /// Whether any lookup was served from cache
  pub cache_hit: bool,
}

impl Performance {
  pub fn new(tally: Tally, elapsed: Duration) -> Self {
    Self {
      api_calls: tally.api_calls,
      cache_hits: tally.cache_hits,
      elapsed_seconds: (elapsed.as_secs_f64() * 1000.0).round() / 1000.0,
      cache_hit: tally.cache_hits > 0,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryReport {
  pub status: Status,
  pub message: String,
  /// Every returned channel, gold first
  pub channels: Vec<ChannelRecord>,
  pub tiers: TierLists,
  pub summary: TierSummary,
  pub performance: Performance,
}

impl DiscoveryReport {
  /// Assemble the tiered result. An empty result is still a success.
  pub fn from_tiers(tiers: TierLists, performance: Performance) -> Self {
    let summary = TierSummary::of(&tiers);
    let message = if summary.total == 0 {
      "No qualifying channels found".to_string()
    } else {
      format!(
        "Found {} channels ({} gold, {} silver, {} bronze)",
        summary.total, summary.gold, summary.silver, summary.bronze
      )
    };

    Self {
      status: Status::Success,
      message,
      channels: tiers.iter().cloned().collect(),
      tiers,
      summary,
      performance,
    }
  }

  /// Assemble an untiered list of emerging channels.
  pub fn from_channels(channels: Vec<ChannelRecord>, performance: Performance) -> Self {
    let (status, message) = if channels.is_empty() {
      (
        Status::NoResults,
        "No emerging channels matched the criteria".to_string(),
      )
    } else {
      (
        Status::Success,
        format!("Found {} emerging channels", channels.len()),
      )
    };

    Self {
      status,
      message,
      summary: TierSummary {
        total: channels.len(),
        ..TierSummary::default()
      },
      channels,
      tiers: TierLists::default(),
      performance,
    }
  }

  pub fn unconfigured() -> Self {
    Self::failed(
      "YouTube API key is not configured. Set YOUTUBE_API_KEY to enable discovery.",
      Performance::default(),
    )
  }

  /// Error envelope. Carries no channels, whatever was found before the failure.
  pub fn failed(message: impl Into<String>, performance: Performance) -> Self {
    Self {
      status: Status::Error,
      message: message.into(),
      channels: Vec::new(),
      tiers: TierLists::default(),
      summary: TierSummary::default(),
      performance,
    }
  }
}

impl fmt::Display for DiscoveryReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "[{:?}] {}", self.status, self.message)?;

    for channel in &self.channels {
      let tier = channel
        .tier
        .map(|t| t.to_string())
        .unwrap_or_else(|| "emerging".to_string());
      writeln!(
        f,
        "  {:<8} {:<32} subs {:>10}  viral {:>2}  potential {:>5.2}  {}",
        tier,
        channel.name,
        channel.subscriber_count,
        channel.viral_video_count,
        channel.potential_score,
        channel.criteria.as_deref().unwrap_or(""),
      )?;
    }

    write!(
      f,
      "{} API calls, {} cache hits, {:.2}s",
      self.performance.api_calls, self.performance.cache_hits, self.performance.elapsed_seconds
    )
  }
}
