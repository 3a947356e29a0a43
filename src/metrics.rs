//! Scoring heuristics for candidate channels.
//!
//! Everything here is pure: callers pass in the channel, its sampled uploads
//! (most recent first) and the current time. All thresholds and weights come
//! from [`Heuristics`], so tuning never touches control flow.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::youtube::types::{ChannelRecord, VideoRecord};

/// Uploads per half of the growth-velocity comparison
const VELOCITY_WINDOW: usize = 5;

// ============================================================================
// Tuning
// ============================================================================

/// All discovery thresholds and weights, with their defaults.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Heuristics {
  pub quality: QualityWeights,
  pub potential: PotentialWeights,
  pub growth: GrowthWeights,
  pub emerging: EmergingRules,
  /// Gate used by the tiered search (2 of 5 at 500K)
  pub fast_pass: PassGate,
  /// Gate used by the legacy emerging scan (3 of 10 at 1M)
  pub exact_pass: PassGate,
  pub tiers: TierRules,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct QualityWeights {
  pub base: f64,
  /// Inclusive subscriber band earning `sweet_spot_bonus`
  pub sweet_spot_subscribers: (u64, u64),
  pub sweet_spot_bonus: f64,
  pub large_channel_subscribers: u64,
  pub large_channel_penalty: f64,
  /// Inclusive views-per-subscriber band earning `healthy_ratio_bonus`
  pub healthy_ratio: (f64, f64),
  pub healthy_ratio_bonus: f64,
  pub inflated_ratio: f64,
  pub inflated_ratio_penalty: f64,
  pub consistent_uploads: usize,
  pub consistent_uploads_bonus: f64,
  pub spam_keywords: Vec<String>,
  pub spam_penalty: f64,
}

impl Default for QualityWeights {
  fn default() -> Self {
    Self {
      base: 5.0,
      sweet_spot_subscribers: (5_000, 200_000),
      sweet_spot_bonus: 2.0,
      large_channel_subscribers: 1_000_000,
      large_channel_penalty: 1.0,
      healthy_ratio: (2.0, 50.0),
      healthy_ratio_bonus: 1.5,
      inflated_ratio: 100.0,
      inflated_ratio_penalty: 1.0,
      consistent_uploads: 8,
      consistent_uploads_bonus: 1.0,
      spam_keywords: [
        "sub4sub",
        "sub for sub",
        "follow for follow",
        "free robux",
        "free vbucks",
        "giveaway",
        "make money fast",
      ]
      .into_iter()
      .map(String::from)
      .collect(),
      spam_penalty: 3.0,
    }
  }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PotentialWeights {
  pub viral_weight: f64,
  pub viral_cap: f64,
  pub velocity_weight: f64,
  pub velocity_cap: f64,
  pub quality_weight: f64,
  /// Average likes per upload that earns the full engagement point
  pub engagement_likes: f64,
  pub engagement_cap: f64,
}

impl Default for PotentialWeights {
  fn default() -> Self {
    Self {
      viral_weight: 1.0,
      viral_cap: 4.0,
      velocity_weight: 10.0,
      velocity_cap: 3.0,
      quality_weight: 0.2,
      engagement_likes: 10_000.0,
      engagement_cap: 1.0,
    }
  }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GrowthWeights {
  pub base: f64,
  pub small_channel_subscribers: (u64, u64),
  pub small_channel_bonus: f64,
  pub large_channel_subscribers: u64,
  pub large_channel_penalty: f64,
  pub strong_ratio: f64,
  pub strong_ratio_bonus: f64,
  pub fair_ratio: f64,
  pub fair_ratio_bonus: f64,
  pub active_video_count: u64,
  pub active_bonus: f64,
}

impl Default for GrowthWeights {
  fn default() -> Self {
    Self {
      base: 5.0,
      small_channel_subscribers: (1_000, 100_000),
      small_channel_bonus: 2.0,
      large_channel_subscribers: 1_000_000,
      large_channel_penalty: 1.0,
      strong_ratio: 3.0,
      strong_ratio_bonus: 2.0,
      fair_ratio: 1.0,
      fair_ratio_bonus: 1.0,
      active_video_count: 20,
      active_bonus: 1.0,
    }
  }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmergingRules {
  pub min_potential: f64,
  pub max_subscribers: u64,
}

impl Default for EmergingRules {
  fn default() -> Self {
    Self {
      min_potential: 3.0,
      max_subscribers: 300_000,
    }
  }
}

/// Sample size, viral threshold and age/viral gate of one search pass.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PassGate {
  pub sample_size: u32,
  pub viral_threshold: u64,
  pub min_viral: u32,
  /// The sampled uploads must span strictly fewer days than this
  pub max_age_days: u32,
}

impl PassGate {
  pub fn fast() -> Self {
    Self {
      sample_size: 5,
      viral_threshold: 500_000,
      min_viral: 2,
      max_age_days: 365,
    }
  }

  pub fn exact() -> Self {
    Self {
      sample_size: 10,
      viral_threshold: 1_000_000,
      min_viral: 3,
      max_age_days: 90,
    }
  }

  pub fn holds(&self, viral_count: u32, age_days: u32) -> bool {
    viral_count >= self.min_viral && age_days < self.max_age_days
  }
}

impl Default for PassGate {
  fn default() -> Self {
    Self::fast()
  }
}

/// Budget and qualification rules of the gold/silver/bronze passes.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TierRules {
  pub trending_max_results: u32,
  pub search_max_results: u32,
  pub candidate_views: u64,
  pub gold_candidates: usize,
  pub gold_min_viral: u32,
  pub gold_early_exit: usize,
  pub silver_window_days: i64,
  pub silver_viral: (u32, u32),
  pub silver_early_exit: usize,
  pub bronze_window_days: i64,
  pub bronze_candidates: usize,
  pub bronze_min_growth: f64,
  pub emerging_window_days: i64,
  pub search_query: String,
  /// Keyword for the channel search that tops up the emerging scan
  pub channel_search_keyword: String,
}

impl Default for TierRules {
  fn default() -> Self {
    Self {
      trending_max_results: 50,
      search_max_results: 25,
      candidate_views: 500_000,
      gold_candidates: 5,
      gold_min_viral: 2,
      gold_early_exit: 2,
      silver_window_days: 30,
      silver_viral: (1, 2),
      silver_early_exit: 6,
      bronze_window_days: 7,
      bronze_candidates: 10,
      bronze_min_growth: 6.0,
      emerging_window_days: 90,
      search_query: "#shorts".to_string(),
      channel_search_keyword: "viral".to_string(),
    }
  }
}

impl Default for Heuristics {
  fn default() -> Self {
    Self {
      quality: QualityWeights::default(),
      potential: PotentialWeights::default(),
      growth: GrowthWeights::default(),
      emerging: EmergingRules::default(),
      fast_pass: PassGate::fast(),
      exact_pass: PassGate::exact(),
      tiers: TierRules::default(),
    }
  }
}

// ============================================================================
// Calculators
// ============================================================================

/// Number of uploads among the first `sample` whose views reach `threshold`.
pub fn viral_count(videos: &[VideoRecord], sample: usize, threshold: u64) -> u32 {
  videos
    .iter()
    .take(sample)
    .filter(|v| v.view_count >= threshold)
    .count() as u32
}

/// Days since the oldest sampled upload, capped. No sample reads as old.
pub fn channel_age_days(videos: &[VideoRecord], now: DateTime<Utc>, cap: u32) -> u32 {
  let Some(oldest) = videos.iter().filter_map(|v| v.published_at).min() else {
    return cap;
  };

  let days = (now - oldest).num_days().max(0);
  u32::try_from(days).unwrap_or(cap).min(cap)
}

fn average_views(videos: &[VideoRecord]) -> f64 {
  if videos.is_empty() {
    return 0.0;
  }
  videos.iter().map(|v| v.view_count as f64).sum::<f64>() / videos.len() as f64
}

/// Relative change between the 5 newest uploads and the (up to) 5 before them.
///
/// Zero with fewer than 5 uploads or nothing older to compare against.
pub fn growth_velocity(videos: &[VideoRecord]) -> f64 {
  if videos.len() < VELOCITY_WINDOW {
    return 0.0;
  }

  let (recent, rest) = videos.split_at(VELOCITY_WINDOW);
  let older = &rest[..rest.len().min(VELOCITY_WINDOW)];
  if older.is_empty() {
    return 0.0;
  }

  let older_avg = average_views(older);
  (average_views(recent) - older_avg) / (older_avg + 1.0)
}

pub fn average_likes(videos: &[VideoRecord]) -> f64 {
  if videos.is_empty() {
    return 0.0;
  }
  videos.iter().map(|v| v.like_count as f64).sum::<f64>() / videos.len() as f64
}

fn has_spam(description: &str, keywords: &[String]) -> bool {
  let description = description.to_lowercase();
  keywords
    .iter()
    .any(|k| !k.is_empty() && description.contains(&k.to_lowercase()))
}

/// Channel quality on a 0-10 scale.
pub fn quality_score(channel: &ChannelRecord, sampled_videos: usize, w: &QualityWeights) -> f64 {
  let subs = channel.subscriber_count;
  let ratio = channel.views_per_subscriber();
  let mut score = w.base;

  let (low, high) = w.sweet_spot_subscribers;
  if (low..=high).contains(&subs) {
    score += w.sweet_spot_bonus;
  }
  if subs > w.large_channel_subscribers {
    score -= w.large_channel_penalty;
  }

  let (low, high) = w.healthy_ratio;
  if ratio >= low && ratio <= high {
    score += w.healthy_ratio_bonus;
  }
  if ratio > w.inflated_ratio {
    score -= w.inflated_ratio_penalty;
  }

  if sampled_videos >= w.consistent_uploads {
    score += w.consistent_uploads_bonus;
  }
  if has_spam(&channel.description, &w.spam_keywords) {
    score -= w.spam_penalty;
  }

  score.clamp(0.0, 10.0)
}

/// Weighted sum of virality, momentum, quality and engagement. Never negative.
pub fn potential_score(
  viral_count: u32,
  velocity: f64,
  quality: f64,
  avg_likes: f64,
  w: &PotentialWeights,
) -> f64 {
  let viral = (viral_count as f64 * w.viral_weight).min(w.viral_cap);
  let growth = (velocity * w.velocity_weight).max(0.0).min(w.velocity_cap);
  let quality = quality.max(0.0) * w.quality_weight;
  let engagement = if w.engagement_likes > 0.0 {
    (avg_likes / w.engagement_likes).max(0.0).min(w.engagement_cap)
  } else {
    0.0
  };

  viral + growth + quality + engagement
}

/// Momentum score used by the bronze pass, on a 0-10 scale.
pub fn growth_score(channel: &ChannelRecord, w: &GrowthWeights) -> f64 {
  let subs = channel.subscriber_count;
  let ratio = channel.views_per_subscriber();
  let mut score = w.base;

  let (low, high) = w.small_channel_subscribers;
  if (low..=high).contains(&subs) {
    score += w.small_channel_bonus;
  }
  if subs > w.large_channel_subscribers {
    score -= w.large_channel_penalty;
  }

  if ratio >= w.strong_ratio {
    score += w.strong_ratio_bonus;
  } else if ratio >= w.fair_ratio {
    score += w.fair_ratio_bonus;
  }

  if channel.video_count >= w.active_video_count {
    score += w.active_bonus;
  }

  score.clamp(0.0, 10.0)
}

/// Derived fields for one channel under one pass gate.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMetrics {
  pub viral_video_count: u32,
  pub channel_age_days: u32,
  pub growth_velocity: f64,
  pub quality_score: f64,
  pub potential_score: f64,
  pub is_emerging: bool,
}

impl ChannelMetrics {
  /// Score `channel` from its sampled uploads.
  pub fn evaluate(
    channel: &ChannelRecord,
    sample: &[VideoRecord],
    gate: &PassGate,
    heuristics: &Heuristics,
    now: DateTime<Utc>,
  ) -> Self {
    let sample = &sample[..sample.len().min(gate.sample_size as usize)];
    let viral = viral_count(sample, sample.len(), gate.viral_threshold);
    let age = channel_age_days(sample, now, 365);
    let velocity = growth_velocity(sample);
    let quality = quality_score(channel, sample.len(), &heuristics.quality);
    let potential = potential_score(
      viral,
      velocity,
      quality,
      average_likes(sample),
      &heuristics.potential,
    );

    let rules = &heuristics.emerging;
    let is_emerging = potential >= rules.min_potential
      && channel.subscriber_count <= rules.max_subscribers
      && gate.holds(viral, age);

    Self {
      viral_video_count: viral,
      channel_age_days: age,
      growth_velocity: velocity,
      quality_score: quality,
      potential_score: potential,
      is_emerging,
    }
  }

  /// Copy the derived fields onto the record.
  pub fn apply(&self, channel: &mut ChannelRecord) {
    channel.viral_video_count = self.viral_video_count;
    channel.channel_age_days = Some(self.channel_age_days);
    channel.growth_velocity = self.growth_velocity;
    channel.quality_score = self.quality_score;
    channel.potential_score = self.potential_score;
    channel.is_emerging = self.is_emerging;
  }
}

/// Sort by potential score, highest first. Equal scores keep discovery order.
pub fn sort_by_potential(channels: &mut [ChannelRecord]) {
  channels.sort_by(|a, b| {
    b.potential_score
      .partial_cmp(&a.potential_score)
      .unwrap_or(std::cmp::Ordering::Equal)
  });
}
