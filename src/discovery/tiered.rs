//! Gold → silver → bronze search with early exit.

use color_eyre::Result;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::report::{DiscoveryReport, TierLists};
use super::Discovery;
use crate::cache::{CacheStorage, Clock};
use crate::fetch::FetchOutcome;
use crate::metrics;
use crate::youtube::types::{SearchOrder, Tier, VideoSearch};
use crate::youtube::VideoPlatform;

impl<P: VideoPlatform, S: CacheStorage, C: Clock> Discovery<P, S, C> {
  /// Run the tiered search and return at most `max_total` channels.
  ///
  /// Never fails: configuration problems and orchestration errors come back
  /// as an error-status report.
  pub async fn discover_channels_tiered(&self, max_total: usize) -> DiscoveryReport {
    let started = Instant::now();

    if !self.source.is_configured() {
      warn!("tiered discovery requested without an API key");
      return DiscoveryReport::unconfigured();
    }

    let baseline = self.source.tally();
    let mut tiers = TierLists::default();
    let result = self.run_tiers(&mut tiers, max_total).await;
    let performance = self.performance(baseline, started);

    match result {
      Ok(()) => {
        tiers.sort_by_potential();
        let report = DiscoveryReport::from_tiers(tiers, performance);
        info!(
          gold = report.summary.gold,
          silver = report.summary.silver,
          bronze = report.summary.bronze,
          api_calls = report.performance.api_calls,
          cache_hits = report.performance.cache_hits,
          "tiered discovery finished"
        );
        report
      }
      Err(e) => {
        warn!(
          error = %e,
          discarded = tiers.total(),
          "tiered discovery failed, discarding partial tiers"
        );
        DiscoveryReport::failed(format!("Tiered discovery failed: {}", e), performance)
      }
    }
  }

  async fn run_tiers(&self, tiers: &mut TierLists, max_total: usize) -> Result<()> {
    let rules = &self.heuristics.tiers;
    if max_total == 0 {
      return Ok(());
    }

    self.gold_pass(tiers, max_total).await?;
    if tiers.gold.len() >= rules.gold_early_exit {
      info!(gold = tiers.gold.len(), "enough gold channels, skipping silver and bronze");
      return Ok(());
    }

    if tiers.total() >= max_total {
      return Ok(());
    }

    self.silver_pass(tiers, max_total).await?;
    if tiers.total() >= rules.silver_early_exit {
      info!(found = tiers.total(), "enough gold and silver channels, skipping bronze");
      return Ok(());
    }

    if tiers.total() >= max_total {
      return Ok(());
    }

    self.bronze_pass(tiers, max_total).await
  }

  /// Channels behind currently trending videos with repeated viral uploads.
  async fn gold_pass(&self, tiers: &mut TierLists, max_total: usize) -> Result<()> {
    let rules = &self.heuristics.tiers;
    let gate = &self.heuristics.fast_pass;

    let trending = match self.source.trending_videos(rules.trending_max_results).await {
      FetchOutcome::Found(videos) => videos,
      other => {
        debug!(outcome = ?other.map(|v| v.len()), "no trending videos for gold pass");
        return Ok(());
      }
    };

    let mut seen = HashSet::new();
    let candidates: Vec<String> = trending
      .into_iter()
      .filter(|v| v.view_count >= rules.candidate_views)
      .filter(|v| seen.insert(v.channel_id.clone()))
      .map(|v| v.channel_id)
      .take(rules.gold_candidates)
      .collect();

    info!(candidates = candidates.len(), "gold pass");

    for channel_id in candidates {
      if tiers.total() >= max_total {
        break;
      }

      let Some(channel) = self.evaluate_channel(&channel_id, gate).await? else {
        continue;
      };

      if channel.viral_video_count >= rules.gold_min_viral {
        let criteria = format!(
          "{} of last {} uploads above {} views, trending now",
          channel.viral_video_count, gate.sample_size, gate.viral_threshold
        );
        tiers.gold.push(channel.with_tier(Tier::Gold, criteria));
      }
    }

    Ok(())
  }

  /// Channels behind high-view Shorts from the last month with one or two hits.
  async fn silver_pass(&self, tiers: &mut TierLists, max_total: usize) -> Result<()> {
    let rules = &self.heuristics.tiers;
    let gate = &self.heuristics.fast_pass;

    let search = VideoSearch {
      query: rules.search_query.clone(),
      published_after: self.window_start(rules.silver_window_days)?,
      max_results: rules.search_max_results,
      order: SearchOrder::ViewCount,
    };

    let hits = match self.source.search_recent_videos(&search).await {
      FetchOutcome::Found(hits) => hits,
      other => {
        debug!(outcome = ?other.map(|h| h.len()), "no search results for silver pass");
        return Ok(());
      }
    };

    info!(hits = hits.len(), "silver pass");

    let (min_viral, max_viral) = rules.silver_viral;
    let mut seen = tiers.channel_ids();

    for hit in hits {
      if tiers.total() >= max_total {
        break;
      }
      if seen.contains(&hit.channel_id) {
        continue;
      }

      let Some(video) = self.source.video_views(&hit.video_id).await?.found() else {
        continue;
      };
      if video.view_count < rules.candidate_views {
        continue;
      }
      seen.insert(hit.channel_id.clone());

      let Some(channel) = self.evaluate_channel(&hit.channel_id, gate).await? else {
        continue;
      };

      if (min_viral..=max_viral).contains(&channel.viral_video_count) {
        let criteria = format!(
          "{} of last {} uploads above {} views in the last {} days",
          channel.viral_video_count, gate.sample_size, gate.viral_threshold, rules.silver_window_days
        );
        tiers.silver.push(channel.with_tier(Tier::Silver, criteria));
      }
    }

    Ok(())
  }

  /// Recently active channels with a strong growth profile.
  async fn bronze_pass(&self, tiers: &mut TierLists, max_total: usize) -> Result<()> {
    let rules = &self.heuristics.tiers;

    let search = VideoSearch {
      query: rules.search_query.clone(),
      published_after: self.window_start(rules.bronze_window_days)?,
      max_results: rules.search_max_results,
      order: SearchOrder::Date,
    };

    let hits = match self.source.search_recent_videos(&search).await {
      FetchOutcome::Found(hits) => hits,
      other => {
        debug!(outcome = ?other.map(|h| h.len()), "no search results for bronze pass");
        return Ok(());
      }
    };

    let mut seen = tiers.channel_ids();
    let candidates: Vec<String> = hits
      .into_iter()
      .filter(|h| seen.insert(h.channel_id.clone()))
      .map(|h| h.channel_id)
      .take(rules.bronze_candidates)
      .collect();

    info!(candidates = candidates.len(), "bronze pass");

    for channel_id in candidates {
      if tiers.total() >= max_total {
        break;
      }

      let Some(mut channel) = self.source.channel_stats(&channel_id).await?.found() else {
        continue;
      };

      let growth = metrics::growth_score(&channel, &self.heuristics.growth);
      if growth < rules.bronze_min_growth {
        debug!(channel_id = %channel_id, growth, "below bronze growth threshold");
        continue;
      }

      // No upload sample in this pass: score on lifetime statistics alone
      channel.quality_score = metrics::quality_score(&channel, 0, &self.heuristics.quality);
      channel.potential_score =
        metrics::potential_score(0, 0.0, channel.quality_score, 0.0, &self.heuristics.potential);
      channel.growth_score = Some(growth);

      let criteria = format!(
        "growth score {:.1}/10 with uploads in the last {} days",
        growth, rules.bronze_window_days
      );
      tiers.bronze.push(channel.with_tier(Tier::Bronze, criteria));
    }

    Ok(())
  }
}
