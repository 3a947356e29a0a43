//! Single-pass emerging-channel scan under the exact gate.

use color_eyre::Result;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::report::DiscoveryReport;
use super::Discovery;
use crate::cache::{CacheStorage, Clock};
use crate::fetch::FetchOutcome;
use crate::metrics;
use crate::youtube::types::{ChannelRecord, SearchOrder, VideoSearch};
use crate::youtube::VideoPlatform;

impl<P: VideoPlatform, S: CacheStorage, C: Clock> Discovery<P, S, C> {
  /// Scan recent high-view Shorts for emerging channels, best first.
  ///
  /// Returns at most `max_results` channels, all with `is_emerging` set.
  /// An empty scan is `no_results`, never an error.
  pub async fn discover_emerging_channels(&self, max_results: usize) -> DiscoveryReport {
    let started = Instant::now();

    if !self.source.is_configured() {
      warn!("emerging scan requested without an API key");
      return DiscoveryReport::unconfigured();
    }

    let baseline = self.source.tally();
    let result = self.scan_emerging(max_results).await;
    let performance = self.performance(baseline, started);

    match result {
      Ok(channels) => {
        let report = DiscoveryReport::from_channels(channels, performance);
        info!(
          found = report.channels.len(),
          api_calls = report.performance.api_calls,
          cache_hits = report.performance.cache_hits,
          "emerging scan finished"
        );
        report
      }
      Err(e) => {
        warn!(error = %e, "emerging scan failed");
        DiscoveryReport::failed(format!("Emerging channel scan failed: {}", e), performance)
      }
    }
  }

  async fn scan_emerging(&self, max_results: usize) -> Result<Vec<ChannelRecord>> {
    if max_results == 0 {
      return Ok(Vec::new());
    }

    let gate = &self.heuristics.exact_pass;
    let candidates = self.emerging_candidates(max_results).await?;
    info!(candidates = candidates.len(), "emerging scan");

    let mut found = Vec::new();
    for channel_id in candidates {
      if found.len() >= max_results {
        break;
      }

      let Some(mut channel) = self.evaluate_channel(&channel_id, gate).await? else {
        continue;
      };
      if !channel.is_emerging {
        continue;
      }

      channel.criteria = Some(format!(
        "{} of last {} uploads above {} views within {} days",
        channel.viral_video_count, gate.sample_size, gate.viral_threshold, gate.max_age_days
      ));
      found.push(channel);
    }

    metrics::sort_by_potential(&mut found);
    found.truncate(max_results);
    Ok(found)
  }

  /// Distinct channels behind recent top Shorts, topped up from a channel
  /// keyword search when the video search comes up short.
  async fn emerging_candidates(&self, max_results: usize) -> Result<Vec<String>> {
    let rules = &self.heuristics.tiers;
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    let search = VideoSearch {
      query: rules.search_query.clone(),
      published_after: self.window_start(rules.emerging_window_days)?,
      max_results: rules.search_max_results,
      order: SearchOrder::ViewCount,
    };

    match self.source.search_recent_videos(&search).await {
      FetchOutcome::Found(hits) => {
        for hit in hits {
          if seen.insert(hit.channel_id.clone()) {
            candidates.push(hit.channel_id);
          }
        }
      }
      other => debug!(outcome = ?other.map(|h| h.len()), "no video search results for emerging scan"),
    }

    if candidates.len() >= max_results {
      return Ok(candidates);
    }

    match self
      .source
      .search_channels(&rules.channel_search_keyword, rules.search_max_results)
      .await
    {
      FetchOutcome::Found(ids) => {
        for id in ids {
          if seen.insert(id.clone()) {
            candidates.push(id);
          }
        }
      }
      other => debug!(outcome = ?other.map(|ids| ids.len()), "no channel search results for emerging scan"),
    }

    Ok(candidates)
  }
}
