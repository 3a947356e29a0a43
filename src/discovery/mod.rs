//! Channel discovery: the tiered search, the legacy emerging scan, and the
//! envelope both report through.

mod emerging;
pub mod legacy;
pub mod report;
mod tiered;

use chrono::{DateTime, Duration, Utc};
use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::cache::{CacheLayer, CacheStorage, Clock, MemoryStorage, SystemClock};
use crate::metrics::{ChannelMetrics, Heuristics, PassGate};
use crate::youtube::cached_client::{CachedPlatform, Tally};
use crate::youtube::types::ChannelRecord;
use crate::youtube::VideoPlatform;

use report::Performance;

/// Discovery engine.
///
/// Holds the cached platform for as long as the process wants to share the
/// cache; each `discover_*` call is one invocation with its own tally.
pub struct Discovery<P: VideoPlatform, S: CacheStorage = MemoryStorage, C: Clock = SystemClock> {
  source: CachedPlatform<P, S, C>,
  heuristics: Heuristics,
}

impl<P: VideoPlatform, S: CacheStorage, C: Clock> Discovery<P, S, C> {
  pub fn new(platform: Arc<P>, cache: CacheLayer<S, C>, heuristics: Heuristics) -> Self {
    Self {
      source: CachedPlatform::new(platform, cache),
      heuristics,
    }
  }

  fn performance(&self, baseline: Tally, started: Instant) -> Performance {
    debug!(entries = self.source.cache_entries(), "cache size after invocation");
    Performance::new(self.source.tally().since(baseline), started.elapsed())
  }

  /// Start of a search window reaching `days` back from now.
  fn window_start(&self, days: i64) -> Result<DateTime<Utc>> {
    Duration::try_days(days)
      .filter(|window| *window >= Duration::zero())
      .and_then(|window| self.source.now().checked_sub_signed(window))
      .ok_or_else(|| eyre!("Invalid search window of {} days", days))
  }

  /// Fetch a channel and score it under `gate`.
  ///
  /// `None` when the platform could not supply the statistics or the upload
  /// sample; the channel is then simply left out.
  async fn evaluate_channel(&self, channel_id: &str, gate: &PassGate) -> Result<Option<ChannelRecord>> {
    let Some(mut channel) = self.source.channel_stats(channel_id).await?.found() else {
      debug!(channel_id, "skipping channel without statistics");
      return Ok(None);
    };

    let Some(check) = self
      .source
      .viral_check(channel_id, gate.sample_size, gate.viral_threshold)
      .await?
      .found()
    else {
      debug!(channel_id, "skipping channel without upload sample");
      return Ok(None);
    };

    let metrics = ChannelMetrics::evaluate(
      &channel,
      &check.sample,
      gate,
      &self.heuristics,
      self.source.now(),
    );
    metrics.apply(&mut channel);

    debug!(
      channel_id,
      viral = metrics.viral_video_count,
      potential = metrics.potential_score,
      emerging = metrics.is_emerging,
      "scored channel"
    );

    Ok(Some(channel))
  }
}
