use chrono::Duration;
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cache::DEFAULT_TTL_SECS;
use crate::metrics::Heuristics;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  pub cache: CacheConfig,
  pub discovery: DiscoveryConfig,
  pub heuristics: Heuristics,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Root of the YouTube Data API (overridable for testing against a mock)
  pub base_url: String,
  /// Per-request timeout; a timeout counts as an unavailable fetch
  pub timeout_secs: u64,
  /// Region for the trending chart, e.g. "US"
  pub region_code: Option<String>,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_string(),
      timeout_secs: 10,
      region_code: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub ttl_secs: u64,
  /// Turn the cache off entirely
  pub disabled: bool,
}

impl CacheConfig {
  /// Entry lifetime as a duration. Fails when `ttl_secs` does not fit one.
  pub fn ttl(&self) -> Result<Duration> {
    i64::try_from(self.ttl_secs)
      .ok()
      .and_then(Duration::try_seconds)
      .ok_or_else(|| eyre!("Invalid cache.ttl_secs {}: out of range", self.ttl_secs))
  }
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      ttl_secs: DEFAULT_TTL_SECS as u64,
      disabled: false,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
  /// Default cap on channels returned by one invocation
  pub max_results: usize,
}

impl Default for DiscoveryConfig {
  fn default() -> Self {
    Self { max_results: 15 }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./shortscout.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/shortscout/config.yaml
  ///
  /// With no file anywhere, built-in defaults apply.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("shortscout.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("shortscout").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn from_yaml(contents: &str) -> Result<Self> {
    // An empty file deserializes to unit, not to a map
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }

    let config: Config = serde_yaml::from_str(contents)?;
    config.validate()?;
    Ok(config)
  }

  /// Reject values that parse but cannot be turned into time spans.
  fn validate(&self) -> Result<()> {
    self.cache.ttl()?;

    let tiers = &self.heuristics.tiers;
    for (name, days) in [
      ("silver_window_days", tiers.silver_window_days),
      ("bronze_window_days", tiers.bronze_window_days),
      ("emerging_window_days", tiers.emerging_window_days),
    ] {
      if days < 0 || Duration::try_days(days).is_none() {
        return Err(eyre!("Invalid heuristics.tiers.{} {}: out of range", name, days));
      }
    }

    Ok(())
  }

  /// Get the YouTube API key from environment variables.
  ///
  /// Checks SHORTSCOUT_YOUTUBE_API_KEY first, then YOUTUBE_API_KEY as fallback.
  /// A missing key is not an error: discovery reports itself unconfigured.
  pub fn get_api_key() -> Option<String> {
    std::env::var("SHORTSCOUT_YOUTUBE_API_KEY")
      .or_else(|_| std::env::var("YOUTUBE_API_KEY"))
      .ok()
      .map(|key| key.trim().to_string())
      .filter(|key| !key.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn test_defaults_without_file() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.cache.ttl_secs, 600);
    assert_eq!(config.discovery.max_results, 15);
    assert_eq!(config.heuristics, Heuristics::default());
  }

  #[test]
  fn test_partial_override_keeps_other_defaults() {
    let config = Config::from_yaml(
      r#"
api:
  timeout_secs: 5
  region_code: GB
heuristics:
  emerging:
    max_subscribers: 100000
  tiers:
    gold_candidates: 3
"#,
    )
    .unwrap();

    assert_eq!(config.api.timeout_secs, 5);
    assert_eq!(config.api.region_code.as_deref(), Some("GB"));
    assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.heuristics.emerging.max_subscribers, 100_000);
    assert_eq!(config.heuristics.emerging.min_potential, 3.0);
    assert_eq!(config.heuristics.tiers.gold_candidates, 3);
    assert_eq!(config.heuristics.tiers.silver_early_exit, 6);
  }

  #[test]
  fn test_load_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "cache:\n  ttl_secs: 30\n  disabled: true").unwrap();

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.cache.ttl_secs, 30);
    assert!(config.cache.disabled);
  }

  #[test]
  fn test_missing_explicit_path_is_error() {
    let err = Config::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }

  #[test]
  fn test_ttl_out_of_range_is_error() {
    let err = Config::from_yaml("cache:\n  ttl_secs: 10000000000000000").unwrap_err();
    assert!(err.to_string().contains("cache.ttl_secs"));

    let err = Config::from_yaml("cache:\n  ttl_secs: 18446744073709551615").unwrap_err();
    assert!(err.to_string().contains("cache.ttl_secs"));
  }

  #[test]
  fn test_ttl_converts() {
    let config = Config::from_yaml("cache:\n  ttl_secs: 90").unwrap();
    assert_eq!(config.cache.ttl().unwrap(), Duration::seconds(90));
  }

  #[test]
  fn test_search_window_out_of_range_is_error() {
    let err = Config::from_yaml("heuristics:\n  tiers:\n    silver_window_days: 9223372036854775807")
      .unwrap_err();
    assert!(err.to_string().contains("silver_window_days"));

    assert!(Config::from_yaml("heuristics:\n  tiers:\n    bronze_window_days: -1").is_err());
  }

  #[test]
  fn test_invalid_yaml_is_error() {
    assert!(Config::from_yaml("api: [unclosed").is_err());
  }
}
