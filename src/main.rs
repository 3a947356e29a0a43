mod cache;
mod config;
mod discovery;
mod fetch;
mod metrics;
mod youtube;

use clap::{Parser, ValueEnum};
use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cache::{CacheLayer, CacheStorage, MemoryStorage, NoopStorage};
use config::Config;
use discovery::legacy::LegacyResponse;
use discovery::Discovery;
use youtube::client::YouTubeClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
  Json,
  Text,
}

#[derive(Parser, Debug)]
#[command(name = "shortscout")]
#[command(about = "Find emerging YouTube Shorts channels before they break out")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./shortscout.yaml, then $XDG_CONFIG_HOME/shortscout/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Maximum number of channels to return
  #[arg(short, long)]
  max: Option<usize>,

  /// Run the single-pass emerging scan instead of the tiered search
  #[arg(long)]
  legacy: bool,

  /// Output format
  #[arg(short, long, value_enum, default_value_t = Format::Json)]
  format: Format,

  /// Also write logs to this file
  #[arg(long)]
  log_file: Option<PathBuf>,

  /// Bypass the response cache
  #[arg(long)]
  no_cache: bool,
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shortscout=info"));

  let (file_layer, guard) = match log_file {
    Some(path) => {
      let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("Invalid log file path: {}", path.display()))?;
      let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
      };

      let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
      let layer = fmt::layer().with_writer(writer).with_ansi(false);
      (Some(layer), Some(guard))
    }
    None => (None, None),
  };

  tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
    .with(file_layer)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}

async fn run<S: CacheStorage>(args: &Args, config: Config, storage: S) -> Result<()> {
  let client = YouTubeClient::new(&config)?;
  let cache = CacheLayer::new(storage).with_ttl(config.cache.ttl()?);
  let max = args.max.unwrap_or(config.discovery.max_results);
  let discovery = Discovery::new(Arc::new(client), cache, config.heuristics);

  let report = if args.legacy {
    discovery.discover_emerging_channels(max).await
  } else {
    discovery.discover_channels_tiered(max).await
  };

  match (args.format, args.legacy) {
    (Format::Text, _) => println!("{}", report),
    (Format::Json, true) => println!(
      "{}",
      serde_json::to_string_pretty(&LegacyResponse::from_report(&report))?
    ),
    (Format::Json, false) => println!("{}", serde_json::to_string_pretty(&report)?),
  }

  Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  // Dropping the guard flushes the file writer
  let _guard = init_tracing(args.log_file.as_deref())?;

  let config = Config::load(args.config.as_deref())?;

  if config.cache.disabled || args.no_cache {
    info!("response cache disabled");
    run(&args, config, NoopStorage).await
  } else {
    run(&args, config, MemoryStorage::new()).await
  }
}
