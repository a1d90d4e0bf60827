//! tack-relay daemon binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the shared
//! SQLite store, and runs the radio-side tasks: outbox scheduler, retention
//! sweeps, status heartbeat, and the link supervisor.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use tack_core::{config::HubConfig, radio::NullLink};
use tack_relay::{heartbeat, link, link::RadioHealth, retention, scheduler};
use tack_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Tack mesh relay daemon")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("TACK"))
    .build()
    .context("failed to read config file")?;

  let cfg: HubConfig = settings
    .try_deserialize()
    .context("failed to deserialise HubConfig")?;

  // Open the shared store. This is the only fatal failure.
  let store = SqliteStore::open(&cfg.db_path)
    .await
    .with_context(|| format!("failed to open store at {}", cfg.db_path))?;

  let channels = cfg.channel_map();
  let health = RadioHealth::new();

  tracing::info!(
    hub = %cfg.hub.name,
    db = %cfg.db_path,
    mesh_channels = channels.mesh().len(),
    local_channels = channels.local().len(),
    "relay starting"
  );

  // The serial driver ships out-of-tree; without one the null link keeps the
  // WiFi side running and the status surface reports the radio offline.
  let link = NullLink;
  tracing::info!(
    serial = %cfg.radio.serial_port,
    freq_mhz = cfg.radio.freq_mhz,
    bw_khz = cfg.radio.bw_khz,
    sf = cfg.radio.sf,
    cr = cfg.radio.cr,
    "radio parameters loaded; no driver built in, using the null link"
  );

  tokio::spawn(scheduler::run(
    store.clone(),
    link,
    channels.clone(),
    cfg.limits.clone(),
  ));
  tokio::spawn(retention::run(
    store.clone(),
    channels.clone(),
    cfg.limits.retention_bytes_per_channel,
  ));
  tokio::spawn(heartbeat::run(store.clone(), health.clone()));

  link::run(store, link, channels, health).await;

  Ok(())
}
