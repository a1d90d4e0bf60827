//! `tack` — operator tool for a Tack hub.
//!
//! Reads the same `config.toml` as the relay daemon and operates directly on
//! the shared SQLite store: pinning, retention, outbox management, session
//! and message inspection.

mod commands;
mod format;
#[cfg(test)]
mod tests;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tack_core::config::HubConfig;
use tack_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "tack", about = "Tack hub operator tool")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Pin a message to the top of its channel feed.
  Pin {
    message_id: i64,
    /// Explicit pin order; defaults to after the current pins.
    #[arg(long)]
    order:      Option<i64>,
  },
  /// Unpin a message.
  Unpin { message_id: i64 },
  /// Aggregate row counts.
  Stats,
  /// Run retention eviction now.
  Cleanup {
    /// Restrict to one channel; defaults to every configured channel.
    #[arg(long)]
    channel: Option<String>,
  },
  /// Inspect or edit the relay queue.
  #[command(subcommand)]
  Outbox(OutboxCommand),
  /// Inspect portal sessions.
  #[command(subcommand)]
  Sessions(SessionsCommand),
  /// Inspect stored messages.
  #[command(subcommand)]
  Messages(MessagesCommand),
}

#[derive(Subcommand)]
enum OutboxCommand {
  /// Pending entries, oldest first.
  List {
    #[arg(long)]
    channel: Option<String>,
    #[arg(long, default_value_t = 50)]
    limit:   usize,
  },
  /// Delete one pending entry.
  Cancel {
    outbox_id: i64,
    /// Skip the confirmation prompt.
    #[arg(long)]
    yes:       bool,
  },
  /// Delete every pending entry.
  Clear {
    /// Skip the confirmation prompt.
    #[arg(long)]
    yes: bool,
  },
}

#[derive(Subcommand)]
enum SessionsCommand {
  /// Sessions ordered by most recent post.
  List {
    #[arg(long, default_value_t = 20)]
    limit: usize,
  },
  /// Every stored field for one session.
  Show { session_id: String },
}

#[derive(Subcommand)]
enum MessagesCommand {
  /// Latest stored messages across all sources.
  Recent {
    #[arg(long)]
    channel: Option<String>,
    /// mesh, wifi, or local.
    #[arg(long)]
    source:  Option<String>,
    #[arg(long, default_value_t = 20)]
    limit:   usize,
  },
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Keep routine store logging out of the table output.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("TACK"))
    .build()
    .context("failed to read config file")?;

  let cfg: HubConfig = settings
    .try_deserialize()
    .context("failed to deserialise HubConfig")?;

  let store = SqliteStore::open(&cfg.db_path)
    .await
    .with_context(|| format!("failed to open store at {}", cfg.db_path))?;

  match cli.command {
    Command::Pin { message_id, order } => {
      commands::pin(&store, message_id, order).await
    }
    Command::Unpin { message_id } => commands::unpin(&store, message_id).await,
    Command::Stats => commands::stats(&store).await,
    Command::Cleanup { channel } => {
      commands::cleanup(&store, &cfg, channel).await
    }
    Command::Outbox(OutboxCommand::List { channel, limit }) => {
      commands::outbox_list(&store, channel, limit).await
    }
    Command::Outbox(OutboxCommand::Cancel { outbox_id, yes }) => {
      commands::outbox_cancel(&store, outbox_id, yes).await
    }
    Command::Outbox(OutboxCommand::Clear { yes }) => {
      commands::outbox_clear(&store, yes).await
    }
    Command::Sessions(SessionsCommand::List { limit }) => {
      commands::sessions_list(&store, limit).await
    }
    Command::Sessions(SessionsCommand::Show { session_id }) => {
      commands::sessions_show(&store, &session_id).await
    }
    Command::Messages(MessagesCommand::Recent { channel, source, limit }) => {
      commands::messages_recent(&store, channel, source, limit).await
    }
  }
}
