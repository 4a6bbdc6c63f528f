//! quran-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `QURAN_*`
//! environment overrides, opens the SQLite store, and either serves the JSON
//! API or runs a one-off chapter sync.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `admin.password_hash`:
//!
//! ```
//! cargo run -p quran-server -- hash-password
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::{Args, Parser, Subcommand};
use quran_core::chapter::ChapterId;
use quran_server::{ServerConfig, app, open_catalog};
use quran_sync::BulkOptions;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Quran chapter API proxy")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API (the default).
  Serve,
  /// Sync chapters from the upstream API into the local store.
  Sync(SyncArgs),
  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
}

#[derive(Args)]
struct SyncArgs {
  /// Sync only this chapter (1-114).
  #[arg(short, long)]
  chapter:  Option<i64>,
  /// Language for translated names. Defaults to `default_language`.
  #[arg(short, long)]
  language: Option<String>,
  /// Also sync chapter info.
  #[arg(long)]
  info:     bool,
  /// Bypass the response cache.
  #[arg(long)]
  force:    bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  match cli.command.unwrap_or(Command::Serve) {
    Command::HashPassword => hash_password(),
    Command::Serve => serve(ServerConfig::load(&cli.config)?).await,
    Command::Sync(args) => sync(ServerConfig::load(&cli.config)?, args).await,
  }
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
  let catalog = open_catalog(&cfg).await?;

  if cfg.admin.is_none() {
    warn!("no admin credentials configured; admin routes are unauthenticated");
  }

  let app = app(Arc::new(catalog), cfg.admin.clone());
  let address = cfg.address();

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn sync(cfg: ServerConfig, args: SyncArgs) -> anyhow::Result<()> {
  let ids: Vec<ChapterId> = match args.chapter {
    Some(n) => vec![ChapterId::new(n).context("invalid --chapter")?],
    None => ChapterId::all().collect(),
  };

  let catalog = open_catalog(&cfg).await?;
  let language = catalog.language(args.language.as_deref()).to_owned();
  let options = BulkOptions { with_info: args.info, force: args.force };

  let report = catalog.sync_chapters(&ids, &language, options).await;

  println!(
    "Synced {} of {} chapter(s) in '{language}'.",
    report.synced.len(),
    report.total()
  );
  for (id, reason) in &report.failed {
    println!("  chapter {id}: {reason}");
  }

  if !report.is_success() {
    anyhow::bail!("{} chapter(s) failed to sync", report.failed.len());
  }
  Ok(())
}

fn hash_password() -> anyhow::Result<()> {
  let password = rpassword_or_stdin()?;
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
    .to_string();
  println!("{hash}");
  Ok(())
}

/// Read a password from stdin.
fn rpassword_or_stdin() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
