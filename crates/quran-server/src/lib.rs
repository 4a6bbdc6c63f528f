//! Wiring for the `quran-server` binary: configuration, the response cache
//! backend, and the assembled [`Catalog`].

pub mod backend;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use quran_api::AdminAuth;
use quran_client::{ContentApi, RemoteClient, TtlConfig, UpstreamConfig, cache::MemoryCache};
use quran_store_sqlite::SqliteStore;
use quran_sync::{Catalog, CatalogConfig};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use backend::CacheBackend;

/// The catalog served by this binary.
pub type AppCatalog = Catalog<SqliteStore, ContentApi<CacheBackend>>;

/// Path the API is mounted under.
pub const API_PREFIX: &str = "/api/v1/quran";

// ─── Configuration ───────────────────────────────────────────────────────────

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("quran.db") }

fn default_language() -> String { "en".to_owned() }

/// Where upstream payloads are memoised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
  /// Process memory; lost on restart.
  #[default]
  Memory,
  /// The `response_cache` table of the local store.
  Sqlite,
}

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  #[serde(default = "default_store_path")]
  pub store_path:        PathBuf,
  #[serde(default = "default_language")]
  pub default_language:  String,
  #[serde(default = "default_language")]
  pub fallback_language: String,
  #[serde(default)]
  pub response_cache:    CacheKind,
  pub upstream:          UpstreamConfig,
  #[serde(default)]
  pub ttl:               TtlConfig,
  /// Credentials for admin routes. Unset leaves them open.
  #[serde(default)]
  pub admin:             Option<AdminAuth>,
}

impl ServerConfig {
  /// Read `path` (if it exists), then `QURAN_*` environment overrides.
  ///
  /// Nested keys use `__`, e.g. `QURAN_UPSTREAM__CLIENT_SECRET`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(environment())
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn catalog(&self) -> CatalogConfig {
    CatalogConfig {
      default_language:  self.default_language.clone(),
      fallback_language: self.fallback_language.clone(),
    }
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

fn environment() -> config::Environment {
  config::Environment::with_prefix("QURAN")
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Assembly ────────────────────────────────────────────────────────────────

/// Open the store, pick the response cache, and build the upstream client.
pub async fn open_catalog(cfg: &ServerConfig) -> anyhow::Result<AppCatalog> {
  let store_path = expand_tilde(&cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let cache = match cfg.response_cache {
    CacheKind::Memory => CacheBackend::Memory(MemoryCache::new()),
    CacheKind::Sqlite => {
      store
        .purge_expired()
        .await
        .context("failed to purge expired cache entries")?;
      CacheBackend::Sqlite(store.clone())
    }
  };

  let remote = RemoteClient::new(&cfg.upstream, cfg.ttl)
    .context("failed to build upstream client")?;
  info!(
    base_url = %cfg.upstream.base_url,
    cache = ?cfg.response_cache,
    store = ?store_path,
    "catalog ready"
  );

  Ok(Catalog::new(store, ContentApi::new(remote, cache, cfg.ttl), cfg.catalog()))
}

/// The full application: the API nested under [`API_PREFIX`], with request
/// tracing.
pub fn app(catalog: Arc<AppCatalog>, admin: Option<AdminAuth>) -> Router {
  Router::new()
    .nest(API_PREFIX, quran_api::api_router(catalog, admin))
    .layer(TraceLayer::new_for_http())
}
