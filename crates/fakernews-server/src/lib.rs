//! HTTP server wiring for fakernews.
//!
//! Configuration loading and validation, store opening, and the top-level
//! [`Router`] with request tracing. The binary in `main.rs` is a thin shell
//! around these pieces.

pub mod error;

pub use error::{Error, Result};

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, extract::MatchedPath, http::Request};
use config::{ConfigBuilder, builder::DefaultState};
use fakernews_store_sqlite::SqliteStore;
use serde::Deserialize;
use strum::{AsRefStr, Display};
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Deployment mode. Only affects the default log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
  #[serde(alias = "development")]
  Dev,
  Production,
}

impl Mode {
  pub fn default_log_level(self) -> LevelFilter {
    match self {
      Self::Dev => LevelFilter::DEBUG,
      Self::Production => LevelFilter::INFO,
    }
  }
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `FAKERNEWS_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  pub mode:         Mode,
  pub database_url: String,
}

impl ServerConfig {
  /// Load from an optional TOML file at `path`, overridden by the
  /// environment, then validate.
  pub fn load(path: &Path) -> Result<Self> {
    Self::from_builder(
      defaults()?
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("FAKERNEWS")),
    )
  }

  fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
    let cfg: Self = builder.build()?.try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
  }

  /// Reject a zero port and database URLs the SQLite store cannot open.
  pub fn validate(&self) -> Result<()> {
    if self.port == 0 {
      return Err(Error::InvalidPort);
    }
    StoreLocation::parse(&self.database_url)?;
    Ok(())
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn store_location(&self) -> Result<StoreLocation> {
    StoreLocation::parse(&self.database_url)
  }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
  Ok(
    config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 3000)?
      .set_default("mode", "dev")?
      .set_default("database_url", "file:fakernews.db")?,
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Where the SQLite database lives, as named by `database_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
  Memory,
  File(PathBuf),
}

impl StoreLocation {
  /// Accepts `file:<path>`, `file://<path>`, a bare path, or `:memory:`.
  pub fn parse(url: &str) -> Result<Self> {
    let invalid = || Error::InvalidDatabaseUrl(url.to_owned());
    let url = url.trim();

    let path = match url.strip_prefix("file:") {
      Some(rest) => rest.strip_prefix("//").unwrap_or(rest),
      None if url.contains("://") => return Err(invalid()),
      None => url,
    };
    match path {
      "" => Err(invalid()),
      ":memory:" => Ok(Self::Memory),
      path => Ok(Self::File(expand_tilde(Path::new(path)))),
    }
  }

  pub async fn open(&self) -> Result<SqliteStore> {
    let store = match self {
      Self::Memory => SqliteStore::open_in_memory().await?,
      Self::File(path) => SqliteStore::open(path).await?,
    };
    Ok(store)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// The full application: the JSON API with per-request tracing spans.
pub fn app(store: SqliteStore) -> Router {
  fakernews_api::api_router(Arc::new(store)).layer(
    TraceLayer::new_for_http().make_span_with(|req: &Request<_>| {
      let matched_path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str());
      tracing::debug_span!(
        "request",
        method = %req.method(),
        uri = %req.uri(),
        ?matched_path,
      )
    }),
  )
}

// ─── Tests ───────────────────────────────────────────────────────────────────
