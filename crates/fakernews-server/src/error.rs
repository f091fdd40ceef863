//! Startup errors for the fakernews server.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("config error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("port must be non-zero")]
  InvalidPort,

  #[error("unsupported database url {0:?}; expected file:<path>, <path> or :memory:")]
  InvalidDatabaseUrl(String),

  #[error("store error: {0}")]
  Store(#[from] fakernews_store_sqlite::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
