//! Error type for `fakernews-store-sqlite`.

use fakernews_core::{Classify, ErrorClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Domain failures (missing rows, conflicts) surfaced by the store.
  #[error(transparent)]
  Core(#[from] fakernews_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("timestamp out of range: {0}")]
  Timestamp(i64),
}

impl Classify for Error {
  fn class(&self) -> ErrorClass {
    match self {
      Self::Core(e) => e.class(),
      Self::Database(_) | Self::Json(_) | Self::Timestamp(_) => {
        ErrorClass::Internal
      }
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
