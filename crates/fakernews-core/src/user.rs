//! Users and karma.

use chrono::{DateTime, Utc, serde::ts_milliseconds};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A registered user. The id is chosen by the client at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:      String,
  #[serde(with = "ts_milliseconds")]
  pub created: DateTime<Utc>,
  pub karma:   i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub about:   Option<String>,
}

/// Apply `delta` to a non-negative counter, flooring the result at zero.
pub fn clamped_add(value: i64, delta: i64) -> i64 {
  value.saturating_add(delta).max(0)
}

/// Votes and favorites are attributed to a client-supplied user id; an empty
/// one means the caller never identified itself.
pub fn require_user(user_id: &str) -> Result<&str> {
  if user_id.trim().is_empty() {
    Err(Error::MissingUserId)
  } else {
    Ok(user_id)
  }
}
