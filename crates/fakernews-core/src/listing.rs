//! Ranked listings over items and limit/offset paging.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::item::ItemKind;

/// The id listings served under `/top`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Listing {
  /// Stories by score, then recency.
  #[strum(serialize = "stories")]
  #[serde(rename = "stories")]
  TopStories,
  /// Comments by score, then recency.
  #[strum(serialize = "comments")]
  #[serde(rename = "comments")]
  TopComments,
  /// Jobs by recency only.
  #[strum(serialize = "jobs")]
  #[serde(rename = "jobs")]
  TopJobs,
  /// Stories by recency only.
  #[strum(serialize = "new")]
  #[serde(rename = "new")]
  NewStories,
}

impl Listing {
  pub fn kind(self) -> ItemKind {
    match self {
      Self::TopStories | Self::NewStories => ItemKind::Story,
      Self::TopComments => ItemKind::Comment,
      Self::TopJobs => ItemKind::Job,
    }
  }

  /// Whether score is the primary sort key; otherwise only time is used.
  pub fn ranks_by_score(self) -> bool {
    matches!(self, Self::TopStories | Self::TopComments)
  }
}

/// A normalised limit/offset window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
  pub limit:  u32,
  pub offset: u32,
}

impl Page {
  pub const DEFAULT_LIMIT: u32 = 30;
  pub const MAX_LIMIT: u32 = 100;

  /// Clamp `limit` into `[1, MAX_LIMIT]` (default [`Self::DEFAULT_LIMIT`]) and
  /// `offset` to be non-negative.
  pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
    Self::with_default(limit, offset, Self::DEFAULT_LIMIT)
  }

  pub fn with_default(
    limit: Option<i64>,
    offset: Option<i64>,
    default_limit: u32,
  ) -> Self {
    let limit = limit
      .map(|l| l.clamp(1, i64::from(Self::MAX_LIMIT)) as u32)
      .unwrap_or(default_limit);
    let offset = offset
      .map(|o| o.clamp(0, i64::from(u32::MAX)) as u32)
      .unwrap_or(0);
    Self { limit, offset }
  }
}

impl Default for Page {
  fn default() -> Self { Self::new(None, None) }
}
