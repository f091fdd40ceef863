//! Encoding and decoding helpers between domain types and the plain column
//! representations stored in SQLite.
//!
//! Timestamps are stored as Unix milliseconds. Enum discriminants are stored
//! as their lowercase string forms. Game stats are stored as compact JSON.

use chrono::{DateTime, Utc};
use fakernews_core::{
  game::{GameKind, GameScore, GameStats, LeaderboardEntry, UserRef},
  item::{Item, ItemKind},
  user::User,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> i64 { dt.timestamp_millis() }

pub fn decode_dt(ms: i64) -> Result<DateTime<Utc>> {
  DateTime::from_timestamp_millis(ms).ok_or(Error::Timestamp(ms))
}

/// The current time, truncated to the stored precision.
pub fn now_millis() -> i64 { encode_dt(Utc::now()) }

// ─── Discriminants ───────────────────────────────────────────────────────────

pub fn decode_item_kind(s: &str) -> Result<ItemKind> {
  s.parse()
    .map_err(|_| fakernews_core::Error::UnknownItemType(s.to_owned()).into())
}

pub fn decode_game_kind(s: &str) -> Result<GameKind> {
  Ok(GameKind::parse(s)?)
}

// ─── Items ───────────────────────────────────────────────────────────────────

const ITEM_FIELDS: [&str; 11] = [
  "id", "kind", "author", "time", "text", "url", "title", "parent", "score",
  "deleted", "dead",
];

/// The `items` column list in [`RawItem::from_row`] order, optionally
/// qualified with a table alias.
pub fn item_columns(alias: Option<&str>) -> String {
  ITEM_FIELDS
    .iter()
    .map(|f| match alias {
      Some(a) => format!("{a}.{f}"),
      None => (*f).to_owned(),
    })
    .collect::<Vec<_>>()
    .join(", ")
}

/// Raw values read directly from an `items` row.
pub struct RawItem {
  pub id:      i64,
  pub kind:    String,
  pub author:  String,
  pub time:    i64,
  pub text:    Option<String>,
  pub url:     Option<String>,
  pub title:   Option<String>,
  pub parent:  Option<i64>,
  pub score:   i64,
  pub deleted: bool,
  pub dead:    bool,
}

impl RawItem {
  /// Read the eleven item columns starting at index `0`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:      row.get(0)?,
      kind:    row.get(1)?,
      author:  row.get(2)?,
      time:    row.get(3)?,
      text:    row.get(4)?,
      url:     row.get(5)?,
      title:   row.get(6)?,
      parent:  row.get(7)?,
      score:   row.get(8)?,
      deleted: row.get(9)?,
      dead:    row.get(10)?,
    })
  }

  pub fn into_item(self) -> Result<Item> {
    Ok(Item {
      id:      self.id,
      kind:    decode_item_kind(&self.kind)?,
      by:      self.author,
      time:    decode_dt(self.time)?,
      text:    self.text,
      url:     self.url,
      title:   self.title,
      parent:  self.parent,
      score:   self.score,
      deleted: self.deleted,
      dead:    self.dead,
    })
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "id, created, karma, about";

pub struct RawUser {
  pub id:      String,
  pub created: i64,
  pub karma:   i64,
  pub about:   Option<String>,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:      row.get(0)?,
      created: row.get(1)?,
      karma:   row.get(2)?,
      about:   row.get(3)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:      self.id,
      created: decode_dt(self.created)?,
      karma:   self.karma,
      about:   self.about,
    })
  }
}

// ─── Game scores ─────────────────────────────────────────────────────────────

pub const SCORE_COLUMNS: &str = "id, user_id, game_type, score, time, stats_json";

pub fn encode_stats(stats: &GameStats) -> Result<String> {
  Ok(stats.to_json()?.to_string())
}

pub struct RawGameScore {
  pub id:         i64,
  pub user_id:    String,
  pub game_type:  String,
  pub score:      i64,
  pub time:       i64,
  pub stats_json: String,
}

impl RawGameScore {
  /// Read the six score columns starting at index `0`.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      user_id:    row.get(1)?,
      game_type:  row.get(2)?,
      score:      row.get(3)?,
      time:       row.get(4)?,
      stats_json: row.get(5)?,
    })
  }

  pub fn into_score(self) -> Result<GameScore> {
    let kind = decode_game_kind(&self.game_type)?;
    let data: serde_json::Value = serde_json::from_str(&self.stats_json)?;
    Ok(GameScore {
      id:      self.id,
      user_id: self.user_id,
      score:   self.score,
      time:    decode_dt(self.time)?,
      stats:   GameStats::from_parts(kind, data)?,
    })
  }
}

/// A score row joined with its author's id.
pub struct RawLeaderboardEntry {
  pub score:  RawGameScore,
  pub author: String,
}

impl RawLeaderboardEntry {
  pub fn into_entry(self) -> Result<LeaderboardEntry> {
    Ok(LeaderboardEntry {
      score: self.score.into_score()?,
      user:  UserRef { id: self.author },
    })
  }
}
