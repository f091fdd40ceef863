//! Arcade game scores.
//!
//! All games share one table keyed by a [`GameKind`] discriminator. The
//! game-specific columns ([`GameStats`]) travel as a JSON payload, the same
//! way the discriminant/payload split works for any tagged value in the store.

use chrono::{DateTime, Utc, serde::ts_milliseconds};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{Error, Result};

/// The games with leaderboards.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
pub enum GameKind {
  #[serde(rename = "2048")]
  #[strum(serialize = "2048")]
  Game2048,
  #[serde(rename = "snake")]
  #[strum(serialize = "snake")]
  Snake,
  #[serde(rename = "flappybird")]
  #[strum(serialize = "flappybird")]
  FlappyBird,
}

impl GameKind {
  pub const ALL: [Self; 3] = [Self::Game2048, Self::Snake, Self::FlappyBird];

  /// Parse a path segment, mapping failure to [`Error::UnknownGame`].
  pub fn parse(name: &str) -> Result<Self> {
    name.parse().map_err(|_| Error::UnknownGame(name.to_owned()))
  }

  /// Human-readable name used in messages.
  pub fn label(self) -> &'static str {
    match self {
      Self::Game2048 => "2048",
      Self::Snake => "snake",
      Self::FlappyBird => "Flappy Bird",
    }
  }
}

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Game-specific fields of a score row, tagged by `gameType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "gameType")]
pub enum GameStats {
  #[serde(rename = "2048", rename_all = "camelCase")]
  Game2048 { best_tile: i64, moves: i64 },
  #[serde(rename = "snake", rename_all = "camelCase")]
  Snake { duration: i64, food_eaten: i64 },
  #[serde(rename = "flappybird", rename_all = "camelCase")]
  FlappyBird { pipes_passed: i64, duration: i64 },
}

impl GameStats {
  pub fn kind(&self) -> GameKind {
    match self {
      Self::Game2048 { .. } => GameKind::Game2048,
      Self::Snake { .. } => GameKind::Snake,
      Self::FlappyBird { .. } => GameKind::FlappyBird,
    }
  }

  /// Serialise only the game-specific fields (without the `gameType` tag)
  /// for the `stats_json` column.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    let mut full = serde_json::to_value(self)?;
    if let Some(map) = full.as_object_mut() {
      map.remove("gameType");
    }
    Ok(full)
  }

  /// Rebuild from the discriminator column and the `stats_json` payload.
  pub fn from_parts(kind: GameKind, data: serde_json::Value) -> Result<Self> {
    let mut data = data;
    if let Some(map) = data.as_object_mut() {
      map.insert("gameType".into(), serde_json::to_value(kind)?);
    }
    Ok(serde_json::from_value(data)?)
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// A persisted score. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameScore {
  pub id:      i64,
  pub user_id: String,
  pub score:   i64,
  #[serde(with = "ts_milliseconds")]
  pub time:    DateTime<Utc>,
  #[serde(flatten)]
  pub stats:   GameStats,
}

/// Input to [`crate::store::NewsStore::submit_score`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGameScore {
  pub user_id: String,
  pub score:   i64,
  pub stats:   GameStats,
}

/// `POST /games/2048` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submit2048 {
  pub user_id:   String,
  pub score:     i64,
  pub best_tile: Option<i64>,
  pub moves:     Option<i64>,
}

impl From<Submit2048> for NewGameScore {
  fn from(b: Submit2048) -> Self {
    Self {
      user_id: b.user_id,
      score:   b.score,
      stats:   GameStats::Game2048 {
        best_tile: b.best_tile.unwrap_or(2),
        moves:     b.moves.unwrap_or(0),
      },
    }
  }
}

/// `POST /games/snake` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSnake {
  pub user_id:    String,
  pub score:      i64,
  pub duration:   i64,
  pub food_eaten: Option<i64>,
}

impl From<SubmitSnake> for NewGameScore {
  fn from(b: SubmitSnake) -> Self {
    Self {
      user_id: b.user_id,
      score:   b.score,
      stats:   GameStats::Snake {
        duration:   b.duration,
        food_eaten: b.food_eaten.unwrap_or(0),
      },
    }
  }
}

/// `POST /games/flappybird` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFlappyBird {
  pub user_id:      String,
  pub score:        i64,
  pub pipes_passed: i64,
  pub duration:     i64,
}

impl From<SubmitFlappyBird> for NewGameScore {
  fn from(b: SubmitFlappyBird) -> Self {
    Self {
      user_id: b.user_id,
      score:   b.score,
      stats:   GameStats::FlappyBird {
        pipes_passed: b.pipes_passed,
        duration:     b.duration,
      },
    }
  }
}

// ─── Read models ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
  pub id: String,
}

/// A leaderboard row: the score joined with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
  #[serde(flatten)]
  pub score: GameScore,
  pub user:  UserRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
  pub scores: Vec<LeaderboardEntry>,
}

/// A user's best scores for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserScores {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  pub scores:  Vec<GameScore>,
}

impl UserScores {
  pub const LIMIT: u32 = 10;

  pub fn new(game: GameKind, scores: Vec<GameScore>) -> Self {
    let message = scores
      .is_empty()
      .then(|| format!("No {} scores found for this user", game.label()));
    Self { message, scores }
  }
}
