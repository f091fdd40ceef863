//! [`SqliteStore`], the SQLite implementation of [`NewsStore`].

use std::{collections::BTreeMap, path::Path};

use rusqlite::OptionalExtension as _;

use fakernews_core::{
  game::{GameKind, GameScore, LeaderboardEntry, NewGameScore, UserScores},
  item::{
    FavoriteOutcome, FavoriteSummary, Item, ItemFlags, ItemId, ItemKind,
    ItemSummary, ItemView, NewItem, VoteOutcome,
  },
  listing::{Listing, Page},
  store::NewsStore,
  user::{User, clamped_add},
};

use crate::{
  encode::{
    RawGameScore, RawItem, RawLeaderboardEntry, RawUser, SCORE_COLUMNS,
    USER_COLUMNS, decode_dt, encode_stats, item_columns, now_millis,
  },
  schema::SCHEMA,
  Result,
};

type CoreError = fakernews_core::Error;

/// Maximum rows returned by [`NewsStore::user_items`].
const USER_ITEMS_LIMIT: i64 = 100;

/// The two user/item join tables with toggle semantics.
#[derive(Debug, Clone, Copy)]
enum Marker {
  Upvote,
  Favorite,
}

impl Marker {
  fn table(self) -> &'static str {
    match self {
      Self::Upvote => "upvotes",
      Self::Favorite => "favorites",
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A fakernews store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Whether `user_id` has a row in the marker table for `id`.
  async fn is_marked(
    &self,
    marker: Marker,
    id: ItemId,
    user_id: String,
  ) -> Result<bool> {
    let sql = format!(
      "SELECT 1 FROM {} WHERE user_id = ?1 AND item_id = ?2",
      marker.table()
    );
    let marked = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![user_id, id], |_| Ok(()))
            .optional()?
            .is_some(),
        )
      })
      .await?;
    Ok(marked)
  }

  /// Marker status for every id in `ids`, in one statement.
  async fn marked_statuses(
    &self,
    marker: Marker,
    user_id: String,
    ids: Vec<ItemId>,
  ) -> Result<BTreeMap<ItemId, bool>> {
    let mut statuses: BTreeMap<ItemId, bool> =
      ids.iter().map(|id| (*id, false)).collect();
    let ids_json = serde_json::to_string(&ids)?;
    let sql = format!(
      "SELECT item_id FROM {}
       WHERE user_id = ?1
         AND item_id IN (SELECT value FROM json_each(?2))",
      marker.table()
    );

    let marked: Vec<ItemId> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_id, ids_json], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    for id in marked {
      statuses.insert(id, true);
    }
    Ok(statuses)
  }
}

/// Remove the (user, item) row if present, otherwise insert it. Returns
/// whether the row exists afterwards.
///
/// With `UNIQUE (user_id, item_id)` the delete's affected-row count is the
/// prior state.
fn toggle_marker(
  tx: &rusqlite::Transaction<'_>,
  marker: Marker,
  id: ItemId,
  user_id: &str,
) -> rusqlite::Result<bool> {
  let removed = tx.execute(
    &format!(
      "DELETE FROM {} WHERE user_id = ?1 AND item_id = ?2",
      marker.table()
    ),
    rusqlite::params![user_id, id],
  )?;
  if removed > 0 {
    return Ok(false);
  }
  tx.execute(
    &format!(
      "INSERT INTO {} (user_id, item_id, time) VALUES (?1, ?2, ?3)",
      marker.table()
    ),
    rusqlite::params![user_id, id, now_millis()],
  )?;
  Ok(true)
}

// ─── NewsStore impl ──────────────────────────────────────────────────────────

impl NewsStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, id: String, about: Option<String>) -> Result<User> {
    let created = now_millis();
    let id_for_insert = id.clone();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "INSERT INTO users (id, created, karma, about)
                 VALUES (?1, ?2, 0, ?3)
                 ON CONFLICT (id) DO NOTHING
                 RETURNING {USER_COLUMNS}"
              ),
              rusqlite::params![id_for_insert, created, about],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    match raw {
      Some(raw) => raw.into_user(),
      None => Err(CoreError::UserExists(id).into()),
    }
  }

  async fn get_user(&self, id: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
              rusqlite::params![id],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn user_items(
    &self,
    id: String,
    kind: Option<ItemKind>,
  ) -> Result<Vec<ItemSummary>> {
    let kind_str = kind.map(|k| k.as_ref().to_owned());
    let author = id.clone();
    let sql = format!(
      "SELECT {} FROM items
       WHERE author = ?1
         AND deleted = 0
         AND (?2 IS NULL OR kind = ?2)
       ORDER BY time DESC, id DESC
       LIMIT ?3",
      item_columns(None)
    );

    let raws: Option<Vec<RawItem>> = self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row(
            "SELECT 1 FROM users WHERE id = ?1",
            rusqlite::params![author],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(None);
        }

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![author, kind_str, USER_ITEMS_LIMIT],
            RawItem::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(rows))
      })
      .await?;

    let raws = raws.ok_or(CoreError::UserNotFound(id))?;
    raws
      .into_iter()
      .map(|raw| raw.into_item().map(|item| item.summary()))
      .collect()
  }

  async fn adjust_karma(&self, id: String, delta: i64) -> Result<User> {
    let user_id = id.clone();

    // Read, clamp in Rust, then write back.
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let karma: Option<i64> = conn
          .query_row(
            "SELECT karma FROM users WHERE id = ?1",
            rusqlite::params![user_id],
            |row| row.get(0),
          )
          .optional()?;
        let Some(karma) = karma else {
          return Ok(None);
        };

        let user = conn.query_row(
          &format!(
            "UPDATE users SET karma = ?2 WHERE id = ?1 RETURNING {USER_COLUMNS}"
          ),
          rusqlite::params![user_id, clamped_add(karma, delta)],
          RawUser::from_row,
        )?;
        Ok(Some(user))
      })
      .await?;

    raw.ok_or(CoreError::UserNotFound(id))?.into_user()
  }

  // ── Items ─────────────────────────────────────────────────────────────────

  async fn insert_item(&self, input: NewItem) -> Result<Item> {
    let kind = input.kind().as_ref().to_owned();
    let time = now_millis();
    let (author, text, url, title, parent) = match input {
      NewItem::Comment { by, parent, text } => {
        (by, Some(text), None, None, Some(parent))
      }
      NewItem::Story { by, url, title, text }
      | NewItem::Job { by, url, title, text } => {
        (by, text, Some(url), title, None)
      }
    };
    let sql = format!(
      "INSERT INTO items (kind, author, time, text, url, title, parent)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
       RETURNING {}",
      item_columns(None)
    );

    let raw: RawItem = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &sql,
          rusqlite::params![kind, author, time, text, url, title, parent],
          RawItem::from_row,
        )?)
      })
      .await?;

    raw.into_item()
  }

  async fn get_item(&self, id: ItemId) -> Result<Option<ItemView>> {
    let sql = format!("SELECT {} FROM items WHERE id = ?1", item_columns(None));

    let found: Option<(RawItem, Vec<ItemId>)> = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(&sql, rusqlite::params![id], RawItem::from_row)
          .optional()?;
        let Some(raw) = raw else {
          return Ok(None);
        };

        let mut stmt =
          conn.prepare("SELECT id FROM items WHERE parent = ?1 ORDER BY id")?;
        let kids = stmt
          .query_map(rusqlite::params![id], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some((raw, kids)))
      })
      .await?;

    found
      .map(|(raw, kids)| raw.into_item().map(|item| item.into_view(kids)))
      .transpose()
  }

  async fn delete_item(&self, id: ItemId) -> Result<()> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM items WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;

    if removed == 0 {
      return Err(CoreError::ItemNotFound(id).into());
    }
    Ok(())
  }

  async fn set_item_flags(&self, id: ItemId, flags: ItemFlags) -> Result<Item> {
    let sql = format!(
      "UPDATE items
       SET deleted = COALESCE(?2, deleted),
           dead    = COALESCE(?3, dead)
       WHERE id = ?1
       RETURNING {}",
      item_columns(None)
    );

    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params![id, flags.deleted, flags.dead],
              RawItem::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.ok_or(CoreError::ItemNotFound(id))?.into_item()
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  async fn toggle_upvote(&self, id: ItemId, user_id: String) -> Result<VoteOutcome> {
    let outcome: Option<VoteOutcome> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let author: Option<String> = tx
          .query_row(
            "SELECT author FROM items WHERE id = ?1 AND deleted = 0 AND dead = 0",
            rusqlite::params![id],
            |row| row.get(0),
          )
          .optional()?;
        let Some(author) = author else {
          return Ok(None);
        };

        let upvoted = toggle_marker(&tx, Marker::Upvote, id, &user_id)?;
        let delta: i64 = if upvoted { 1 } else { -1 };

        let score: i64 = tx.query_row(
          "UPDATE items SET score = MAX(0, score + ?2) WHERE id = ?1 RETURNING score",
          rusqlite::params![id, delta],
          |row| row.get(0),
        )?;
        tx.execute(
          "UPDATE users SET karma = MAX(0, karma + ?2) WHERE id = ?1",
          rusqlite::params![author, delta],
        )?;

        tx.commit()?;
        Ok(Some(VoteOutcome { id, score, upvoted }))
      })
      .await?;

    Ok(outcome.ok_or(CoreError::ItemNotFound(id))?)
  }

  async fn has_upvoted(&self, id: ItemId, user_id: String) -> Result<bool> {
    self.is_marked(Marker::Upvote, id, user_id).await
  }

  async fn upvote_statuses(
    &self,
    user_id: String,
    ids: Vec<ItemId>,
  ) -> Result<BTreeMap<ItemId, bool>> {
    self.marked_statuses(Marker::Upvote, user_id, ids).await
  }

  // ── Favorites ─────────────────────────────────────────────────────────────

  async fn toggle_favorite(
    &self,
    id: ItemId,
    user_id: String,
  ) -> Result<FavoriteOutcome> {
    let outcome: Option<FavoriteOutcome> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists = tx
          .query_row(
            "SELECT 1 FROM items WHERE id = ?1 AND deleted = 0",
            rusqlite::params![id],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(None);
        }

        let favorited = toggle_marker(&tx, Marker::Favorite, id, &user_id)?;
        tx.commit()?;
        Ok(Some(FavoriteOutcome { id, favorited }))
      })
      .await?;

    Ok(outcome.ok_or(CoreError::ItemNotFound(id))?)
  }

  async fn has_favorited(&self, id: ItemId, user_id: String) -> Result<bool> {
    self.is_marked(Marker::Favorite, id, user_id).await
  }

  async fn favorite_statuses(
    &self,
    user_id: String,
    ids: Vec<ItemId>,
  ) -> Result<BTreeMap<ItemId, bool>> {
    self.marked_statuses(Marker::Favorite, user_id, ids).await
  }

  async fn user_favorites(&self, user_id: String) -> Result<Vec<FavoriteSummary>> {
    let sql = format!(
      "SELECT {}, f.time
       FROM favorites f
       JOIN items i ON i.id = f.item_id
       WHERE f.user_id = ?1
       ORDER BY f.time DESC, f.id DESC",
      item_columns(Some("i"))
    );

    let rows: Vec<(RawItem, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_id], |row| {
            Ok((RawItem::from_row(row)?, row.get(11)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(raw, favorited_at)| {
        Ok(FavoriteSummary {
          item:         raw.into_item()?.summary(),
          favorited_at: decode_dt(favorited_at)?,
        })
      })
      .collect()
  }

  // ── Listings ──────────────────────────────────────────────────────────────

  async fn list_items(&self, listing: Listing, page: Page) -> Result<Vec<ItemId>> {
    let kind = listing.kind().as_ref().to_owned();
    let order = if listing.ranks_by_score() {
      "score DESC, time DESC, id DESC"
    } else {
      "time DESC, id DESC"
    };
    let sql = format!(
      "SELECT id FROM items
       WHERE kind = ?1 AND deleted = 0 AND dead = 0
       ORDER BY {order}
       LIMIT ?2 OFFSET ?3"
    );

    let ids = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let ids = stmt
          .query_map(rusqlite::params![kind, page.limit, page.offset], |row| {
            row.get(0)
          })?
          .collect::<rusqlite::Result<Vec<ItemId>>>()?;
        Ok(ids)
      })
      .await?;
    Ok(ids)
  }

  // ── Games ─────────────────────────────────────────────────────────────────

  async fn submit_score(&self, input: NewGameScore) -> Result<GameScore> {
    let game_type = input.stats.kind().as_ref().to_owned();
    let stats_json = encode_stats(&input.stats)?;
    let time = now_millis();
    let user_id = input.user_id.clone();
    let score = input.score;

    let id: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO game_scores (user_id, game_type, score, time, stats_json)
           VALUES (?1, ?2, ?3, ?4, ?5)
           RETURNING id",
          rusqlite::params![user_id, game_type, score, time, stats_json],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(GameScore {
      id,
      user_id: input.user_id,
      score: input.score,
      time: decode_dt(time)?,
      stats: input.stats,
    })
  }

  async fn user_scores(&self, game: GameKind, user_id: String) -> Result<Vec<GameScore>> {
    let game_type = game.as_ref().to_owned();
    let sql = format!(
      "SELECT {SCORE_COLUMNS} FROM game_scores
       WHERE user_id = ?1 AND game_type = ?2
       ORDER BY score DESC, time ASC, id ASC
       LIMIT ?3"
    );

    let raws: Vec<RawGameScore> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![user_id, game_type, UserScores::LIMIT],
            RawGameScore::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGameScore::into_score).collect()
  }

  async fn leaderboard(&self, game: GameKind, limit: u32) -> Result<Vec<LeaderboardEntry>> {
    let game_type = game.as_ref().to_owned();

    let raws: Vec<RawLeaderboardEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT g.id, g.user_id, g.game_type, g.score, g.time, g.stats_json,
                  u.id
           FROM game_scores g
           JOIN users u ON u.id = g.user_id
           WHERE g.game_type = ?1
           ORDER BY g.score DESC, g.time ASC, g.id ASC
           LIMIT ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![game_type, limit], |row| {
            Ok(RawLeaderboardEntry {
              score:  RawGameScore::from_row(row)?,
              author: row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLeaderboardEntry::into_entry).collect()
  }
}
