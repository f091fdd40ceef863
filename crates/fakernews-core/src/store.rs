//! The `NewsStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `fakernews-store-sqlite`). The HTTP layer depends on this abstraction, not
//! on any concrete backend.

use std::{collections::BTreeMap, future::Future};

use crate::{
  error::Classify,
  game::{GameKind, GameScore, LeaderboardEntry, NewGameScore},
  item::{
    FavoriteOutcome, FavoriteSummary, Item, ItemFlags, ItemId, ItemKind,
    ItemSummary, ItemView, NewItem, VoteOutcome,
  },
  listing::{Listing, Page},
  user::User,
};

/// Abstraction over a fakernews store backend.
///
/// Handlers are stateless; every piece of persisted state lives behind this
/// trait. All methods return `Send` futures so the trait can be used from
/// axum handlers on a multi-threaded runtime.
pub trait NewsStore: Send + Sync {
  type Error: std::error::Error + Classify + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Register a user. Fails with a conflict if `id` is taken.
  fn create_user(
    &self,
    id: String,
    about: Option<String>,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user. Returns `None` if not found.
  fn get_user(
    &self,
    id: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// The user's newest non-deleted items (at most 100), optionally of one
  /// kind. Fails with not-found if the user does not exist.
  fn user_items(
    &self,
    id: String,
    kind: Option<ItemKind>,
  ) -> impl Future<Output = Result<Vec<ItemSummary>, Self::Error>> + Send + '_;

  /// Add `delta` to the user's karma, flooring at zero.
  fn adjust_karma(
    &self,
    id: String,
    delta: i64,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  // ── Items ─────────────────────────────────────────────────────────────

  /// Persist a new item. `time` is set by the store; `score` starts at 0.
  fn insert_item(
    &self,
    input: NewItem,
  ) -> impl Future<Output = Result<Item, Self::Error>> + Send + '_;

  /// Project an item with its kids. Returns `None` if not found.
  fn get_item(
    &self,
    id: ItemId,
  ) -> impl Future<Output = Result<Option<ItemView>, Self::Error>> + Send + '_;

  /// Remove an item together with its descendants, upvotes and favorites.
  fn delete_item(
    &self,
    id: ItemId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Update the `deleted`/`dead` moderation flags.
  fn set_item_flags(
    &self,
    id: ItemId,
    flags: ItemFlags,
  ) -> impl Future<Output = Result<Item, Self::Error>> + Send + '_;

  // ── Votes ─────────────────────────────────────────────────────────────

  /// Toggle `user_id`'s upvote on an item, adjusting the item's score and
  /// its author's karma by one in the same direction.
  ///
  /// Fails with not-found if the item is missing, deleted or dead.
  fn toggle_upvote(
    &self,
    id: ItemId,
    user_id: String,
  ) -> impl Future<Output = Result<VoteOutcome, Self::Error>> + Send + '_;

  fn has_upvoted(
    &self,
    id: ItemId,
    user_id: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Upvote status for each of `ids`; ids without an upvote map to `false`.
  fn upvote_statuses(
    &self,
    user_id: String,
    ids: Vec<ItemId>,
  ) -> impl Future<Output = Result<BTreeMap<ItemId, bool>, Self::Error>> + Send + '_;

  // ── Favorites ─────────────────────────────────────────────────────────

  /// Toggle `user_id`'s favorite on an item. No score or karma effect.
  ///
  /// Fails with not-found if the item is missing or deleted.
  fn toggle_favorite(
    &self,
    id: ItemId,
    user_id: String,
  ) -> impl Future<Output = Result<FavoriteOutcome, Self::Error>> + Send + '_;

  fn has_favorited(
    &self,
    id: ItemId,
    user_id: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn favorite_statuses(
    &self,
    user_id: String,
    ids: Vec<ItemId>,
  ) -> impl Future<Output = Result<BTreeMap<ItemId, bool>, Self::Error>> + Send + '_;

  /// The user's favorites, most recently favorited first.
  fn user_favorites(
    &self,
    user_id: String,
  ) -> impl Future<Output = Result<Vec<FavoriteSummary>, Self::Error>> + Send + '_;

  // ── Listings ──────────────────────────────────────────────────────────

  /// Ids of visible (neither deleted nor dead) items in listing order.
  fn list_items(
    &self,
    listing: Listing,
    page: Page,
  ) -> impl Future<Output = Result<Vec<ItemId>, Self::Error>> + Send + '_;

  // ── Games ─────────────────────────────────────────────────────────────

  /// Append a score row. The user must exist.
  fn submit_score(
    &self,
    input: NewGameScore,
  ) -> impl Future<Output = Result<GameScore, Self::Error>> + Send + '_;

  /// The user's best [`crate::game::UserScores::LIMIT`] scores for `game`.
  fn user_scores(
    &self,
    game: GameKind,
    user_id: String,
  ) -> impl Future<Output = Result<Vec<GameScore>, Self::Error>> + Send + '_;

  /// The global top `limit` scores for `game`.
  fn leaderboard(
    &self,
    game: GameKind,
    limit: u32,
  ) -> impl Future<Output = Result<Vec<LeaderboardEntry>, Self::Error>> + Send + '_;
}
