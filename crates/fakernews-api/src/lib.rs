//! JSON REST API for fakernews.
//!
//! Exposes an axum [`Router`] backed by any [`fakernews_core::store::NewsStore`].
//! Handlers only validate request shape and map errors to status codes; every
//! rule about items, votes and karma lives in the store.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = fakernews_api::api_router(Arc::new(store));
//! ```

pub mod error;
pub mod extract;
pub mod games;
pub mod items;
pub mod top;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post},
};
use fakernews_core::store::NewsStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: NewsStore + 'static,
{
  Router::new()
    // Items
    .route("/item", post(items::create::<S>))
    .route(
      "/item/{id}",
      get(items::get_one::<S>)
        .delete(items::delete_one::<S>)
        .patch(items::update_flags::<S>),
    )
    .route("/item/items/{id}/vote", post(items::vote::<S>))
    .route("/item/items/{id}/upvote", get(items::upvote_status::<S>))
    .route("/item/items/upvotes/check", post(items::upvotes_check::<S>))
    .route(
      "/item/items/{id}/favorite",
      get(items::favorite_status::<S>).post(items::favorite::<S>),
    )
    .route("/item/items/favorites/check", post(items::favorites_check::<S>))
    // Users
    .route("/user", post(users::create::<S>))
    .route("/user/{id}", get(users::get_one::<S>))
    .route("/user/{id}/items", get(users::items::<S>))
    .route("/user/{id}/favorites", get(users::favorites::<S>))
    .route("/user/{id}/karma", patch(users::update_karma::<S>))
    // Listings
    .route("/top/{listing}", get(top::list::<S>))
    // Games
    .route("/games/2048", post(games::submit_2048::<S>))
    .route("/games/snake", post(games::submit_snake::<S>))
    .route("/games/flappybird", post(games::submit_flappybird::<S>))
    .route("/games/{game}/users/{user_id}", get(games::user_scores::<S>))
    .route("/games/leaderboard/{game}", get(games::leaderboard::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests;
