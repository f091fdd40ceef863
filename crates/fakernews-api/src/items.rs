//! Handlers for `/item` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/item/:id` | Projection or tombstone |
//! | `POST`   | `/item` | Body: [`NewItem`]; returns 201 + projection |
//! | `DELETE` | `/item/:id` | Cascades to descendants; 204 |
//! | `PATCH`  | `/item/:id` | Body: [`ItemFlags`] |
//! | `POST`   | `/item/items/:id/vote` | Body: [`VoteBody`] |
//! | `GET`    | `/item/items/:id/upvote` | `?userId` required |
//! | `POST`   | `/item/items/upvotes/check` | Body: [`StatusCheckBody`] |
//! | `POST`   | `/item/items/:id/favorite` | Body: [`FavoriteBody`] |
//! | `GET`    | `/item/items/:id/favorite` | `?userId` required |
//! | `POST`   | `/item/items/favorites/check` | Body: [`StatusCheckBody`] |

use std::{collections::BTreeMap, sync::Arc};

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use fakernews_core::{
  item::{
    FavoriteOutcome, ItemFlags, ItemId, ItemView, NewItem, VoteDirection,
    VoteOutcome,
  },
  store::NewsStore,
  user::require_user,
};
use serde::{Deserialize, Serialize};

use crate::{
  error::ApiError,
  extract::{JsonBody, PathParams, QueryParams},
};

fn not_found(id: ItemId) -> ApiError {
  ApiError::NotFound(format!("item {id} not found"))
}

// ─── Read / write ────────────────────────────────────────────────────────────

/// `GET /item/:id`
pub async fn get_one<S: NewsStore>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<ItemId>,
) -> Result<Json<ItemView>, ApiError> {
  let item = store
    .get_item(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(item))
}

/// `POST /item`: returns 201 + the new item's projection.
pub async fn create<S: NewsStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<NewItem>,
) -> Result<impl IntoResponse, ApiError> {
  let item = store.insert_item(body).await.map_err(ApiError::store)?;
  tracing::debug!(id = item.id, kind = %item.kind, by = %item.by, "item created");
  Ok((StatusCode::CREATED, Json(item.into_view(Vec::new()))))
}

/// `DELETE /item/:id`
pub async fn delete_one<S: NewsStore>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<ItemId>,
) -> Result<StatusCode, ApiError> {
  store.delete_item(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /item/:id`: body `{"deleted"?: bool, "dead"?: bool}`.
pub async fn update_flags<S: NewsStore>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<ItemId>,
  JsonBody(flags): JsonBody<ItemFlags>,
) -> Result<Json<ItemView>, ApiError> {
  store
    .set_item_flags(id, flags)
    .await
    .map_err(ApiError::store)?;
  let item = store
    .get_item(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(item))
}

// ─── Votes ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteBody {
  #[serde(rename = "type")]
  pub direction: VoteDirection,
  #[serde(default)]
  pub user_id:   String,
}

/// `POST /item/items/:id/vote`
pub async fn vote<S: NewsStore>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<ItemId>,
  JsonBody(body): JsonBody<VoteBody>,
) -> Result<Json<VoteOutcome>, ApiError> {
  require_user(&body.user_id)?;
  body.direction.require_up()?;

  let outcome = store
    .toggle_upvote(id, body.user_id.clone())
    .await
    .map_err(ApiError::store)?;
  tracing::debug!(
    id,
    user = %body.user_id,
    upvoted = outcome.upvoted,
    score = outcome.score,
    "vote toggled"
  );
  Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserParams {
  #[serde(default)]
  pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpvoteStatus {
  pub upvoted: bool,
}

/// `GET /item/items/:id/upvote?userId=<id>`
pub async fn upvote_status<S: NewsStore>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<ItemId>,
  QueryParams(params): QueryParams<UserParams>,
) -> Result<Json<UpvoteStatus>, ApiError> {
  require_user(&params.user_id)?;
  let upvoted = store
    .has_upvoted(id, params.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(UpvoteStatus { upvoted }))
}

/// Body of the batch status checks.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCheckBody {
  #[serde(default)]
  pub user_id:  String,
  pub item_ids: Vec<ItemId>,
}

/// `POST /item/items/upvotes/check`: returns `{"<id>": bool, ...}`.
pub async fn upvotes_check<S: NewsStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<StatusCheckBody>,
) -> Result<Json<BTreeMap<ItemId, bool>>, ApiError> {
  require_user(&body.user_id)?;
  let statuses = store
    .upvote_statuses(body.user_id, body.item_ids)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(statuses))
}

// ─── Favorites ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteBody {
  #[serde(default)]
  pub user_id: String,
}

/// `POST /item/items/:id/favorite`
pub async fn favorite<S: NewsStore>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<ItemId>,
  JsonBody(body): JsonBody<FavoriteBody>,
) -> Result<Json<FavoriteOutcome>, ApiError> {
  require_user(&body.user_id)?;
  let outcome = store
    .toggle_favorite(id, body.user_id.clone())
    .await
    .map_err(ApiError::store)?;
  tracing::debug!(
    id,
    user = %body.user_id,
    favorited = outcome.favorited,
    "favorite toggled"
  );
  Ok(Json(outcome))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FavoriteStatus {
  pub favorited: bool,
}

/// `GET /item/items/:id/favorite?userId=<id>`
pub async fn favorite_status<S: NewsStore>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<ItemId>,
  QueryParams(params): QueryParams<UserParams>,
) -> Result<Json<FavoriteStatus>, ApiError> {
  require_user(&params.user_id)?;
  let favorited = store
    .has_favorited(id, params.user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(FavoriteStatus { favorited }))
}

/// `POST /item/items/favorites/check`
pub async fn favorites_check<S: NewsStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<StatusCheckBody>,
) -> Result<Json<BTreeMap<ItemId, bool>>, ApiError> {
  require_user(&body.user_id)?;
  let statuses = store
    .favorite_statuses(body.user_id, body.item_ids)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(statuses))
}
