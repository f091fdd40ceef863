//! Handlers for `/user` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/user/:id` | Single user |
//! | `GET`   | `/user/:id/items` | Optional `?type=story\|comment\|job` |
//! | `GET`   | `/user/:id/favorites` | Newest favorite first |
//! | `POST`  | `/user` | Body: `{"id", "about"?}`; 201, 409 if taken |
//! | `PATCH` | `/user/:id/karma` | Body: `{"delta"}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use fakernews_core::{
  item::{FavoriteSummary, ItemKind, ItemSummary},
  store::NewsStore,
  user::User,
};
use serde::Deserialize;

use crate::{
  error::ApiError,
  extract::{JsonBody, PathParams, QueryParams},
};

/// `GET /user/:id`
pub async fn get_one<S: NewsStore>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<String>,
) -> Result<Json<User>, ApiError> {
  let user = store
    .get_user(id.clone())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(user))
}

#[derive(Debug, Deserialize)]
pub struct ItemsParams {
  #[serde(rename = "type")]
  pub kind: Option<ItemKind>,
}

/// `GET /user/:id/items[?type=...]`
pub async fn items<S: NewsStore>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<String>,
  QueryParams(params): QueryParams<ItemsParams>,
) -> Result<Json<Vec<ItemSummary>>, ApiError> {
  let items = store
    .user_items(id, params.kind)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(items))
}

/// `GET /user/:id/favorites`
pub async fn favorites<S: NewsStore>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<String>,
) -> Result<Json<Vec<FavoriteSummary>>, ApiError> {
  let favorites = store.user_favorites(id).await.map_err(ApiError::store)?;
  Ok(Json(favorites))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
  pub id:    String,
  pub about: Option<String>,
}

/// `POST /user`
pub async fn create<S: NewsStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<CreateUserBody>,
) -> Result<impl IntoResponse, ApiError> {
  if body.id.trim().is_empty() {
    return Err(ApiError::BadRequest("user id must not be empty".into()));
  }
  if body.id.trim() != body.id {
    return Err(ApiError::BadRequest(
      "user id must not start or end with whitespace".into(),
    ));
  }

  let user = store
    .create_user(body.id, body.about)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(user = %user.id, "user registered");
  Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Deserialize)]
pub struct KarmaBody {
  pub delta: i64,
}

/// `PATCH /user/:id/karma`
pub async fn update_karma<S: NewsStore>(
  State(store): State<Arc<S>>,
  PathParams(id): PathParams<String>,
  JsonBody(body): JsonBody<KarmaBody>,
) -> Result<Json<User>, ApiError> {
  let user = store
    .adjust_karma(id, body.delta)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(user))
}
