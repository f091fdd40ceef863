//! Handlers for `/games` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/games/2048` | Body: [`Submit2048`] |
//! | `POST` | `/games/snake` | Body: [`SubmitSnake`] |
//! | `POST` | `/games/flappybird` | Body: [`SubmitFlappyBird`] |
//! | `GET`  | `/games/:game/users/:userId` | Best ten scores |
//! | `GET`  | `/games/leaderboard/:game` | `?limit` (default 10, max 100) |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use fakernews_core::{
  game::{
    GameKind, GameScore, Leaderboard, NewGameScore, Submit2048, SubmitFlappyBird,
    SubmitSnake, UserScores,
  },
  listing::Page,
  store::NewsStore,
};
use serde::Deserialize;

use crate::{
  error::ApiError,
  extract::{JsonBody, PathParams, QueryParams},
};

const LEADERBOARD_DEFAULT_LIMIT: u32 = 10;

// ─── Submit ──────────────────────────────────────────────────────────────────

async fn submit<S: NewsStore>(
  store: &S,
  score: NewGameScore,
) -> Result<(StatusCode, Json<GameScore>), ApiError> {
  let game = score.stats.kind();
  let user = score.user_id.clone();
  match store.submit_score(score).await {
    Ok(row) => Ok((StatusCode::CREATED, Json(row))),
    Err(e) => {
      tracing::error!(error = %e, %game, %user, "failed to create score");
      Err(ApiError::Internal(format!(
        "Failed to create {} score",
        game.label()
      )))
    }
  }
}

/// `POST /games/2048`
pub async fn submit_2048<S: NewsStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<Submit2048>,
) -> Result<impl IntoResponse, ApiError> {
  submit(store.as_ref(), body.into()).await
}

/// `POST /games/snake`
pub async fn submit_snake<S: NewsStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<SubmitSnake>,
) -> Result<impl IntoResponse, ApiError> {
  submit(store.as_ref(), body.into()).await
}

/// `POST /games/flappybird`
pub async fn submit_flappybird<S: NewsStore>(
  State(store): State<Arc<S>>,
  JsonBody(body): JsonBody<SubmitFlappyBird>,
) -> Result<impl IntoResponse, ApiError> {
  submit(store.as_ref(), body.into()).await
}

// ─── Read ────────────────────────────────────────────────────────────────────

/// `GET /games/:game/users/:userId`
pub async fn user_scores<S: NewsStore>(
  State(store): State<Arc<S>>,
  PathParams((game, user_id)): PathParams<(String, String)>,
) -> Result<Json<UserScores>, ApiError> {
  let game = GameKind::parse(&game)?;
  let scores = store
    .user_scores(game, user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(UserScores::new(game, scores)))
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardParams {
  pub limit: Option<i64>,
}

/// `GET /games/leaderboard/:game[?limit=..]`
pub async fn leaderboard<S: NewsStore>(
  State(store): State<Arc<S>>,
  PathParams(game): PathParams<String>,
  QueryParams(params): QueryParams<LeaderboardParams>,
) -> Result<Json<Leaderboard>, ApiError> {
  let game = GameKind::parse(&game)?;
  let limit =
    Page::with_default(params.limit, None, LEADERBOARD_DEFAULT_LIMIT).limit;

  let scores = store
    .leaderboard(game, limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(Leaderboard { scores }))
}
