//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use fakernews_core::{Classify, ErrorClass};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// An internal failure whose client-facing message is fixed.
  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a store or domain error onto its HTTP class. Internal failures keep
  /// their source so they can be logged; the rest carry their message.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Classify + Send + Sync + 'static,
  {
    match e.class() {
      ErrorClass::NotFound => Self::NotFound(e.to_string()),
      ErrorClass::Conflict => Self::Conflict(e.to_string()),
      ErrorClass::Unauthorized => Self::Unauthorized(e.to_string()),
      ErrorClass::BadRequest => Self::BadRequest(e.to_string()),
      ErrorClass::Internal => Self::Store(Box::new(e)),
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::NotFound(_) => StatusCode::NOT_FOUND,
      Self::Conflict(_) => StatusCode::CONFLICT,
      Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Internal(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<fakernews_core::Error> for ApiError {
  fn from(e: fakernews_core::Error) -> Self { Self::store(e) }
}

impl From<JsonRejection> for ApiError {
  fn from(e: JsonRejection) -> Self { Self::BadRequest(e.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(e: PathRejection) -> Self { Self::BadRequest(e.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(e: QueryRejection) -> Self { Self::BadRequest(e.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = match &self {
      ApiError::NotFound(m)
      | ApiError::Conflict(m)
      | ApiError::Unauthorized(m)
      | ApiError::BadRequest(m)
      | ApiError::Internal(m) => m.clone(),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        e.to_string()
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
