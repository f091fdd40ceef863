//! Error types for `fakernews-core`.

use thiserror::Error;

use crate::item::ItemId;

/// Broad failure classes. The HTTP layer maps each class to a status code;
/// store backends classify their own errors into the same buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
  NotFound,
  Conflict,
  Unauthorized,
  BadRequest,
  Internal,
}

/// Implemented by every error type that can cross the store boundary.
pub trait Classify {
  fn class(&self) -> ErrorClass;
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("item not found: {0}")]
  ItemNotFound(ItemId),

  #[error("user not found: {0}")]
  UserNotFound(String),

  #[error("user already exists: {0}")]
  UserExists(String),

  #[error("a user id is required")]
  MissingUserId,

  #[error("unsupported vote type: {0}")]
  UnsupportedVote(String),

  #[error("Invalid game type. Valid options: 2048, snake, flappybird")]
  UnknownGame(String),

  #[error("unknown item type discriminant: {0:?}")]
  UnknownItemType(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Classify for Error {
  fn class(&self) -> ErrorClass {
    match self {
      Self::ItemNotFound(_) | Self::UserNotFound(_) => ErrorClass::NotFound,
      Self::UserExists(_) => ErrorClass::Conflict,
      Self::MissingUserId => ErrorClass::Unauthorized,
      Self::UnsupportedVote(_) | Self::UnknownGame(_) => ErrorClass::BadRequest,
      Self::UnknownItemType(_) | Self::Serialization(_) => ErrorClass::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
