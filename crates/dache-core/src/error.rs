//! Error types for `dache-core`.

use thiserror::Error;

/// A candidate payload or parameter failed validation. Maps to HTTP 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("invalid email address: {0:?}")]
  InvalidEmail(String),

  #[error("unknown inquiry status: {0:?}")]
  UnknownStatus(String),
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("invalid inquiry id: {0:?}")]
  InvalidId(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
