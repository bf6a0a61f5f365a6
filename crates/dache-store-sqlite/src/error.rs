//! Error type for `dache-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] dache_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// No connection is open; the supervisor is still trying to establish one.
  #[error("inquiry store unavailable")]
  Unavailable,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
