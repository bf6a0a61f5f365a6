//! Construction errors for `dache-mirror`. Delivery failures are
//! [`dache_core::mirror::MirrorError`]s instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid mirror url {url:?}: {reason}")]
  InvalidUrl { url: String, reason: String },

  #[error("failed to build HTTP client: {0}")]
  Client(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
