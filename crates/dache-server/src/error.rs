//! Startup errors for the server.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("config error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("admin_username and admin_password_hash must be set together")]
  PartialAuth,

  #[error("invalid CORS origin {0:?}")]
  InvalidOrigin(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
