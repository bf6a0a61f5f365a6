//! HTTP Basic-auth guard for the admin routes.
//!
//! Auth is optional: when [`AppState::auth`] is `None` every request passes.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};

use crate::{AppState, error::ApiError};

/// The single admin account.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// argon2 PHC string, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

impl AuthConfig {
  /// Whether `headers` carry this account's username and password.
  pub fn admits(&self, headers: &HeaderMap) -> bool {
    let Some(creds) = Credentials::from_headers(headers) else {
      return false;
    };
    if creds.username != self.username {
      return false;
    }
    PasswordHash::new(&self.password_hash).is_ok_and(|hash| {
      Argon2::default()
        .verify_password(creds.password.as_bytes(), &hash)
        .is_ok()
    })
  }
}

/// Decoded `Authorization: Basic …` header.
struct Credentials {
  username: String,
  password: String,
}

impl Credentials {
  fn from_headers(headers: &HeaderMap) -> Option<Self> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
      return None;
    }
    let decoded = String::from_utf8(B64.decode(encoded.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some(Self {
      username: username.to_owned(),
      password: password.to_owned(),
    })
  }
}

/// Marker extractor: a handler taking `Admin` only runs for admitted callers.
pub struct Admin;

impl<S, M> FromRequestParts<AppState<S, M>> for Admin
where
  S: Send + Sync,
  M: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, M>,
  ) -> Result<Self, Self::Rejection> {
    match &state.auth {
      Some(auth) if !auth.admits(&parts.headers) => {
        tracing::warn!(path = %parts.uri.path(), "rejected admin request");
        Err(ApiError::Unauthorized)
      }
      _ => Ok(Admin),
    }
  }
}
