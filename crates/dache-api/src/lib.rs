//! JSON REST API for Dache.
//!
//! Exposes an axum [`Router`] backed by any [`InquiryStore`] and [`Mirror`].
//! TLS, CORS, and static files are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", dache_api::api_router(state))
//! ```

pub mod auth;
pub mod contact;
pub mod error;
pub mod health;
pub mod origin;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, put},
};
use dache_core::{mirror::Mirror, store::InquiryStore};

pub use auth::AuthConfig;
pub use error::ApiError;

/// Shared state handed to every handler.
pub struct AppState<S, M> {
  pub store:       Arc<S>,
  pub mirror:      Arc<M>,
  /// `None` leaves the admin routes open.
  pub auth:        Option<Arc<AuthConfig>>,
  /// Reported by `/health`.
  pub environment: Arc<str>,
  /// Take the client address from `X-Forwarded-For` instead of the peer.
  pub trust_proxy: bool,
}

impl<S, M> Clone for AppState<S, M> {
  fn clone(&self) -> Self {
    Self {
      store:       Arc::clone(&self.store),
      mirror:      Arc::clone(&self.mirror),
      auth:        self.auth.clone(),
      environment: Arc::clone(&self.environment),
      trust_proxy: self.trust_proxy,
    }
  }
}

async fn not_found() -> ApiError { ApiError::NotFound("no such endpoint".to_owned()) }

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, M>(state: AppState<S, M>) -> Router<()>
where
  S: InquiryStore + 'static,
  M: Mirror + 'static,
{
  Router::new()
    .route(
      "/contact",
      get(contact::list::<S, M>).post(contact::create::<S, M>),
    )
    .route("/contact/stats", get(contact::stats::<S, M>))
    .route("/contact/{id}", get(contact::get_one::<S, M>))
    .route("/contact/{id}/status", put(contact::update_status::<S, M>))
    .route("/health", get(health::handler::<S, M>))
    .fallback(not_found)
    .with_state(state)
}
