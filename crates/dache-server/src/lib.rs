//! HTTP front for Dache: the `/api` router plus CORS, tracing, panic
//! recovery, and an optional static site.

pub mod error;
pub mod settings;

pub use error::{Error, Result};
pub use settings::ServerConfig;

use std::any::Any;

use axum::{
  Json, Router,
  extract::DefaultBodyLimit,
  http::{HeaderValue, Method, StatusCode, header},
  response::{IntoResponse, Response},
};
use dache_api::{ApiError, AppState, api_router};
use dache_core::{mirror::Mirror, store::InquiryStore};
use serde_json::json;
use tower_http::{
  catch_panic::CatchPanicLayer,
  cors::{self, AllowOrigin, CorsLayer},
  services::ServeDir,
  trace::TraceLayer,
};

/// Submissions are a handful of short strings.
const BODY_LIMIT: usize = 64 * 1024;

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application: `/api`, optional static files, and the
/// middleware stack.
pub fn app<S, M>(state: AppState<S, M>, config: &ServerConfig) -> Result<Router>
where
  S: InquiryStore + 'static,
  M: Mirror + 'static,
{
  let router = Router::new().nest("/api", api_router(state));

  let router = match config.static_dir() {
    Some(dir) => {
      tracing::info!(dir = %dir.display(), "serving static files");
      router.fallback_service(ServeDir::new(dir))
    }
    None => router.fallback(not_found),
  };

  with_middleware(router, config)
}

/// Wrap `router` in body limit, CORS, panic recovery, and request tracing.
pub fn with_middleware(router: Router, config: &ServerConfig) -> Result<Router> {
  Ok(
    router
      .layer(DefaultBodyLimit::max(BODY_LIMIT))
      .layer(cors_layer(&config.allowed_origins)?)
      .layer(CatchPanicLayer::custom(panic_response))
      .layer(TraceLayer::new_for_http()),
  )
}

async fn not_found() -> ApiError { ApiError::NotFound("no such page".to_owned()) }

// ─── CORS ─────────────────────────────────────────────────────────────────────

/// An empty list, or one containing `*`, allows any origin without
/// credentials. Otherwise only the listed origins are allowed, with
/// credentials.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
  let methods = [Method::GET, Method::POST, Method::PUT, Method::OPTIONS];
  let origins: Vec<&str> = origins
    .iter()
    .map(|o| o.trim())
    .filter(|o| !o.is_empty())
    .collect();

  if origins.is_empty() || origins.contains(&"*") {
    return Ok(
      CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(methods)
        .allow_headers(cors::Any),
    );
  }

  let list = origins
    .into_iter()
    .map(|o| HeaderValue::from_str(o).map_err(|_| Error::InvalidOrigin(o.to_owned())))
    .collect::<Result<Vec<_>>>()?;

  Ok(
    CorsLayer::new()
      .allow_origin(AllowOrigin::list(list))
      .allow_methods(methods)
      .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
      .allow_credentials(true),
  )
}

// ─── Panics ───────────────────────────────────────────────────────────────────

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
  let detail = if let Some(s) = err.downcast_ref::<String>() {
    s.as_str()
  } else if let Some(s) = err.downcast_ref::<&str>() {
    s
  } else {
    "unknown panic payload"
  };
  tracing::error!(panic = %detail, "request handler panicked");

  (
    StatusCode::INTERNAL_SERVER_ERROR,
    Json(json!({ "success": false, "message": "internal server error" })),
  )
    .into_response()
}
