//! `GET /health` — liveness plus a store connectivity probe.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use dache_core::store::InquiryStore;
use serde_json::json;

use crate::AppState;

/// 200 when the store answers a ping, 503 otherwise.
pub async fn handler<S, M>(State(state): State<AppState<S, M>>) -> Response
where
  S: InquiryStore,
  M: Send + Sync,
{
  let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

  match state.store.ping().await {
    Ok(()) => (
      StatusCode::OK,
      Json(json!({
        "success": true,
        "status": "healthy",
        "timestamp": timestamp,
        "environment": &*state.environment,
        "database": "connected",
      })),
    )
      .into_response(),
    Err(e) => {
      tracing::warn!(error = %e, "health check failed");
      (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
          "success": false,
          "status": "unhealthy",
          "timestamp": timestamp,
          "environment": &*state.environment,
          "database": "disconnected",
          "error": e.to_string(),
        })),
      )
        .into_response()
    }
  }
}
