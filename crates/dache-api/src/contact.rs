//! Handlers for `/contact` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/contact` | Public intake form; JSON or form-encoded |
//! | `GET`  | `/contact` | `?page=&limit=&status=`; admin |
//! | `GET`  | `/contact/stats` | admin |
//! | `GET`  | `/contact/{id}` | 404 if not found; admin |
//! | `PUT`  | `/contact/{id}/status` | Body: `{"status":"contacted"}`; admin |

use axum::{
  Form, Json,
  extract::{
    FromRequest, Path, Query, Request, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::header::CONTENT_TYPE,
};
use dache_core::{
  ValidationError,
  inquiry::{InquiryDraft, InquiryId, InquiryStatus},
  intake,
  mirror::Mirror,
  store::{InquiryStore, ListQuery, Pagination, StatsWindow},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, auth::Admin, error::ApiError, origin::ClientOrigin};

fn parse_id(raw: &str) -> Result<InquiryId, ApiError> {
  raw
    .parse()
    .map_err(|_| ApiError::NotFound(format!("inquiry {raw}")))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// A submission body, either JSON or an HTML form post
/// (`application/x-www-form-urlencoded`).
pub struct Submission(pub InquiryDraft);

impl<S: Send + Sync> FromRequest<S> for Submission {
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let is_form = req
      .headers()
      .get(CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .is_some_and(|ct| {
        ct.trim_start()
          .to_ascii_lowercase()
          .starts_with("application/x-www-form-urlencoded")
      });

    if is_form {
      let Form(draft) = Form::<InquiryDraft>::from_request(req, state).await?;
      Ok(Submission(draft))
    } else {
      let Json(draft) = Json::<InquiryDraft>::from_request(req, state).await?;
      Ok(Submission(draft))
    }
  }
}

/// `POST /contact`
pub async fn create<S, M>(
  State(state): State<AppState<S, M>>,
  ClientOrigin(origin): ClientOrigin,
  Submission(draft): Submission,
) -> Result<Json<Value>, ApiError>
where
  S: InquiryStore,
  M: Mirror,
{
  let receipt = intake::record(&*state.store, &*state.mirror, draft, origin).await?;

  Ok(Json(json!({
    "success": true,
    "message": "inquiry received",
    "inquiryId": receipt.inquiry.id,
    "mirrorResult": receipt.mirror,
  })))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub page:   Option<u32>,
  #[serde(alias = "pageSize")]
  pub limit:  Option<u32>,
  pub status: Option<String>,
}

impl ListParams {
  fn into_query(self) -> Result<ListQuery, ValidationError> {
    let status = match self.status.as_deref() {
      None | Some("") => None,
      Some(s) => Some(InquiryStatus::parse(s)?),
    };
    Ok(ListQuery::new(self.page, self.limit, status))
  }
}

/// `GET /contact[?page=&limit=&status=]`
pub async fn list<S, M>(
  _: Admin,
  State(state): State<AppState<S, M>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: InquiryStore,
  M: Mirror,
{
  let Query(params) = params?;
  let query = params.into_query()?;

  let page = state.store.list(&query).await.map_err(ApiError::store)?;
  let pagination = Pagination::new(&query, page.total_count);

  Ok(Json(json!({
    "success": true,
    "data": {
      "inquiries": page.items,
      "pagination": pagination,
    },
  })))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /contact/{id}`
pub async fn get_one<S, M>(
  _: Admin,
  State(state): State<AppState<S, M>>,
  Path(raw): Path<String>,
) -> Result<Json<Value>, ApiError>
where
  S: InquiryStore,
  M: Mirror,
{
  let id = parse_id(&raw)?;
  let inquiry = state
    .store
    .get(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("inquiry {id}")))?;

  Ok(Json(json!({ "success": true, "data": inquiry })))
}

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  #[serde(default)]
  pub status: Option<String>,
}

/// `PUT /contact/{id}/status` — body: `{"status":"contacted"}`
pub async fn update_status<S, M>(
  _: Admin,
  State(state): State<AppState<S, M>>,
  Path(raw): Path<String>,
  body: Result<Json<StatusBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: InquiryStore,
  M: Mirror,
{
  let Json(body) = body?;
  let status = match body.status.as_deref() {
    None | Some("") => return Err(ValidationError::MissingField("status").into()),
    Some(s) => InquiryStatus::parse(s)?,
  };
  let id = parse_id(&raw)?;

  let updated = state
    .store
    .update_status(id, status)
    .await
    .map_err(ApiError::store)?;
  if !updated {
    return Err(ApiError::NotFound(format!("inquiry {id}")));
  }

  tracing::info!(%id, %status, "inquiry status updated");
  Ok(Json(json!({
    "success": true,
    "message": format!("status updated to {status}"),
  })))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// `GET /contact/stats` — "today" and "this month" use the server's local
/// time zone.
pub async fn stats<S, M>(
  _: Admin,
  State(state): State<AppState<S, M>>,
) -> Result<Json<Value>, ApiError>
where
  S: InquiryStore,
  M: Mirror,
{
  let stats = state
    .store
    .stats(StatsWindow::local_now())
    .await
    .map_err(ApiError::store)?;

  Ok(Json(json!({ "success": true, "data": stats })))
}
