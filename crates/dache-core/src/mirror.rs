//! The `Mirror` trait: a best-effort copy of each inquiry sent to an external
//! spreadsheet endpoint.
//!
//! A mirror never fails a submission. Its outcome is reported to the caller as
//! a [`MirrorResult`] next to the stored inquiry.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inquiry::{Inquiry, NewInquiry};

/// Message reported when no mirror endpoint is configured.
pub const NOT_CONFIGURED: &str = "mirror integration not configured";

/// JSON body posted to the mirror endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorPayload {
  #[serde(flatten)]
  pub submission: NewInquiry,
  pub ip_address: Option<String>,
  pub user_agent: Option<String>,
}

impl From<&Inquiry> for MirrorPayload {
  fn from(inquiry: &Inquiry) -> Self {
    Self {
      submission: inquiry.submission.clone(),
      ip_address: inquiry.origin.ip_address.clone(),
      user_agent: inquiry.origin.user_agent.clone(),
    }
  }
}

/// The mirror's acknowledgement, and the shape reported back to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorResult {
  pub success: bool,
  #[serde(default)]
  pub message: String,
}

impl MirrorResult {
  pub fn not_configured() -> Self {
    Self { success: false, message: NOT_CONFIGURED.to_owned() }
  }
}

impl From<Result<MirrorResult, MirrorError>> for MirrorResult {
  fn from(outcome: Result<MirrorResult, MirrorError>) -> Self {
    match outcome {
      Ok(ack) => ack,
      Err(MirrorError::NotConfigured) => Self::not_configured(),
      Err(e) => Self { success: false, message: e.to_string() },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MirrorError {
  #[error("mirror integration not configured")]
  NotConfigured,

  #[error("mirror request timed out")]
  Timeout,

  #[error("network error: {0}")]
  Network(String),

  #[error("mirror answered with HTTP {0}")]
  Status(u16),

  #[error("invalid response from mirror: {0}")]
  InvalidResponse(String),

  #[error("mirror rejected the submission: {0}")]
  Rejected(String),
}

/// Transport for mirror writes.
///
/// Implementations make at most one attempt and must bound their own latency.
/// An implementation without an endpoint returns
/// [`MirrorError::NotConfigured`] without touching the network.
pub trait Mirror: Send + Sync {
  /// Forward one payload. `Ok` only when the mirror confirmed with
  /// `success: true`.
  fn forward<'a>(
    &'a self,
    payload: &'a MirrorPayload,
  ) -> impl Future<Output = Result<MirrorResult, MirrorError>> + Send + 'a;
}

/// A mirror that is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disabled;

impl Mirror for Disabled {
  async fn forward(&self, _: &MirrorPayload) -> Result<MirrorResult, MirrorError> {
    Err(MirrorError::NotConfigured)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn failures_fold_into_unsuccessful_results() {
    let folded = MirrorResult::from(Err(MirrorError::Timeout));
    assert!(!folded.success);
    assert_eq!(folded.message, "mirror request timed out");

    let folded = MirrorResult::from(Err(MirrorError::NotConfigured));
    assert_eq!(folded, MirrorResult::not_configured());

    let ack = MirrorResult { success: true, message: "ok".into() };
    assert_eq!(MirrorResult::from(Ok(ack.clone())), ack);
  }

  #[test]
  fn ack_message_is_optional_on_the_wire() {
    let ack: MirrorResult = serde_json::from_str(r#"{"success":true}"#).unwrap();
    assert!(ack.success);
    assert!(ack.message.is_empty());
  }
}
