//! Intake: validate, store, then mirror.
//!
//! The store write decides success. The mirror write starts only after the
//! row is durable, is attempted once, and its outcome rides along in the
//! [`Receipt`] whatever it is.

use thiserror::Error;

use crate::{
  ValidationError,
  inquiry::{Inquiry, InquiryDraft, RequestOrigin},
  mirror::{Mirror, MirrorError, MirrorPayload, MirrorResult},
  store::InquiryStore,
};

/// A successfully stored inquiry and what the mirror made of it.
#[derive(Debug, Clone)]
pub struct Receipt {
  pub inquiry: Inquiry,
  pub mirror:  MirrorResult,
}

#[derive(Debug, Error)]
pub enum IntakeError<E> {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("store error: {0}")]
  Storage(#[source] E),
}

/// Record one submission.
///
/// Nothing is written when `draft` fails validation, and the mirror is not
/// contacted when the insert fails.
pub async fn record<S, M>(
  store: &S,
  mirror: &M,
  draft: InquiryDraft,
  origin: RequestOrigin,
) -> Result<Receipt, IntakeError<S::Error>>
where
  S: InquiryStore,
  M: Mirror,
{
  let input = draft.validate().inspect_err(|e| {
    tracing::warn!(error = %e, "rejected inquiry");
  })?;

  let inquiry = store.insert(input, origin).await.map_err(|e| {
    tracing::error!(error = %e, "failed to store inquiry");
    IntakeError::Storage(e)
  })?;
  tracing::info!(id = %inquiry.id, name = %inquiry.submission.name, "inquiry recorded");

  let payload = MirrorPayload::from(&inquiry);
  let outcome = mirror.forward(&payload).await;
  match &outcome {
    Ok(ack) => {
      tracing::info!(id = %inquiry.id, message = %ack.message, "inquiry mirrored");
    }
    Err(MirrorError::NotConfigured) => {
      tracing::debug!(id = %inquiry.id, "mirror not configured; skipped");
    }
    Err(e) => {
      tracing::warn!(id = %inquiry.id, error = %e, "mirror write failed");
    }
  }

  Ok(Receipt { inquiry, mirror: outcome.into() })
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use chrono::Utc;

  use super::*;
  use crate::{
    inquiry::{InquiryId, InquiryStatus, NewInquiry},
    mirror::Disabled,
    store::{InquiryStats, ListQuery, Page, StatsWindow},
    validate::tests::complete_draft,
  };

  #[derive(Debug, Error)]
  #[error("disk full")]
  struct DiskFull;

  /// Vec-backed store; only what intake touches is implemented.
  #[derive(Default)]
  struct MemoryStore {
    rows:      Mutex<Vec<Inquiry>>,
    read_only: bool,
  }

  impl InquiryStore for MemoryStore {
    type Error = DiskFull;

    async fn ping(&self) -> Result<(), DiskFull> { Ok(()) }

    async fn insert(
      &self,
      input: NewInquiry,
      origin: RequestOrigin,
    ) -> Result<Inquiry, DiskFull> {
      if self.read_only {
        return Err(DiskFull);
      }
      let mut rows = self.rows.lock().unwrap();
      let inquiry = Inquiry {
        id: InquiryId(rows.len() as i64 + 1),
        submission: input,
        created_at: Utc::now(),
        status: InquiryStatus::Pending,
        origin,
      };
      rows.push(inquiry.clone());
      Ok(inquiry)
    }

    async fn get(&self, _: InquiryId) -> Result<Option<Inquiry>, DiskFull> { unimplemented!() }
    async fn list(&self, _: &ListQuery) -> Result<Page<Inquiry>, DiskFull> { unimplemented!() }
    async fn update_status(&self, _: InquiryId, _: InquiryStatus) -> Result<bool, DiskFull> { unimplemented!() }
    async fn stats(&self, _: StatsWindow) -> Result<InquiryStats, DiskFull> { unimplemented!() }
  }

  /// Records every payload and answers with a fixed outcome.
  struct ScriptedMirror {
    seen:   Mutex<Vec<MirrorPayload>>,
    answer: Result<MirrorResult, MirrorError>,
  }

  impl ScriptedMirror {
    fn new(answer: Result<MirrorResult, MirrorError>) -> Self {
      Self { seen: Mutex::new(Vec::new()), answer }
    }

    fn calls(&self) -> usize { self.seen.lock().unwrap().len() }
  }

  impl Mirror for ScriptedMirror {
    async fn forward(&self, payload: &MirrorPayload) -> Result<MirrorResult, MirrorError> {
      self.seen.lock().unwrap().push(payload.clone());
      self.answer.clone()
    }
  }

  fn origin() -> RequestOrigin {
    RequestOrigin {
      ip_address: Some("203.0.113.9".into()),
      user_agent: Some("test-agent".into()),
    }
  }

  #[tokio::test]
  async fn stores_then_mirrors_with_origin() {
    let store = MemoryStore::default();
    let mirror = ScriptedMirror::new(Ok(MirrorResult {
      success: true,
      message: "Data successfully added".into(),
    }));

    let receipt = record(&store, &mirror, complete_draft(), origin()).await.unwrap();

    assert_eq!(receipt.inquiry.id, InquiryId(1));
    assert!(receipt.mirror.success);
    let seen = mirror.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].ip_address.as_deref(), Some("203.0.113.9"));
    assert_eq!(seen[0].user_agent.as_deref(), Some("test-agent"));
    assert_eq!(seen[0].submission, receipt.inquiry.submission);
  }

  #[tokio::test]
  async fn ids_increase_across_submissions() {
    let store = MemoryStore::default();
    let mut last = InquiryId(0);
    for _ in 0..5 {
      let receipt = record(&store, &Disabled, complete_draft(), origin()).await.unwrap();
      assert!(receipt.inquiry.id > last);
      last = receipt.inquiry.id;
    }
  }

  #[tokio::test]
  async fn invalid_draft_writes_nothing() {
    let store = MemoryStore::default();
    let mirror = ScriptedMirror::new(Err(MirrorError::Timeout));
    let mut draft = complete_draft();
    draft.phone = None;

    let err = record(&store, &mirror, draft, origin()).await.unwrap_err();

    assert!(matches!(err, IntakeError::Validation(ValidationError::MissingField("phone"))));
    assert!(store.rows.lock().unwrap().is_empty());
    assert_eq!(mirror.calls(), 0);
  }

  #[tokio::test]
  async fn storage_failure_skips_the_mirror() {
    let store = MemoryStore { read_only: true, ..Default::default() };
    let mirror = ScriptedMirror::new(Err(MirrorError::Timeout));

    let err = record(&store, &mirror, complete_draft(), origin()).await.unwrap_err();

    assert!(matches!(err, IntakeError::Storage(DiskFull)));
    assert_eq!(mirror.calls(), 0);
  }

  #[tokio::test]
  async fn mirror_failure_does_not_fail_intake() {
    let store = MemoryStore::default();
    let mirror = ScriptedMirror::new(Err(MirrorError::Network("connection refused".into())));

    let receipt = record(&store, &mirror, complete_draft(), origin()).await.unwrap();

    assert!(!receipt.mirror.success);
    assert!(receipt.mirror.message.contains("connection refused"));
    assert_eq!(store.rows.lock().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn disabled_mirror_reports_not_configured() {
    let store = MemoryStore::default();
    let receipt = record(&store, &Disabled, complete_draft(), origin()).await.unwrap();
    assert_eq!(receipt.mirror, MirrorResult::not_configured());
  }
}
