//! Supervised connection handling.
//!
//! The process owns one connection. A background task opens it, retries at a
//! fixed interval while the file cannot be opened, and pings it at the same
//! interval once connected. A failed ping closes the connection and the task
//! goes back to reconnecting. Until a connection exists, every store call fails
//! with [`Error::Unavailable`].

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use tokio::{sync::RwLock, task::JoinHandle};

use dache_core::{
  inquiry::{Inquiry, InquiryId, InquiryStatus, NewInquiry, RequestOrigin},
  store::{InquiryStats, InquiryStore, ListQuery, Page, StatsWindow},
};

use crate::{Error, Result, SqliteStore};

type Slot = Arc<RwLock<Option<SqliteStore>>>;

/// An [`InquiryStore`] whose connection is managed by a [`Supervisor`].
///
/// Cloning is cheap; all clones share the same slot.
#[derive(Clone)]
pub struct SupervisedStore {
  slot: Slot,
}

/// Handle to the background task. Dropping it leaves the task running; call
/// [`Supervisor::shutdown`] to stop it and close the connection.
pub struct Supervisor {
  task: JoinHandle<()>,
  slot: Slot,
}

impl SupervisedStore {
  /// Start supervising a store file at `path`. The first connection attempt
  /// happens immediately on the spawned task.
  pub fn spawn(path: impl Into<PathBuf>, interval: Duration) -> (Self, Supervisor) {
    let slot: Slot = Arc::default();
    let task = tokio::spawn(supervise(slot.clone(), path.into(), interval));
    (Self { slot: slot.clone() }, Supervisor { task, slot })
  }

  pub async fn is_connected(&self) -> bool { self.slot.read().await.is_some() }

  async fn current(&self) -> Result<SqliteStore> {
    let current = self.slot.read().await.clone();
    current.ok_or(Error::Unavailable)
  }
}

impl Supervisor {
  /// Stop the background task and close the connection, if one is open.
  pub async fn shutdown(self) -> Result<()> {
    self.task.abort();
    // The task only ever ends by cancellation.
    let _ = self.task.await;

    let store = self.slot.write().await.take();
    if let Some(store) = store {
      store.close().await?;
      tracing::info!("inquiry store closed");
    }
    Ok(())
  }
}

async fn connect(path: &Path) -> Result<SqliteStore> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    tokio::fs::create_dir_all(parent).await?;
  }
  SqliteStore::open(path).await
}

/// Empty the slot and close the connection it held.
async fn disconnect(slot: &Slot) {
  let Some(stale) = slot.write().await.take() else { return };
  if let Err(e) = stale.close().await {
    tracing::warn!(error = %e, "failed to close stale inquiry store connection");
  }
}

async fn supervise(slot: Slot, path: PathBuf, interval: Duration) {
  loop {
    let current = slot.read().await.clone();
    match current {
      None => match connect(&path).await {
        Ok(store) => {
          tracing::info!(path = %path.display(), "connected to inquiry store");
          *slot.write().await = Some(store);
        }
        Err(e) => {
          tracing::warn!(
            path = %path.display(),
            error = %e,
            retry_in = ?interval,
            "cannot open inquiry store; will retry",
          );
        }
      },
      Some(store) => {
        if let Err(e) = store.ping().await {
          tracing::error!(error = %e, "lost inquiry store connection; reconnecting");
          disconnect(&slot).await;
        }
      }
    }
    tokio::time::sleep(interval).await;
  }
}

// ─── InquiryStore impl ───────────────────────────────────────────────────────

impl InquiryStore for SupervisedStore {
  type Error = Error;

  async fn ping(&self) -> Result<()> { self.current().await?.ping().await }

  async fn insert(&self, input: NewInquiry, origin: RequestOrigin) -> Result<Inquiry> {
    self.current().await?.insert(input, origin).await
  }

  async fn get(&self, id: InquiryId) -> Result<Option<Inquiry>> {
    self.current().await?.get(id).await
  }

  async fn list(&self, query: &ListQuery) -> Result<Page<Inquiry>> {
    self.current().await?.list(query).await
  }

  async fn update_status(&self, id: InquiryId, status: InquiryStatus) -> Result<bool> {
    self.current().await?.update_status(id, status).await
  }

  async fn stats(&self, window: StatsWindow) -> Result<InquiryStats> {
    self.current().await?.stats(window).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn disconnect_closes_the_held_connection() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path().join("dache.db")).await.unwrap();
    let outside = store.clone();
    let slot: Slot = Arc::new(RwLock::new(Some(store)));

    disconnect(&slot).await;

    assert!(slot.read().await.is_none());
    assert!(outside.ping().await.is_err());
  }

  #[tokio::test]
  async fn disconnect_on_empty_slot_is_a_no_op() {
    let slot: Slot = Arc::default();
    disconnect(&slot).await;
    assert!(slot.read().await.is_none());
  }
}
