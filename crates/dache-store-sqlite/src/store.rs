//! [`SqliteStore`] — the SQLite implementation of [`InquiryStore`].

use std::{path::Path, time::Duration};

use chrono::{SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;

use dache_core::{
  inquiry::{Inquiry, InquiryId, InquiryStatus, NewInquiry, RequestOrigin},
  store::{InquiryStats, InquiryStore, ListQuery, Page, StatsWindow},
};

use crate::{
  Result,
  encode::{RawInquiry, encode_dt, encode_status},
  schema::{COLUMNS, SCHEMA},
};

/// How long a statement waits on a lock held by another process.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Dache inquiry store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the underlying connection. Every clone of this store is closed
  /// with it.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  #[cfg(test)]
  pub(crate) fn conn_for_tests(&self) -> &tokio_rusqlite::Connection { &self.conn }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a `COUNT(*)` query with positional text parameters.
  async fn count(&self, sql: &'static str, params: Vec<String>) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(sql, rusqlite::params_from_iter(params), |r| r.get(0))?)
      })
      .await?;
    Ok(n.max(0) as u64)
  }
}

// ─── InquiryStore impl ───────────────────────────────────────────────────────

impl InquiryStore for SqliteStore {
  type Error = crate::Error;

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn insert(&self, input: NewInquiry, origin: RequestOrigin) -> Result<Inquiry> {
    // Truncated to the stored precision so the returned value matches a read.
    let created_at = Utc::now().trunc_subsecs(6);
    let status     = InquiryStatus::default();

    let row = input.clone();
    let ip_address = origin.ip_address.clone();
    let user_agent = origin.user_agent.clone();
    let at_str     = encode_dt(created_at);
    let status_str = encode_status(status);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contact_inquiries (
             name, birthdate, phone, email, gender, education, region,
             occupation, income, meeting1, meeting2, created_at, status,
             ip_address, user_agent
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
          rusqlite::params![
            row.name,
            row.birthdate,
            row.phone,
            row.email,
            row.gender,
            row.education,
            row.region,
            row.occupation,
            row.income,
            row.primary_meeting,
            row.secondary_meeting,
            at_str,
            status_str,
            ip_address,
            user_agent,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Inquiry {
      id: InquiryId(id),
      submission: input,
      created_at,
      status,
      origin,
    })
  }

  async fn get(&self, id: InquiryId) -> Result<Option<Inquiry>> {
    let raw: Option<RawInquiry> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COLUMNS} FROM contact_inquiries WHERE id = ?1"),
              rusqlite::params![id.0],
              RawInquiry::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawInquiry::into_inquiry).transpose()
  }

  async fn list(&self, query: &ListQuery) -> Result<Page<Inquiry>> {
    let status = query.status.map(encode_status);
    let limit  = i64::from(query.page_size);
    let offset = i64::try_from(query.offset()).unwrap_or(i64::MAX);

    let (total, raws): (i64, Vec<RawInquiry>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM contact_inquiries WHERE (?1 IS NULL OR status = ?1)",
          rusqlite::params![status],
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {COLUMNS} FROM contact_inquiries
           WHERE (?1 IS NULL OR status = ?1)
           ORDER BY created_at DESC, id DESC
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![status, limit, offset], RawInquiry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    let items = raws
      .into_iter()
      .map(RawInquiry::into_inquiry)
      .collect::<Result<_>>()?;

    Ok(Page { items, total_count: total.max(0) as u64 })
  }

  async fn update_status(&self, id: InquiryId, status: InquiryStatus) -> Result<bool> {
    let status_str = encode_status(status);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE contact_inquiries SET status = ?1 WHERE id = ?2",
          rusqlite::params![status_str, id.0],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn stats(&self, window: StatsWindow) -> Result<InquiryStats> {
    const TOTAL: &str = "SELECT COUNT(*) FROM contact_inquiries";
    const BY_STATUS: &str = "SELECT COUNT(*) FROM contact_inquiries WHERE status = ?1";
    const CREATED_BETWEEN: &str =
      "SELECT COUNT(*) FROM contact_inquiries WHERE created_at >= ?1 AND created_at < ?2";

    let status = |s: InquiryStatus| vec![encode_status(s).to_owned()];
    let day = vec![encode_dt(window.day_start), encode_dt(window.day_end)];
    let month = vec![encode_dt(window.month_start), encode_dt(window.month_end)];

    let (total, pending, contacted, completed, today, this_month) = tokio::try_join!(
      self.count(TOTAL, Vec::new()),
      self.count(BY_STATUS, status(InquiryStatus::Pending)),
      self.count(BY_STATUS, status(InquiryStatus::Contacted)),
      self.count(BY_STATUS, status(InquiryStatus::Completed)),
      self.count(CREATED_BETWEEN, day),
      self.count(CREATED_BETWEEN, month),
    )?;

    Ok(InquiryStats { total, pending, contacted, completed, today, this_month })
  }
}
