//! The `InquiryStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `dache-store-sqlite`).
//! Higher layers (`dache-api`, the intake coordinator) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::inquiry::{Inquiry, InquiryId, InquiryStatus, NewInquiry, RequestOrigin};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound on page size; larger requests are clamped.
pub const MAX_PAGE_SIZE: u32 = 100;

// ─── Listing ─────────────────────────────────────────────────────────────────

/// Parameters for [`InquiryStore::list`]. Build with [`ListQuery::new`] so the
/// page bounds are normalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
  /// 1-based page number.
  pub page:      u32,
  pub page_size: u32,
  pub status:    Option<InquiryStatus>,
}

impl ListQuery {
  /// Missing values take their defaults, `page` is at least 1 and
  /// `page_size` is clamped to `1..=MAX_PAGE_SIZE`.
  pub fn new(
    page: Option<u32>,
    page_size: Option<u32>,
    status: Option<InquiryStatus>,
  ) -> Self {
    Self {
      page: page.unwrap_or(1).max(1),
      page_size: page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE),
      status,
    }
  }

  pub fn offset(&self) -> u64 {
    u64::from(self.page - 1) * u64::from(self.page_size)
  }
}

impl Default for ListQuery {
  fn default() -> Self { Self::new(None, None, None) }
}

/// One page of results plus the number of rows matching the filter overall.
#[derive(Debug, Clone)]
pub struct Page<T> {
  pub items:       Vec<T>,
  pub total_count: u64,
}

/// Pagination block returned alongside a page of inquiries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
  pub current:     u32,
  /// Number of pages: `ceil(total_count / page_size)`.
  pub total:       u64,
  pub total_count: u64,
}

impl Pagination {
  pub fn new(query: &ListQuery, total_count: u64) -> Self {
    Self {
      current: query.page,
      total: total_count.div_ceil(u64::from(query.page_size)),
      total_count,
    }
  }
}

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Aggregate counts over the whole store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryStats {
  pub total:      u64,
  pub pending:    u64,
  pub contacted:  u64,
  pub completed:  u64,
  pub today:      u64,
  pub this_month: u64,
}

/// Half-open UTC ranges covering the current calendar day and month in some
/// time zone (the server's local zone in production).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsWindow {
  pub day_start:   DateTime<Utc>,
  pub day_end:     DateTime<Utc>,
  pub month_start: DateTime<Utc>,
  pub month_end:   DateTime<Utc>,
}

impl StatsWindow {
  /// Windows for "today" and "this month" in the server's local time zone.
  pub fn local_now() -> Self { Self::containing(Local::now()) }

  /// Windows for the calendar day and month containing `now`, measured in
  /// `now`'s own time zone.
  pub fn containing<Tz: TimeZone>(now: DateTime<Tz>) -> Self {
    let tz = now.timezone();
    let today = now.date_naive();
    let month_first = today.with_day(1).unwrap_or(today);
    let next_month_first = if month_first.month() == 12 {
      NaiveDate::from_ymd_opt(month_first.year() + 1, 1, 1)
    } else {
      NaiveDate::from_ymd_opt(month_first.year(), month_first.month() + 1, 1)
    }
    .unwrap_or(NaiveDate::MAX);
    let tomorrow = today.succ_opt().unwrap_or(NaiveDate::MAX);

    Self {
      day_start:   midnight(&tz, today),
      day_end:     midnight(&tz, tomorrow),
      month_start: midnight(&tz, month_first),
      month_end:   midnight(&tz, next_month_first),
    }
  }
}

/// The first instant of `date` in `tz`. Falls back to UTC midnight when the
/// local midnight does not exist (DST gap).
fn midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
  let naive = date.and_time(NaiveTime::MIN);
  tz.from_local_datetime(&naive)
    .earliest()
    .map(|dt| dt.with_timezone(&Utc))
    .unwrap_or_else(|| naive.and_utc())
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an inquiry store backend.
///
/// Inquiries are inserted once and never deleted. The only mutation is
/// [`update_status`](InquiryStore::update_status).
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait InquiryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Cheap connectivity probe used by health checks.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Persist a validated inquiry. The id, `created_at`, and initial `pending`
  /// status are assigned by the store.
  fn insert(
    &self,
    input: NewInquiry,
    origin: RequestOrigin,
  ) -> impl Future<Output = Result<Inquiry, Self::Error>> + Send + '_;

  /// Retrieve an inquiry by id. Returns `None` if not found.
  fn get(
    &self,
    id: InquiryId,
  ) -> impl Future<Output = Result<Option<Inquiry>, Self::Error>> + Send + '_;

  /// Newest first (by `created_at`, then id).
  fn list<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Page<Inquiry>, Self::Error>> + Send + 'a;

  /// Set the status of an existing inquiry. Returns `false` when no row has
  /// that id.
  fn update_status(
    &self,
    id: InquiryId,
    status: InquiryStatus,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Aggregate counts. `window` decides what "today" and "this month" mean.
  fn stats(
    &self,
    window: StatsWindow,
  ) -> impl Future<Output = Result<InquiryStats, Self::Error>> + Send + '_;
}

#[cfg(test)]
mod tests {
  use chrono::FixedOffset;

  use super::*;

  #[test]
  fn list_query_defaults_and_bounds() {
    let q = ListQuery::default();
    assert_eq!((q.page, q.page_size, q.status), (1, DEFAULT_PAGE_SIZE, None));
    assert_eq!(q.offset(), 0);

    let q = ListQuery::new(Some(0), Some(0), None);
    assert_eq!((q.page, q.page_size), (1, 1));

    let q = ListQuery::new(Some(3), Some(10_000), Some(InquiryStatus::Pending));
    assert_eq!(q.page_size, MAX_PAGE_SIZE);
    assert_eq!(q.offset(), 200);
  }

  #[test]
  fn pagination_rounds_page_count_up() {
    let q = ListQuery::new(Some(2), Some(1), None);
    assert_eq!(
      Pagination::new(&q, 3),
      Pagination { current: 2, total: 3, total_count: 3 }
    );

    let q = ListQuery::new(None, Some(20), None);
    assert_eq!(Pagination::new(&q, 41).total, 3);
    assert_eq!(Pagination::new(&q, 0).total, 0);
  }

  #[test]
  fn stats_window_uses_the_given_zone() {
    let kst = FixedOffset::east_opt(9 * 3600).unwrap();
    // 2026-12-31 08:30 in UTC+9 is 2026-12-30 23:30 UTC.
    let now = kst.with_ymd_and_hms(2026, 12, 31, 8, 30, 0).unwrap();
    let w = StatsWindow::containing(now);

    assert_eq!(w.day_start, Utc.with_ymd_and_hms(2026, 12, 30, 15, 0, 0).unwrap());
    assert_eq!(w.day_end, Utc.with_ymd_and_hms(2026, 12, 31, 15, 0, 0).unwrap());
    assert_eq!(w.month_start, Utc.with_ymd_and_hms(2026, 11, 30, 15, 0, 0).unwrap());
    assert_eq!(w.month_end, Utc.with_ymd_and_hms(2026, 12, 31, 15, 0, 0).unwrap());
  }
}
