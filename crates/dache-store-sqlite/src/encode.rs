//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings with microsecond
//! precision, so string comparison in SQL is chronological comparison.

use chrono::{DateTime, SecondsFormat, Utc};
use dache_core::inquiry::{
  Inquiry, InquiryId, InquiryStatus, NewInquiry, RequestOrigin,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── InquiryStatus ───────────────────────────────────────────────────────────

pub fn encode_status(s: InquiryStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<InquiryStatus> {
  Ok(InquiryStatus::parse(s).map_err(dache_core::Error::from)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `contact_inquiries` row, in
/// [`COLUMNS`](crate::schema::COLUMNS) order.
pub struct RawInquiry {
  pub id:         i64,
  pub name:       String,
  pub birthdate:  String,
  pub phone:      String,
  pub email:      String,
  pub gender:     String,
  pub education:  String,
  pub region:     String,
  pub occupation: String,
  pub income:     String,
  pub meeting1:   String,
  pub meeting2:   Option<String>,
  pub created_at: String,
  pub status:     String,
  pub ip_address: Option<String>,
  pub user_agent: Option<String>,
}

impl RawInquiry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      birthdate:  row.get(2)?,
      phone:      row.get(3)?,
      email:      row.get(4)?,
      gender:     row.get(5)?,
      education:  row.get(6)?,
      region:     row.get(7)?,
      occupation: row.get(8)?,
      income:     row.get(9)?,
      meeting1:   row.get(10)?,
      meeting2:   row.get(11)?,
      created_at: row.get(12)?,
      status:     row.get(13)?,
      ip_address: row.get(14)?,
      user_agent: row.get(15)?,
    })
  }

  pub fn into_inquiry(self) -> Result<Inquiry> {
    Ok(Inquiry {
      id:         InquiryId(self.id),
      submission: NewInquiry {
        name:              self.name,
        birthdate:         self.birthdate,
        phone:             self.phone,
        email:             self.email,
        gender:            self.gender,
        education:         self.education,
        region:            self.region,
        occupation:        self.occupation,
        income:            self.income,
        primary_meeting:   self.meeting1,
        secondary_meeting: self.meeting2,
      },
      created_at: decode_dt(&self.created_at)?,
      status:     decode_status(&self.status)?,
      origin:     RequestOrigin {
        ip_address: self.ip_address,
        user_agent: self.user_agent,
      },
    })
  }
}
