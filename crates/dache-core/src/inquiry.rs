//! Inquiry types: one contact-form submission and its lifecycle status.
//!
//! Wire names (`meeting1`, `ip_address`, ...) match the persisted column names
//! and the JSON exchanged with the site and the mirror.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{Error, ValidationError};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Store-assigned identifier. Monotonically increasing, never reused.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct InquiryId(pub i64);

impl fmt::Display for InquiryId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl FromStr for InquiryId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    s.parse()
      .map(InquiryId)
      .map_err(|_| Error::InvalidId(s.to_owned()))
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where an inquiry is in the follow-up process.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InquiryStatus {
  #[default]
  Pending,
  Contacted,
  Completed,
  Cancelled,
}

impl InquiryStatus {
  pub const ALL: [InquiryStatus; 4] =
    [Self::Pending, Self::Contacted, Self::Completed, Self::Cancelled];

  /// Parse a status string, rejecting anything outside the four known values.
  pub fn parse(s: &str) -> Result<Self, ValidationError> {
    s.parse()
      .map_err(|_| ValidationError::UnknownStatus(s.to_owned()))
  }

  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Payloads ────────────────────────────────────────────────────────────────

/// A candidate submission exactly as received. Nothing is guaranteed present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InquiryDraft {
  pub name:              Option<String>,
  pub birthdate:         Option<String>,
  pub phone:             Option<String>,
  pub email:             Option<String>,
  pub gender:            Option<String>,
  pub education:         Option<String>,
  pub region:            Option<String>,
  pub occupation:        Option<String>,
  pub income:            Option<String>,
  #[serde(rename = "meeting1")]
  pub primary_meeting:   Option<String>,
  #[serde(rename = "meeting2")]
  pub secondary_meeting: Option<String>,
}

/// A validated submission. Produced only by
/// [`InquiryDraft::validate`](crate::validate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInquiry {
  pub name:              String,
  pub birthdate:         String,
  pub phone:             String,
  pub email:             String,
  pub gender:            String,
  pub education:         String,
  pub region:            String,
  pub occupation:        String,
  pub income:            String,
  #[serde(rename = "meeting1")]
  pub primary_meeting:   String,
  #[serde(rename = "meeting2")]
  pub secondary_meeting: Option<String>,
}

/// Who submitted an inquiry, captured from the request at insert time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOrigin {
  pub ip_address: Option<String>,
  pub user_agent: Option<String>,
}

// ─── Persisted row ───────────────────────────────────────────────────────────

/// An inquiry as stored. Only `status` ever changes after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inquiry {
  pub id:         InquiryId,
  #[serde(flatten)]
  pub submission: NewInquiry,
  pub created_at: DateTime<Utc>,
  pub status:     InquiryStatus,
  #[serde(flatten)]
  pub origin:     RequestOrigin,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_parses_known_values_only() {
    for status in InquiryStatus::ALL {
      assert_eq!(InquiryStatus::parse(status.as_str()).unwrap(), status);
    }
    assert_eq!(
      InquiryStatus::parse("bogus"),
      Err(ValidationError::UnknownStatus("bogus".into()))
    );
    assert!(InquiryStatus::parse("Pending").is_err());
  }

  #[test]
  fn status_defaults_to_pending() {
    assert_eq!(InquiryStatus::default(), InquiryStatus::Pending);
    assert_eq!(InquiryStatus::Cancelled.to_string(), "cancelled");
  }

  #[test]
  fn inquiry_id_from_str() {
    assert_eq!("42".parse::<InquiryId>().unwrap(), InquiryId(42));
    assert!(matches!("abc".parse::<InquiryId>(), Err(Error::InvalidId(_))));
  }

  #[test]
  fn inquiry_serialises_with_column_names() {
    let inquiry = Inquiry {
      id:         InquiryId(7),
      submission: NewInquiry {
        name:              "Kim".into(),
        birthdate:         "1990-01-01".into(),
        phone:             "010-1234-5678".into(),
        email:             "kim@example.com".into(),
        gender:            "female".into(),
        education:         "bachelor".into(),
        region:            "seoul".into(),
        occupation:        "engineer".into(),
        income:            "50-70".into(),
        primary_meeting:   "2025-01-15T14:00".into(),
        secondary_meeting: None,
      },
      created_at: Utc::now(),
      status:     InquiryStatus::Contacted,
      origin:     RequestOrigin {
        ip_address: Some("127.0.0.1".into()),
        user_agent: None,
      },
    };

    let json = serde_json::to_value(&inquiry).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["meeting1"], "2025-01-15T14:00");
    assert!(json["meeting2"].is_null());
    assert_eq!(json["status"], "contacted");
    assert_eq!(json["ip_address"], "127.0.0.1");
  }
}
