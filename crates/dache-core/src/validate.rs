//! Validation of candidate submissions.
//!
//! Pure: no I/O, no logging. Runs before any write.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
  ValidationError,
  inquiry::{InquiryDraft, NewInquiry},
};

/// `local@domain.tld`, each part free of whitespace and `@`.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

pub fn is_valid_email(email: &str) -> bool { EMAIL.is_match(email) }

fn required(
  field: &'static str,
  value: Option<String>,
) -> Result<String, ValidationError> {
  value
    .filter(|v| !v.is_empty())
    .ok_or(ValidationError::MissingField(field))
}

impl InquiryDraft {
  /// Check required fields in form order, then the email shape.
  ///
  /// An empty secondary meeting slot is treated as absent; everything else is
  /// passed through untouched.
  pub fn validate(self) -> Result<NewInquiry, ValidationError> {
    let inquiry = NewInquiry {
      name:              required("name", self.name)?,
      birthdate:         required("birthdate", self.birthdate)?,
      phone:             required("phone", self.phone)?,
      email:             required("email", self.email)?,
      gender:            required("gender", self.gender)?,
      education:         required("education", self.education)?,
      region:            required("region", self.region)?,
      occupation:        required("occupation", self.occupation)?,
      income:            required("income", self.income)?,
      primary_meeting:   required("meeting1", self.primary_meeting)?,
      secondary_meeting: self.secondary_meeting.filter(|v| !v.is_empty()),
    };

    if !is_valid_email(&inquiry.email) {
      return Err(ValidationError::InvalidEmail(inquiry.email));
    }

    Ok(inquiry)
  }
}
