//! Core types and trait definitions for the Dache contact intake service.
//!
//! No HTTP or database code lives here. Storage backends implement
//! [`store::InquiryStore`], mirror transports implement [`mirror::Mirror`],
//! and [`intake::record`] drives one submission through both.

pub mod error;
pub mod inquiry;
pub mod intake;
pub mod mirror;
pub mod store;
pub mod validate;

pub use error::{Error, Result, ValidationError};
