//! HTTP webhook transport for the Dache spreadsheet mirror.
//!
//! [`WebhookMirror`] implements [`dache_core::mirror::Mirror`] by POSTing each
//! inquiry as JSON to a configured URL and reading back a
//! `{"success": bool, "message": string}` acknowledgement.

pub mod error;
mod webhook;

pub use error::{Error, Result};
pub use webhook::{MirrorConfig, WebhookMirror};
