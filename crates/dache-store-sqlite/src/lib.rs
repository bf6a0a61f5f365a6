//! SQLite backend for the Dache inquiry store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. That thread is also what serialises
//! concurrent writes.

mod encode;
mod schema;
mod store;
mod supervisor;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
pub use supervisor::{SupervisedStore, Supervisor};
