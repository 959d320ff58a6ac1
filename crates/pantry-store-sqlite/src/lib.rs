//! SQLite backend for the Pantry inventory service.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Implements every store trait from
//! [`pantry_core::store`].

mod encode;
mod ledger;
mod recipes;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
