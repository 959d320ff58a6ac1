//! Core types, store traits and services for the Pantry inventory service.
//!
//! No HTTP or database code lives here.
//! Backends implement the traits in [`store`]; the services in [`ledger`] and
//! [`capacity`] receive a backend handle at construction time.

// Trait methods spell out `Send` futures; implementors write `async fn`.
#![allow(async_fn_in_trait)]

pub mod adjustment;
pub mod capacity;
pub mod error;
pub mod id;
pub mod ingredient;
pub mod ledger;
pub mod recipe;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
