//! Startup error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(
    "admin_username and admin_password_hash must be set together \
     (only {present} is set)"
  )]
  IncompleteAdmin { present: &'static str },
}
