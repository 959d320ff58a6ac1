//! Error types for `pantry-core`.

use thiserror::Error;

use crate::id::IngredientId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("ingredient not found: {0}")]
  IngredientNotFound(IngredientId),

  #[error("invalid input: {0}")]
  Validation(String),

  #[error("ingredient name already in use: {0:?}")]
  DuplicateName(String),

  #[error(
    "adjusting ingredient {ingredient_id} by {change} would leave stock \
     below zero (current stock {stock})"
  )]
  InsufficientStock {
    ingredient_id: IngredientId,
    stock:         f64,
    change:        f64,
  },

  #[error("idempotency key {0:?} was already used for a different adjustment")]
  IdempotencyConflict(String),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error into [`Error::Storage`].
  pub fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
