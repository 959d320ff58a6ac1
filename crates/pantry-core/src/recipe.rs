//! Recipes: per-unit ingredient requirements for a product.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  id::{IngredientId, ProductId, RecipeItemId},
};

/// The amount of one ingredient needed to produce one unit of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeItem {
  pub id:            RecipeItemId,
  pub product_id:    ProductId,
  pub ingredient_id: IngredientId,
  pub unit:          String,
  /// Required amount per produced unit. Zero or negative marks the line as
  /// non-binding.
  pub amount:        f64,
  pub notes:         Option<String>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

/// A recipe line before it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecipeItem {
  pub ingredient_id: IngredientId,
  pub unit:          String,
  pub amount:        f64,
  #[serde(default)]
  pub notes:         Option<String>,
}

impl NewRecipeItem {
  pub fn new(
    ingredient_id: IngredientId,
    unit: impl Into<String>,
    amount: f64,
  ) -> Self {
    Self { ingredient_id, unit: unit.into(), amount, notes: None }
  }

  pub fn validate(&self) -> Result<()> {
    if self.unit.trim().is_empty() {
      return Err(Error::Validation("unit must not be blank".into()));
    }
    if !self.amount.is_finite() {
      return Err(Error::Validation("amount must be a finite number".into()));
    }
    Ok(())
  }
}

/// Consistency discipline for a multi-row write.
///
/// Stock adjustment is always atomic and takes no mode; only catalogue
/// creation of recipe lines chooses one.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
  /// All lines commit together or none do.
  Atomic,
  /// Each line is written independently; failures are logged and reported
  /// and the remaining lines are still attempted.
  #[default]
  BestEffort,
}

/// A recipe line that was not written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedRecipeLine {
  /// Position of the line in the submitted list.
  pub index:         usize,
  pub ingredient_id: IngredientId,
  pub error:         String,
}

/// Result of [`RecipeStore::add_recipe`](crate::store::RecipeStore::add_recipe).
///
/// Under [`WriteMode::Atomic`] either `failed` is empty or `inserted` is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeWriteReport {
  pub inserted: Vec<RecipeItem>,
  pub failed:   Vec<FailedRecipeLine>,
}

impl RecipeWriteReport {
  pub fn is_complete(&self) -> bool { self.failed.is_empty() }
}
