//! The Capacity Projector: how many units of a product current stock allows.
//!
//! Production is limited by the scarcest required input. For every binding
//! recipe line the projector computes `stock / amount`; the overall capacity
//! is the minimum of those ratios and the ingredient that achieves it is the
//! limiting ingredient.
//!
//! Projections are advisory. The recipe and each ingredient are read
//! independently, so a concurrent adjustment may land between reads.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  id::{IngredientId, ProductId},
  store::{IngredientStore, RecipeStore},
};

// ─── Projection ──────────────────────────────────────────────────────────────

/// Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductStockProjection {
  pub product_id:             ProductId,
  /// Fractional units are meaningful and are not rounded.
  pub available_units:        f64,
  pub limiting_ingredient_id: Option<IngredientId>,
  /// Units the limiting ingredient alone permits.
  pub limiting_available:     f64,
  pub computed_at:            DateTime<Utc>,
}

impl ProductStockProjection {
  /// A zero-capacity projection, optionally blaming one ingredient.
  pub fn unproducible(
    product_id: ProductId,
    limiting_ingredient_id: Option<IngredientId>,
  ) -> Self {
    Self {
      product_id,
      available_units: 0.0,
      limiting_ingredient_id,
      limiting_available: 0.0,
      computed_at: Utc::now(),
    }
  }
}

// ─── Bottleneck rule ─────────────────────────────────────────────────────────

/// One recipe line joined with its ingredient's current stock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
  pub ingredient_id: IngredientId,
  pub stock:         f64,
  /// Required amount per produced unit.
  pub amount:        f64,
}

impl Constraint {
  /// A line with a zero or negative amount imposes no bound.
  pub fn is_binding(&self) -> bool { self.amount > 0.0 }

  /// Units producible considering only this line. Negative stock gives a
  /// negative ratio.
  pub fn possible_units(&self) -> f64 { self.stock / self.amount }
}

/// Apply the min-ratio rule to `constraints`.
///
/// Returns the limiting ingredient and the units it permits, or `None` when
/// no line is binding. On ties the earliest line wins.
pub fn bottleneck(
  constraints: impl IntoIterator<Item = Constraint>,
) -> Option<(IngredientId, f64)> {
  constraints
    .into_iter()
    .filter(Constraint::is_binding)
    .fold(None, |best, c| {
      let units = c.possible_units();
      match best {
        Some((_, min)) if min <= units => best,
        _ => Some((c.ingredient_id, units)),
      }
    })
}

// ─── Projector ───────────────────────────────────────────────────────────────

/// Computes [`ProductStockProjection`]s from injected recipe and ingredient
/// stores.
pub struct CapacityProjector<I, R> {
  ingredients: Arc<I>,
  recipes:     Arc<R>,
}

impl<I, R> Clone for CapacityProjector<I, R> {
  fn clone(&self) -> Self {
    Self {
      ingredients: Arc::clone(&self.ingredients),
      recipes:     Arc::clone(&self.recipes),
    }
  }
}

impl<I, R> CapacityProjector<I, R>
where
  I: IngredientStore,
  R: RecipeStore,
{
  pub fn new(ingredients: Arc<I>, recipes: Arc<R>) -> Self {
    Self { ingredients, recipes }
  }

  /// Project how many units of `product_id` can be produced right now.
  ///
  /// A product with no recipe, a recipe whose lines are all non-binding, or
  /// a recipe referencing a missing ingredient is unproducible: the result
  /// has zero available units rather than an error.
  ///
  /// # Errors
  ///
  /// - [`Error::Storage`] if either store fails.
  /// - [`Error::Validation`] if the limiting ratio is not a finite number,
  ///   e.g. a tiny amount against a large stock.
  pub async fn compute(
    &self,
    product_id: ProductId,
  ) -> Result<ProductStockProjection> {
    let recipe = self
      .recipes
      .get_recipe(product_id)
      .await
      .map_err(Error::storage)?;

    if recipe.is_empty() {
      return Ok(ProductStockProjection::unproducible(product_id, None));
    }

    let mut constraints = Vec::with_capacity(recipe.len());
    for item in &recipe {
      let Some(ingredient) = self
        .ingredients
        .get_ingredient(item.ingredient_id)
        .await
        .map_err(Error::storage)?
      else {
        tracing::debug!(
          %product_id,
          ingredient_id = %item.ingredient_id,
          "recipe references a missing ingredient"
        );
        return Ok(ProductStockProjection::unproducible(
          product_id,
          Some(item.ingredient_id),
        ));
      };
      constraints.push(Constraint {
        ingredient_id: ingredient.id,
        stock:         ingredient.stock,
        amount:        item.amount,
      });
    }

    let projection = match bottleneck(constraints) {
      Some((limiting, units)) if !units.is_finite() => {
        tracing::warn!(
          %product_id,
          ingredient_id = %limiting,
          "capacity ratio overflowed"
        );
        return Err(Error::Validation(format!(
          "capacity of product {product_id} is not representable: \
           ingredient {limiting} ratio overflows"
        )));
      }
      Some((limiting, units)) => ProductStockProjection {
        product_id,
        available_units: units,
        limiting_ingredient_id: Some(limiting),
        limiting_available: units,
        computed_at: Utc::now(),
      },
      None => ProductStockProjection::unproducible(product_id, None),
    };
    Ok(projection)
  }
}
