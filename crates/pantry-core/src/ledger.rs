//! The Stock Adjustment Service.
//!
//! [`StockAdjuster`] validates an [`AdjustmentRequest`], hands it to a
//! [`LedgerStore`] for atomic application, and turns the store's
//! [`AdjustmentOutcome`] into a receipt or a domain error.

use std::sync::Arc;

use crate::{
  Error, Result,
  adjustment::{
    AdjustmentOutcome, AdjustmentReceipt, AdjustmentRequest,
    NegativeStockPolicy,
  },
  store::LedgerStore,
};

/// Applies audited stock adjustments against an injected [`LedgerStore`].
pub struct StockAdjuster<L> {
  store:  Arc<L>,
  policy: NegativeStockPolicy,
}

impl<L> Clone for StockAdjuster<L> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), policy: self.policy }
  }
}

impl<L: LedgerStore> StockAdjuster<L> {
  pub fn new(store: Arc<L>, policy: NegativeStockPolicy) -> Self {
    Self { store, policy }
  }

  pub fn policy(&self) -> NegativeStockPolicy { self.policy }

  /// Apply `request`: `new_stock = stock + change`, plus one audit row, as a
  /// single all-or-nothing unit.
  ///
  /// # Errors
  ///
  /// - [`Error::Validation`] if `change` or the resulting stock is not
  ///   finite.
  /// - [`Error::IngredientNotFound`] if the ingredient does not exist; no
  ///   audit row is written.
  /// - [`Error::InsufficientStock`] if the policy forbids the result.
  /// - [`Error::IdempotencyConflict`] if the key belongs to another
  ///   adjustment.
  /// - [`Error::Storage`] on any backend failure; nothing is written.
  pub async fn adjust(
    &self,
    mut request: AdjustmentRequest,
  ) -> Result<AdjustmentReceipt> {
    if !request.change.is_finite() {
      return Err(Error::Validation("change must be a finite number".into()));
    }
    // A blank key never deduplicates.
    request.idempotency_key = request
      .idempotency_key
      .filter(|key| !key.trim().is_empty());

    let ingredient_id = request.ingredient_id;
    let change = request.change;
    let key = request.idempotency_key.clone();

    let outcome = self
      .store
      .apply_adjustment(request, self.policy)
      .await
      .map_err(Error::storage)?;

    match outcome {
      AdjustmentOutcome::Applied { adjustment, min_threshold } => {
        let new_stock = adjustment.stock_after;
        tracing::info!(
          %ingredient_id,
          change,
          new_stock,
          adjustment_id = %adjustment.id,
          "stock adjusted"
        );
        if let Some(min) = min_threshold {
          let before = new_stock - change;
          if new_stock <= min && before > min {
            tracing::warn!(
              %ingredient_id,
              new_stock,
              min_threshold = min,
              "ingredient fell to its reorder threshold"
            );
          }
        }
        Ok(AdjustmentReceipt {
          ingredient_id,
          new_stock,
          adjustment,
          replayed: false,
        })
      }
      AdjustmentOutcome::Replayed(adjustment) => {
        tracing::info!(
          %ingredient_id,
          adjustment_id = %adjustment.id,
          "idempotent adjustment replayed"
        );
        Ok(AdjustmentReceipt {
          ingredient_id,
          new_stock: adjustment.stock_after,
          adjustment,
          replayed: true,
        })
      }
      AdjustmentOutcome::IngredientNotFound => {
        Err(Error::IngredientNotFound(ingredient_id))
      }
      AdjustmentOutcome::BelowZero { stock } => {
        Err(Error::InsufficientStock { ingredient_id, stock, change })
      }
      AdjustmentOutcome::Overflow { stock } => {
        tracing::warn!(
          %ingredient_id,
          stock,
          change,
          "adjustment overflows stock"
        );
        Err(Error::Validation(format!(
          "stock {stock} + change {change} is not a finite number"
        )))
      }
      AdjustmentOutcome::KeyConflict => {
        Err(Error::IdempotencyConflict(key.unwrap_or_default()))
      }
    }
  }
}
