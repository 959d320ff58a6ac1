//! Stock adjustments and their append-only audit trail.
//!
//! An adjustment is a signed change to one ingredient's stock. The stock
//! update and the audit row are written in a single atomic unit by the
//! [`LedgerStore`](crate::store::LedgerStore); audit rows are never updated
//! or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{AdjustmentId, IngredientId};

// ─── Audit record ────────────────────────────────────────────────────────────

/// One immutable row of the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryAdjustment {
  pub id:              AdjustmentId,
  pub ingredient_id:   IngredientId,
  /// Positive for restock, negative for consumption or waste.
  pub change:          f64,
  /// Stock of the ingredient immediately after this adjustment applied.
  pub stock_after:     f64,
  /// e.g. "restock", "sale", "waste", "correction".
  pub reason:          Option<String>,
  /// External reference such as a PO number or order id.
  pub reference:       Option<String>,
  pub created_by:      Option<String>,
  pub idempotency_key: Option<String>,
  pub created_at:      DateTime<Utc>,
}

// ─── Request / outcome ───────────────────────────────────────────────────────

/// Input to [`StockAdjuster::adjust`](crate::ledger::StockAdjuster::adjust).
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentRequest {
  pub ingredient_id:   IngredientId,
  pub change:          f64,
  pub reason:          Option<String>,
  pub reference:       Option<String>,
  pub created_by:      Option<String>,
  /// Caller-supplied dedup token. A retried request carrying the same key is
  /// answered from the original audit row instead of being applied twice.
  pub idempotency_key: Option<String>,
}

impl AdjustmentRequest {
  pub fn new(ingredient_id: IngredientId, change: f64) -> Self {
    Self {
      ingredient_id,
      change,
      reason: None,
      reference: None,
      created_by: None,
      idempotency_key: None,
    }
  }

  pub fn reason(mut self, reason: impl Into<String>) -> Self {
    self.reason = Some(reason.into());
    self
  }

  pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
    self.idempotency_key = Some(key.into());
    self
  }
}

/// Whether an adjustment may drive stock below zero.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NegativeStockPolicy {
  /// No floor check; stock may go negative.
  #[default]
  Allow,
  /// Refuse a consuming adjustment whose result would be below zero.
  Reject,
}

impl NegativeStockPolicy {
  /// Whether moving from `stock` by `change` is permitted.
  ///
  /// Restocks are always permitted, even when stock is already negative.
  pub fn permits(self, stock: f64, change: f64) -> bool {
    match self {
      Self::Allow => true,
      Self::Reject => change >= 0.0 || stock + change >= 0.0,
    }
  }
}

/// What a [`LedgerStore`](crate::store::LedgerStore) did with an adjustment.
/// In every variant other than `Applied`, nothing was written.
#[derive(Debug, Clone)]
pub enum AdjustmentOutcome {
  Applied {
    adjustment:    InventoryAdjustment,
    /// The ingredient's reorder threshold at the time of the write.
    min_threshold: Option<f64>,
  },
  /// The idempotency key matched an earlier, identical adjustment.
  Replayed(InventoryAdjustment),
  IngredientNotFound,
  /// Refused by [`NegativeStockPolicy::Reject`].
  BelowZero { stock: f64 },
  /// `stock + change` is not a finite number.
  Overflow { stock: f64 },
  /// The idempotency key belongs to a different adjustment.
  KeyConflict,
}

/// The result of a successful [`StockAdjuster::adjust`](crate::ledger::StockAdjuster::adjust).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentReceipt {
  pub ingredient_id: IngredientId,
  pub new_stock:     f64,
  pub adjustment:    InventoryAdjustment,
  /// `true` when answered from an earlier adjustment with the same key.
  pub replayed:      bool,
}
