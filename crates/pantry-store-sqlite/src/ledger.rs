//! [`LedgerStore`] implementation.
//!
//! Every adjustment runs inside a `BEGIN IMMEDIATE` transaction, which takes
//! SQLite's write lock up front. Adjustments therefore serialise across all
//! ingredients; the new stock is computed by the database (`stock + ?`) so a
//! concurrent writer can never cause a lost update.

use chrono::Utc;
use pantry_core::{
  adjustment::{
    AdjustmentOutcome, AdjustmentRequest, InventoryAdjustment,
    NegativeStockPolicy,
  },
  id::IngredientId,
  store::LedgerStore,
};
use rusqlite::{OptionalExtension as _, TransactionBehavior};

use crate::{
  Result, SqliteStore,
  encode::{ADJUSTMENT_COLUMNS, RawAdjustment, encode_dt},
};

/// Raw counterpart of [`AdjustmentOutcome`], produced on the database thread.
enum RawOutcome {
  Applied { row: RawAdjustment, min_threshold: Option<f64> },
  Replayed(RawAdjustment),
  NotFound,
  BelowZero { stock: f64 },
  Overflow { stock: f64 },
  KeyConflict,
}

impl RawOutcome {
  fn into_outcome(self) -> Result<AdjustmentOutcome> {
    Ok(match self {
      Self::Applied { row, min_threshold } => AdjustmentOutcome::Applied {
        adjustment: row.into_adjustment()?,
        min_threshold,
      },
      Self::Replayed(row) => AdjustmentOutcome::Replayed(row.into_adjustment()?),
      Self::NotFound => AdjustmentOutcome::IngredientNotFound,
      Self::BelowZero { stock } => AdjustmentOutcome::BelowZero { stock },
      Self::Overflow { stock } => AdjustmentOutcome::Overflow { stock },
      Self::KeyConflict => AdjustmentOutcome::KeyConflict,
    })
  }
}

fn adjustment_by_key(
  conn: &rusqlite::Connection,
  key: &str,
) -> rusqlite::Result<Option<RawAdjustment>> {
  conn
    .query_row(
      &format!(
        "SELECT {ADJUSTMENT_COLUMNS} FROM inventory_adjustments
         WHERE idempotency_key = ?1"
      ),
      rusqlite::params![key],
      RawAdjustment::read,
    )
    .optional()
}

fn stock_and_threshold(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<(f64, Option<f64>)>> {
  conn
    .query_row(
      "SELECT stock, min_threshold FROM ingredients WHERE id = ?1",
      rusqlite::params![id],
      |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
}

impl LedgerStore for SqliteStore {
  async fn apply_adjustment(
    &self,
    request: AdjustmentRequest,
    policy: NegativeStockPolicy,
  ) -> Result<AdjustmentOutcome> {
    let now = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let ingredient_id = request.ingredient_id.get();

        let prior = match request.idempotency_key.as_deref() {
          Some(key) => adjustment_by_key(&tx, key)?,
          None => None,
        };
        if let Some(prior) = prior {
          let same = prior.ingredient_id == ingredient_id
            && prior.change == request.change;
          return Ok(if same {
            RawOutcome::Replayed(prior)
          } else {
            RawOutcome::KeyConflict
          });
        }

        let Some((stock, min_threshold)) =
          stock_and_threshold(&tx, ingredient_id)?
        else {
          return Ok(RawOutcome::NotFound);
        };

        if !policy.permits(stock, request.change) {
          return Ok(RawOutcome::BelowZero { stock });
        }
        if !(stock + request.change).is_finite() {
          return Ok(RawOutcome::Overflow { stock });
        }

        let stock_after: f64 = tx.query_row(
          "UPDATE ingredients SET stock = stock + ?1, updated_at = ?2
           WHERE id = ?3
           RETURNING stock",
          rusqlite::params![request.change, now, ingredient_id],
          |row| row.get(0),
        )?;

        tx.execute(
          "INSERT INTO inventory_adjustments (
             ingredient_id, change, stock_after, reason, reference,
             created_by, idempotency_key, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            ingredient_id,
            request.change,
            stock_after,
            request.reason,
            request.reference,
            request.created_by,
            request.idempotency_key,
            now,
          ],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()?;

        Ok(RawOutcome::Applied {
          row: RawAdjustment {
            id,
            ingredient_id,
            change: request.change,
            stock_after,
            reason: request.reason,
            reference: request.reference,
            created_by: request.created_by,
            idempotency_key: request.idempotency_key,
            created_at: now,
          },
          min_threshold,
        })
      })
      .await?;

    raw.into_outcome()
  }

  async fn list_adjustments(
    &self,
    ingredient_id: IngredientId,
  ) -> Result<Vec<InventoryAdjustment>> {
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ADJUSTMENT_COLUMNS} FROM inventory_adjustments
           WHERE ingredient_id = ?1
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![ingredient_id.get()], RawAdjustment::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAdjustment::into_adjustment).collect()
  }
}
