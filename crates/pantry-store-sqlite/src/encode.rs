//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Identifiers are stored as
//! `INTEGER` row ids and quantities as `REAL`.

use chrono::{DateTime, Utc};
use pantry_core::{
  adjustment::InventoryAdjustment,
  id::{AdjustmentId, IngredientId, ProductId, RecipeItemId},
  ingredient::Ingredient,
  recipe::RecipeItem,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// `true` if `err` is a UNIQUE constraint violation.
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawIngredient::read`].
pub const INGREDIENT_COLUMNS: &str =
  "id, name, type, unit, stock, min_threshold, notes, created_at, updated_at";

/// Raw values read directly from an `ingredients` row.
pub struct RawIngredient {
  pub id:            i64,
  pub name:          String,
  pub kind:          String,
  pub unit:          String,
  pub stock:         f64,
  pub min_threshold: Option<f64>,
  pub notes:         Option<String>,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawIngredient {
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      name:          row.get(1)?,
      kind:          row.get(2)?,
      unit:          row.get(3)?,
      stock:         row.get(4)?,
      min_threshold: row.get(5)?,
      notes:         row.get(6)?,
      created_at:    row.get(7)?,
      updated_at:    row.get(8)?,
    })
  }

  pub fn into_ingredient(self) -> Result<Ingredient> {
    Ok(Ingredient {
      id:            IngredientId(self.id),
      name:          self.name,
      kind:          self.kind,
      unit:          self.unit,
      stock:         self.stock,
      min_threshold: self.min_threshold,
      notes:         self.notes,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawAdjustment::read`].
pub const ADJUSTMENT_COLUMNS: &str = "id, ingredient_id, change, stock_after, \
  reason, reference, created_by, idempotency_key, created_at";

/// Raw values read directly from an `inventory_adjustments` row.
pub struct RawAdjustment {
  pub id:              i64,
  pub ingredient_id:   i64,
  pub change:          f64,
  pub stock_after:     f64,
  pub reason:          Option<String>,
  pub reference:       Option<String>,
  pub created_by:      Option<String>,
  pub idempotency_key: Option<String>,
  pub created_at:      String,
}

impl RawAdjustment {
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      ingredient_id:   row.get(1)?,
      change:          row.get(2)?,
      stock_after:     row.get(3)?,
      reason:          row.get(4)?,
      reference:       row.get(5)?,
      created_by:      row.get(6)?,
      idempotency_key: row.get(7)?,
      created_at:      row.get(8)?,
    })
  }

  pub fn into_adjustment(self) -> Result<InventoryAdjustment> {
    Ok(InventoryAdjustment {
      id:              AdjustmentId(self.id),
      ingredient_id:   IngredientId(self.ingredient_id),
      change:          self.change,
      stock_after:     self.stock_after,
      reason:          self.reason,
      reference:       self.reference,
      created_by:      self.created_by,
      idempotency_key: self.idempotency_key,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawRecipeItem::read`].
pub const RECIPE_COLUMNS: &str = "id, product_id, ingredient_id, unit, amount, \
  notes, created_at, updated_at";

/// Raw values read directly from a `recipe_items` row.
pub struct RawRecipeItem {
  pub id:            i64,
  pub product_id:    i64,
  pub ingredient_id: i64,
  pub unit:          String,
  pub amount:        f64,
  pub notes:         Option<String>,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawRecipeItem {
  pub fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      product_id:    row.get(1)?,
      ingredient_id: row.get(2)?,
      unit:          row.get(3)?,
      amount:        row.get(4)?,
      notes:         row.get(5)?,
      created_at:    row.get(6)?,
      updated_at:    row.get(7)?,
    })
  }

  pub fn into_recipe_item(self) -> Result<RecipeItem> {
    Ok(RecipeItem {
      id:            RecipeItemId(self.id),
      product_id:    ProductId(self.product_id),
      ingredient_id: IngredientId(self.ingredient_id),
      unit:          self.unit,
      amount:        self.amount,
      notes:         self.notes,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}
