//! [`RecipeStore`] implementation.

use chrono::Utc;
use pantry_core::{
  id::ProductId,
  recipe::{
    FailedRecipeLine, NewRecipeItem, RecipeItem, RecipeWriteReport, WriteMode,
  },
  store::RecipeStore,
};
use rusqlite::TransactionBehavior;

use crate::{
  Result, SqliteStore,
  encode::{RECIPE_COLUMNS, RawRecipeItem, encode_dt},
  store::ingredient_exists,
};

/// Insert one recipe line. Returns `None` if the ingredient does not exist.
fn insert_line(
  conn: &rusqlite::Connection,
  product_id: i64,
  item: &NewRecipeItem,
  now: &str,
) -> rusqlite::Result<Option<RawRecipeItem>> {
  let ingredient_id = item.ingredient_id.get();
  if !ingredient_exists(conn, ingredient_id)? {
    return Ok(None);
  }

  conn.execute(
    "INSERT INTO recipe_items (
       product_id, ingredient_id, unit, amount, notes, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
    rusqlite::params![
      product_id,
      ingredient_id,
      item.unit,
      item.amount,
      item.notes,
      now,
    ],
  )?;

  Ok(Some(RawRecipeItem {
    id: conn.last_insert_rowid(),
    product_id,
    ingredient_id,
    unit: item.unit.clone(),
    amount: item.amount,
    notes: item.notes.clone(),
    created_at: now.to_owned(),
    updated_at: now.to_owned(),
  }))
}

/// Raw counterpart of [`RecipeWriteReport`].
#[derive(Default)]
struct RawReport {
  inserted: Vec<RawRecipeItem>,
  failed:   Vec<FailedRecipeLine>,
}

impl RawReport {
  /// Attempt one line and record the result.
  fn record(
    &mut self,
    conn: &rusqlite::Connection,
    product_id: i64,
    index: usize,
    item: &NewRecipeItem,
    now: &str,
  ) {
    let error = match insert_line(conn, product_id, item, now) {
      Ok(Some(row)) => {
        self.inserted.push(row);
        return;
      }
      Ok(None) => format!("ingredient {} not found", item.ingredient_id),
      Err(e) => e.to_string(),
    };
    self.failed.push(FailedRecipeLine {
      index,
      ingredient_id: item.ingredient_id,
      error,
    });
  }

  fn into_report(self) -> Result<RecipeWriteReport> {
    Ok(RecipeWriteReport {
      inserted: self
        .inserted
        .into_iter()
        .map(RawRecipeItem::into_recipe_item)
        .collect::<Result<_>>()?,
      failed:   self.failed,
    })
  }
}

impl RecipeStore for SqliteStore {
  type Error = crate::Error;

  async fn get_recipe(&self, product_id: ProductId) -> Result<Vec<RecipeItem>> {
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RECIPE_COLUMNS} FROM recipe_items
           WHERE product_id = ?1
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![product_id.get()], RawRecipeItem::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecipeItem::into_recipe_item).collect()
  }

  async fn add_recipe_item(
    &self,
    product_id: ProductId,
    item: NewRecipeItem,
  ) -> Result<Option<RecipeItem>> {
    let now = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let row = insert_line(&tx, product_id.get(), &item, &now)?;
        tx.commit()?;
        Ok(row)
      })
      .await?;

    raw.map(RawRecipeItem::into_recipe_item).transpose()
  }

  async fn add_recipe(
    &self,
    product_id: ProductId,
    items: Vec<NewRecipeItem>,
    mode: WriteMode,
  ) -> Result<RecipeWriteReport> {
    let now = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let mut report = RawReport::default();
        match mode {
          WriteMode::Atomic => {
            let tx =
              conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            for (index, item) in items.iter().enumerate() {
              report.record(&tx, product_id.get(), index, item, &now);
            }
            if report.failed.is_empty() {
              tx.commit()?;
            } else {
              // Dropping the transaction rolls every line back.
              report.inserted.clear();
            }
          }
          WriteMode::BestEffort => {
            for (index, item) in items.iter().enumerate() {
              report.record(conn, product_id.get(), index, item, &now);
            }
          }
        }
        Ok(report)
      })
      .await?;

    let report = raw.into_report()?;
    log_failures(product_id, mode, &report);
    Ok(report)
  }
}

fn log_failures(product_id: ProductId, mode: WriteMode, report: &RecipeWriteReport) {
  for line in &report.failed {
    tracing::warn!(
      %product_id,
      ?mode,
      index = line.index,
      ingredient_id = %line.ingredient_id,
      error = %line.error,
      "recipe line not written"
    );
  }
  if mode == WriteMode::Atomic && !report.failed.is_empty() {
    tracing::warn!(%product_id, "atomic recipe write rolled back");
  }
}
