//! [`SqliteStore`] and its [`IngredientStore`] implementation.
//!
//! Query helpers in this crate take `&rusqlite::Connection`; a
//! `rusqlite::Transaction` derefs to one, so the same helper runs either on
//! the bare connection or inside a transaction.

use std::{path::Path, time::Duration};

use chrono::Utc;
use pantry_core::{
  id::IngredientId,
  ingredient::{Ingredient, IngredientWrite, NewIngredient},
  store::IngredientStore,
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{INGREDIENT_COLUMNS, RawIngredient, encode_dt, is_unique_violation},
  schema::SCHEMA,
};

/// How long a write waits on another connection's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Pantry store backed by a single SQLite file.
///
/// Clones share one underlying connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a private in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Query helpers ───────────────────────────────────────────────────────────

pub(crate) fn fetch_ingredient(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<RawIngredient>> {
  conn
    .query_row(
      &format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE id = ?1"),
      rusqlite::params![id],
      RawIngredient::read,
    )
    .optional()
}

pub(crate) fn ingredient_exists(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM ingredients WHERE id = ?1",
        rusqlite::params![id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

fn query_ingredients(
  conn: &rusqlite::Connection,
  sql: &str,
) -> rusqlite::Result<Vec<RawIngredient>> {
  let mut stmt = conn.prepare(sql)?;
  stmt
    .query_map([], RawIngredient::read)?
    .collect::<rusqlite::Result<Vec<_>>>()
}

/// Raw counterpart of [`IngredientWrite`], produced on the database thread.
enum RawWrite {
  Saved(RawIngredient),
  NotFound,
  NameTaken,
}

impl RawWrite {
  fn into_write(self) -> Result<IngredientWrite> {
    Ok(match self {
      Self::Saved(raw) => IngredientWrite::Saved(raw.into_ingredient()?),
      Self::NotFound => IngredientWrite::NotFound,
      Self::NameTaken => IngredientWrite::NameTaken,
    })
  }
}

// ─── IngredientStore impl ────────────────────────────────────────────────────

impl IngredientStore for SqliteStore {
  type Error = Error;

  async fn list_ingredients(&self) -> Result<Vec<Ingredient>> {
    let raws = self
      .conn
      .call(|conn| {
        Ok(query_ingredients(
          conn,
          &format!("SELECT {INGREDIENT_COLUMNS} FROM ingredients ORDER BY id"),
        )?)
      })
      .await?;

    raws.into_iter().map(RawIngredient::into_ingredient).collect()
  }

  async fn get_ingredient(&self, id: IngredientId) -> Result<Option<Ingredient>> {
    let raw = self
      .conn
      .call(move |conn| Ok(fetch_ingredient(conn, id.get())?))
      .await?;

    raw.map(RawIngredient::into_ingredient).transpose()
  }

  async fn create_ingredient(&self, input: NewIngredient) -> Result<IngredientWrite> {
    let now = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO ingredients (
             name, type, unit, stock, min_threshold, notes, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
          rusqlite::params![
            input.name,
            input.kind,
            input.unit,
            input.stock,
            input.min_threshold,
            input.notes,
            now,
          ],
        );
        match inserted {
          Ok(_) => {}
          Err(e) if is_unique_violation(&e) => return Ok(RawWrite::NameTaken),
          Err(e) => return Err(e.into()),
        }
        let id = conn.last_insert_rowid();
        Ok(
          fetch_ingredient(conn, id)?
            .map_or(RawWrite::NotFound, RawWrite::Saved),
        )
      })
      .await?;

    raw.into_write()
  }

  async fn replace_ingredient(
    &self,
    id: IngredientId,
    input: NewIngredient,
  ) -> Result<IngredientWrite> {
    let now = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let updated = conn.execute(
          "UPDATE ingredients
             SET name = ?1, type = ?2, unit = ?3, stock = ?4,
                 min_threshold = ?5, notes = ?6, updated_at = ?7
           WHERE id = ?8",
          rusqlite::params![
            input.name,
            input.kind,
            input.unit,
            input.stock,
            input.min_threshold,
            input.notes,
            now,
            id.get(),
          ],
        );
        match updated {
          Ok(0) => return Ok(RawWrite::NotFound),
          Ok(_) => {}
          Err(e) if is_unique_violation(&e) => return Ok(RawWrite::NameTaken),
          Err(e) => return Err(e.into()),
        }
        tracing::warn!(
          ingredient_id = %id,
          stock = input.stock,
          "ingredient replaced; stock written without an audit row"
        );
        Ok(
          fetch_ingredient(conn, id.get())?
            .map_or(RawWrite::NotFound, RawWrite::Saved),
        )
      })
      .await?;

    raw.into_write()
  }

  async fn low_stock(&self) -> Result<Vec<Ingredient>> {
    let raws = self
      .conn
      .call(|conn| {
        Ok(query_ingredients(
          conn,
          &format!(
            "SELECT {INGREDIENT_COLUMNS} FROM ingredients
             WHERE min_threshold IS NOT NULL AND stock <= min_threshold
             ORDER BY id"
          ),
        )?)
      })
      .await?;

    raws.into_iter().map(RawIngredient::into_ingredient).collect()
  }
}
