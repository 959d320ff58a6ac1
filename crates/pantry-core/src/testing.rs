//! In-memory test double implementing every store trait.

use std::{
  collections::HashMap,
  sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
  },
};

use chrono::Utc;
use thiserror::Error;

use crate::{
  adjustment::{
    AdjustmentOutcome, AdjustmentRequest, InventoryAdjustment,
    NegativeStockPolicy,
  },
  id::{AdjustmentId, IngredientId, ProductId, RecipeItemId},
  ingredient::{Ingredient, IngredientWrite, NewIngredient},
  recipe::{
    FailedRecipeLine, NewRecipeItem, RecipeItem, RecipeWriteReport, WriteMode,
  },
  store::{IngredientStore, LedgerStore, RecipeStore},
};

#[derive(Debug, Error)]
#[error("injected storage failure")]
pub struct MemoryError;

#[derive(Default)]
struct State {
  ingredients: Vec<Ingredient>,
  adjustments: Vec<InventoryAdjustment>,
  recipes:     Vec<RecipeItem>,
  next_id:     i64,
}

impl State {
  fn next_id(&mut self) -> i64 {
    self.next_id += 1;
    self.next_id
  }
}

/// A `Mutex`-guarded store. Reads and writes can be made to fail on demand.
#[derive(Default)]
pub struct MemoryStore {
  state:       Mutex<State>,
  fail_reads:  AtomicBool,
  fail_writes: AtomicBool,
  /// Number of `get_ingredient` calls, for asserting lookup patterns.
  lookups:     Mutex<HashMap<IngredientId, usize>>,
}

impl MemoryStore {
  pub fn seed(&self, input: NewIngredient) -> IngredientId {
    let mut state = self.state.lock().unwrap();
    let id = IngredientId(state.next_id());
    let now = Utc::now();
    state.ingredients.push(Ingredient {
      id,
      name: input.name,
      kind: input.kind,
      unit: input.unit,
      stock: input.stock,
      min_threshold: input.min_threshold,
      notes: input.notes,
      created_at: now,
      updated_at: now,
    });
    id
  }

  /// Insert a recipe line without checking that its ingredient exists.
  pub fn seed_recipe_line(
    &self,
    product_id: ProductId,
    ingredient_id: IngredientId,
    amount: f64,
  ) {
    let mut state = self.state.lock().unwrap();
    let id = RecipeItemId(state.next_id());
    let now = Utc::now();
    state.recipes.push(RecipeItem {
      id,
      product_id,
      ingredient_id,
      unit: "g".into(),
      amount,
      notes: None,
      created_at: now,
      updated_at: now,
    });
  }

  pub fn set_stock(&self, id: IngredientId, stock: f64) {
    let mut state = self.state.lock().unwrap();
    if let Some(ing) = state.ingredients.iter_mut().find(|i| i.id == id) {
      ing.stock = stock;
    }
  }

  pub fn adjustment_count(&self) -> usize {
    self.state.lock().unwrap().adjustments.len()
  }

  pub fn lookups(&self, id: IngredientId) -> usize {
    self.lookups.lock().unwrap().get(&id).copied().unwrap_or(0)
  }

  pub fn fail_reads(&self, on: bool) { self.fail_reads.store(on, Ordering::SeqCst); }

  pub fn fail_writes(&self, on: bool) { self.fail_writes.store(on, Ordering::SeqCst); }

  fn check_read(&self) -> Result<(), MemoryError> {
    if self.fail_reads.load(Ordering::SeqCst) { Err(MemoryError) } else { Ok(()) }
  }

  fn check_write(&self) -> Result<(), MemoryError> {
    if self.fail_writes.load(Ordering::SeqCst) { Err(MemoryError) } else { Ok(()) }
  }
}

impl IngredientStore for MemoryStore {
  type Error = MemoryError;

  async fn list_ingredients(&self) -> Result<Vec<Ingredient>, MemoryError> {
    self.check_read()?;
    Ok(self.state.lock().unwrap().ingredients.clone())
  }

  async fn get_ingredient(
    &self,
    id: IngredientId,
  ) -> Result<Option<Ingredient>, MemoryError> {
    self.check_read()?;
    *self.lookups.lock().unwrap().entry(id).or_default() += 1;
    let state = self.state.lock().unwrap();
    Ok(state.ingredients.iter().find(|i| i.id == id).cloned())
  }

  async fn create_ingredient(
    &self,
    input: NewIngredient,
  ) -> Result<IngredientWrite, MemoryError> {
    self.check_write()?;
    let taken = {
      let state = self.state.lock().unwrap();
      state.ingredients.iter().any(|i| i.name == input.name)
    };
    if taken {
      return Ok(IngredientWrite::NameTaken);
    }
    let id = self.seed(input);
    let state = self.state.lock().unwrap();
    let saved = state.ingredients.iter().find(|i| i.id == id).cloned();
    Ok(saved.map_or(IngredientWrite::NotFound, IngredientWrite::Saved))
  }

  async fn replace_ingredient(
    &self,
    id: IngredientId,
    input: NewIngredient,
  ) -> Result<IngredientWrite, MemoryError> {
    self.check_write()?;
    let mut state = self.state.lock().unwrap();
    if state.ingredients.iter().any(|i| i.id != id && i.name == input.name) {
      return Ok(IngredientWrite::NameTaken);
    }
    let Some(ing) = state.ingredients.iter_mut().find(|i| i.id == id) else {
      return Ok(IngredientWrite::NotFound);
    };
    ing.name = input.name;
    ing.kind = input.kind;
    ing.unit = input.unit;
    ing.stock = input.stock;
    ing.min_threshold = input.min_threshold;
    ing.notes = input.notes;
    ing.updated_at = Utc::now();
    Ok(IngredientWrite::Saved(ing.clone()))
  }

  async fn low_stock(&self) -> Result<Vec<Ingredient>, MemoryError> {
    self.check_read()?;
    let state = self.state.lock().unwrap();
    Ok(state.ingredients.iter().filter(|i| i.is_low()).cloned().collect())
  }
}

impl LedgerStore for MemoryStore {
  async fn apply_adjustment(
    &self,
    request: AdjustmentRequest,
    policy: NegativeStockPolicy,
  ) -> Result<AdjustmentOutcome, MemoryError> {
    self.check_write()?;
    let mut state = self.state.lock().unwrap();

    if let Some(key) = &request.idempotency_key
      && let Some(prior) = state
        .adjustments
        .iter()
        .find(|a| a.idempotency_key.as_deref() == Some(key.as_str()))
    {
      return Ok(
        if prior.ingredient_id == request.ingredient_id
          && prior.change == request.change
        {
          AdjustmentOutcome::Replayed(prior.clone())
        } else {
          AdjustmentOutcome::KeyConflict
        },
      );
    }

    let id = AdjustmentId(state.next_id());
    let now = Utc::now();
    let Some(ing) = state
      .ingredients
      .iter_mut()
      .find(|i| i.id == request.ingredient_id)
    else {
      return Ok(AdjustmentOutcome::IngredientNotFound);
    };
    if !policy.permits(ing.stock, request.change) {
      return Ok(AdjustmentOutcome::BelowZero { stock: ing.stock });
    }
    if !(ing.stock + request.change).is_finite() {
      return Ok(AdjustmentOutcome::Overflow { stock: ing.stock });
    }
    ing.stock += request.change;
    ing.updated_at = now;
    let min_threshold = ing.min_threshold;
    let adjustment = InventoryAdjustment {
      id,
      ingredient_id: request.ingredient_id,
      change: request.change,
      stock_after: ing.stock,
      reason: request.reason,
      reference: request.reference,
      created_by: request.created_by,
      idempotency_key: request.idempotency_key,
      created_at: now,
    };
    state.adjustments.push(adjustment.clone());
    Ok(AdjustmentOutcome::Applied { adjustment, min_threshold })
  }

  async fn list_adjustments(
    &self,
    ingredient_id: IngredientId,
  ) -> Result<Vec<InventoryAdjustment>, MemoryError> {
    self.check_read()?;
    let state = self.state.lock().unwrap();
    Ok(
      state
        .adjustments
        .iter()
        .filter(|a| a.ingredient_id == ingredient_id)
        .cloned()
        .collect(),
    )
  }
}

impl RecipeStore for MemoryStore {
  type Error = MemoryError;

  async fn get_recipe(
    &self,
    product_id: ProductId,
  ) -> Result<Vec<RecipeItem>, MemoryError> {
    self.check_read()?;
    let state = self.state.lock().unwrap();
    Ok(
      state
        .recipes
        .iter()
        .filter(|r| r.product_id == product_id)
        .cloned()
        .collect(),
    )
  }

  async fn add_recipe_item(
    &self,
    product_id: ProductId,
    item: NewRecipeItem,
  ) -> Result<Option<RecipeItem>, MemoryError> {
    self.check_write()?;
    let mut state = self.state.lock().unwrap();
    if !state.ingredients.iter().any(|i| i.id == item.ingredient_id) {
      return Ok(None);
    }
    let id = RecipeItemId(state.next_id());
    let now = Utc::now();
    let stored = RecipeItem {
      id,
      product_id,
      ingredient_id: item.ingredient_id,
      unit: item.unit,
      amount: item.amount,
      notes: item.notes,
      created_at: now,
      updated_at: now,
    };
    state.recipes.push(stored.clone());
    Ok(Some(stored))
  }

  async fn add_recipe(
    &self,
    product_id: ProductId,
    items: Vec<NewRecipeItem>,
    mode: WriteMode,
  ) -> Result<RecipeWriteReport, MemoryError> {
    let mut report = RecipeWriteReport::default();
    for (index, item) in items.into_iter().enumerate() {
      let ingredient_id = item.ingredient_id;
      match self.add_recipe_item(product_id, item).await? {
        Some(stored) => report.inserted.push(stored),
        None => report.failed.push(FailedRecipeLine {
          index,
          ingredient_id,
          error: format!("ingredient not found: {ingredient_id}"),
        }),
      }
    }
    if mode == WriteMode::Atomic && !report.failed.is_empty() {
      let mut state = self.state.lock().unwrap();
      state
        .recipes
        .retain(|r| !report.inserted.iter().any(|i| i.id == r.id));
      report.inserted.clear();
    }
    Ok(report)
  }
}
