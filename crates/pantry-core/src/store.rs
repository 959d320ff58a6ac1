//! Storage traits: the Ingredient Store, the Ledger Store and the Recipe
//! Store.
//!
//! The traits are implemented by storage backends (e.g.
//! `pantry-store-sqlite`). Services and the HTTP layer depend on these
//! abstractions, never on a concrete backend, and receive a backend handle at
//! construction time.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use crate::{
  adjustment::{
    AdjustmentOutcome, AdjustmentRequest, InventoryAdjustment,
    NegativeStockPolicy,
  },
  id::{IngredientId, ProductId},
  ingredient::{Ingredient, IngredientWrite, NewIngredient},
  recipe::{NewRecipeItem, RecipeItem, RecipeWriteReport, WriteMode},
};

// ─── Ingredients ─────────────────────────────────────────────────────────────

/// Read and administrative write access to ingredient records.
pub trait IngredientStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All ingredients, ordered by id.
  fn list_ingredients(
    &self,
  ) -> impl Future<Output = Result<Vec<Ingredient>, Self::Error>> + Send + '_;

  /// Retrieve an ingredient by id. Returns `None` if not found.
  fn get_ingredient(
    &self,
    id: IngredientId,
  ) -> impl Future<Output = Result<Option<Ingredient>, Self::Error>> + Send + '_;

  /// Persist a new ingredient. The store assigns id and timestamps.
  fn create_ingredient(
    &self,
    input: NewIngredient,
  ) -> impl Future<Output = Result<IngredientWrite, Self::Error>> + Send + '_;

  /// Overwrite every writable field of an ingredient, **including stock**.
  ///
  /// This is the administrative path: it writes no audit row and so bypasses
  /// the adjustment ledger. Routine stock changes must go through
  /// [`LedgerStore::apply_adjustment`].
  fn replace_ingredient(
    &self,
    id: IngredientId,
    input: NewIngredient,
  ) -> impl Future<Output = Result<IngredientWrite, Self::Error>> + Send + '_;

  /// Ingredients with a reorder threshold whose stock is at or below it.
  fn low_stock(
    &self,
  ) -> impl Future<Output = Result<Vec<Ingredient>, Self::Error>> + Send + '_;
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// Stock mutation with an append-only audit trail.
pub trait LedgerStore: IngredientStore {
  /// Apply `request` as one atomic unit.
  ///
  /// Inside a single transaction the store must: resolve a replay of
  /// `request.idempotency_key`, read the current stock, consult `policy`,
  /// write `stock = stock + change` computed in the database, and insert one
  /// audit row. Either every write commits or none does. Concurrent calls for
  /// the same ingredient must never lose an update.
  fn apply_adjustment(
    &self,
    request: AdjustmentRequest,
    policy: NegativeStockPolicy,
  ) -> impl Future<Output = Result<AdjustmentOutcome, Self::Error>> + Send + '_;

  /// The audit trail for one ingredient, oldest first.
  fn list_adjustments(
    &self,
    ingredient_id: IngredientId,
  ) -> impl Future<Output = Result<Vec<InventoryAdjustment>, Self::Error>>
  + Send
  + '_;
}

// ─── Recipes ─────────────────────────────────────────────────────────────────

/// Per-product ingredient requirements.
pub trait RecipeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All recipe lines for `product_id`, in insertion order. An unknown
  /// product simply has an empty recipe.
  fn get_recipe(
    &self,
    product_id: ProductId,
  ) -> impl Future<Output = Result<Vec<RecipeItem>, Self::Error>> + Send + '_;

  /// Add one recipe line. Returns `None` if the referenced ingredient does
  /// not exist.
  fn add_recipe_item(
    &self,
    product_id: ProductId,
    item: NewRecipeItem,
  ) -> impl Future<Output = Result<Option<RecipeItem>, Self::Error>> + Send + '_;

  /// Add several recipe lines for a newly catalogued product under the given
  /// [`WriteMode`].
  fn add_recipe(
    &self,
    product_id: ProductId,
    items: Vec<NewRecipeItem>,
    mode: WriteMode,
  ) -> impl Future<Output = Result<RecipeWriteReport, Self::Error>> + Send + '_;
}
