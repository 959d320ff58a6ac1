//! Handlers for `/ingredients` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/ingredients` | Ordered by id |
//! | `POST`  | `/ingredients` | Body: [`NewIngredient`]; returns 201 |
//! | `GET`   | `/ingredients/low-stock` | At or below `min_threshold` |
//! | `GET`   | `/ingredients/{id}` | 404 if not found |
//! | `PUT`   | `/ingredients/{id}` | Admin only; overwrites stock without an audit row |
//! | `PATCH` | `/ingredients/{id}/adjust` | Body: [`AdjustBody`]; the audited path |
//! | `GET`   | `/ingredients/{id}/adjustments` | Audit trail, oldest first |

use axum::{
  Json,
  extract::{
    Path, State,
    rejection::{JsonRejection, PathRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use pantry_core::{
  adjustment::{AdjustmentReceipt, AdjustmentRequest, InventoryAdjustment},
  id::{AdjustmentId, IngredientId},
  ingredient::{Ingredient, IngredientWrite, NewIngredient},
  store::{IngredientStore, LedgerStore},
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, Backend, auth::Admin, error::ApiError};

fn not_found(id: IngredientId) -> ApiError {
  ApiError::NotFound(format!("ingredient {id} not found"))
}

fn saved(
  write: IngredientWrite,
  id: Option<IngredientId>,
  name: &str,
) -> Result<Ingredient, ApiError> {
  match write {
    IngredientWrite::Saved(ingredient) => Ok(ingredient),
    IngredientWrite::NotFound => Err(match id {
      Some(id) => not_found(id),
      None => ApiError::NotFound("ingredient not found".into()),
    }),
    IngredientWrite::NameTaken => {
      Err(pantry_core::Error::DuplicateName(name.to_owned()).into())
    }
  }
}

// ─── Catalogue ───────────────────────────────────────────────────────────────

/// `GET /ingredients`
pub async fn list<S: Backend>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Ingredient>>, ApiError> {
  let ingredients =
    state.store.list_ingredients().await.map_err(ApiError::store)?;
  Ok(Json(ingredients))
}

/// `GET /ingredients/low-stock`
pub async fn low_stock<S: Backend>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Ingredient>>, ApiError> {
  let ingredients = state.store.low_stock().await.map_err(ApiError::store)?;
  Ok(Json(ingredients))
}

/// `GET /ingredients/{id}`
pub async fn get_one<S: Backend>(
  State(state): State<ApiState<S>>,
  path: Result<Path<IngredientId>, PathRejection>,
) -> Result<Json<Ingredient>, ApiError> {
  let Path(id) = path?;
  let ingredient = state
    .store
    .get_ingredient(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(ingredient))
}

/// `POST /ingredients`
pub async fn create<S: Backend>(
  State(state): State<ApiState<S>>,
  body: Result<Json<NewIngredient>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(input) = body?;
  input.validate()?;

  let name = input.name.clone();
  let write = state
    .store
    .create_ingredient(input)
    .await
    .map_err(ApiError::store)?;
  let ingredient = saved(write, None, &name)?;

  tracing::info!(
    ingredient_id = %ingredient.id,
    name = %ingredient.name,
    "ingredient created"
  );
  Ok((StatusCode::CREATED, Json(ingredient)))
}

/// `PUT /ingredients/{id}`: administrative full replace, stock included.
pub async fn replace<S: Backend>(
  _admin: Admin,
  State(state): State<ApiState<S>>,
  path: Result<Path<IngredientId>, PathRejection>,
  body: Result<Json<NewIngredient>, JsonRejection>,
) -> Result<Json<Ingredient>, ApiError> {
  let Path(id) = path?;
  let Json(input) = body?;
  input.validate()?;

  let name = input.name.clone();
  let write = state
    .store
    .replace_ingredient(id, input)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(saved(write, Some(id), &name)?))
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AdjustBody {
  /// Signed delta: positive restocks, negative consumes.
  pub change:          f64,
  #[serde(default)]
  pub reason:          Option<String>,
  #[serde(default)]
  pub reference:       Option<String>,
  #[serde(default)]
  pub created_by:      Option<String>,
  #[serde(default)]
  pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdjustResponse {
  pub ingredient_id: IngredientId,
  pub new_stock:     f64,
  pub adjustment_id: AdjustmentId,
  pub replayed:      bool,
}

impl From<AdjustmentReceipt> for AdjustResponse {
  fn from(receipt: AdjustmentReceipt) -> Self {
    Self {
      ingredient_id: receipt.ingredient_id,
      new_stock:     receipt.new_stock,
      adjustment_id: receipt.adjustment.id,
      replayed:      receipt.replayed,
    }
  }
}

/// `PATCH /ingredients/{id}/adjust`
pub async fn adjust<S: Backend>(
  State(state): State<ApiState<S>>,
  path: Result<Path<IngredientId>, PathRejection>,
  body: Result<Json<AdjustBody>, JsonRejection>,
) -> Result<Json<AdjustResponse>, ApiError> {
  let Path(id) = path?;
  let Json(body) = body?;

  let request = AdjustmentRequest {
    ingredient_id:   id,
    change:          body.change,
    reason:          body.reason,
    reference:       body.reference,
    created_by:      body.created_by,
    idempotency_key: body.idempotency_key,
  };
  let receipt = state.adjuster.adjust(request).await?;
  Ok(Json(receipt.into()))
}

/// `GET /ingredients/{id}/adjustments`
pub async fn adjustments<S: Backend>(
  State(state): State<ApiState<S>>,
  path: Result<Path<IngredientId>, PathRejection>,
) -> Result<Json<Vec<InventoryAdjustment>>, ApiError> {
  let Path(id) = path?;
  if state
    .store
    .get_ingredient(id)
    .await
    .map_err(ApiError::store)?
    .is_none()
  {
    return Err(not_found(id));
  }
  let trail = state.store.list_adjustments(id).await.map_err(ApiError::store)?;
  Ok(Json(trail))
}
