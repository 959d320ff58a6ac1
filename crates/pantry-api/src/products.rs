//! Handlers for `/products/{id}` endpoints.
//!
//! Products live in an external catalogue; the id is taken on trust and is
//! never checked against it.

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
  capacity::ProductStockProjection,
  id::ProductId,
  recipe::{NewRecipeItem, WriteMode},
  store::RecipeStore,
};
use serde::Deserialize;

use crate::{ApiState, Backend, error::ApiError};

// ─── Recipe creation ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RecipeBody {
  pub items: Vec<NewRecipeItem>,
  #[serde(default)]
  pub mode:  WriteMode,
}

/// `POST /products/{id}/recipe`
///
/// Answers 201 with the write report, or 422 with the same report when lines
/// failed and none were written.
pub async fn create_recipe<S: Backend>(
  State(state): State<ApiState<S>>,
  path: Result<Path<ProductId>, PathRejection>,
  body: Result<Json<RecipeBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Path(product_id) = path?;
  let Json(RecipeBody { items, mode }) = body?;

  if items.is_empty() {
    return Err(ApiError::BadRequest("items must not be empty".into()));
  }
  for (index, item) in items.iter().enumerate() {
    item
      .validate()
      .map_err(|e| ApiError::BadRequest(format!("item {index}: {e}")))?;
  }

  let report = state
    .store
    .add_recipe(product_id, items, mode)
    .await
    .map_err(ApiError::store)?;

  let status = if report.is_complete() || !report.inserted.is_empty() {
    StatusCode::CREATED
  } else {
    StatusCode::UNPROCESSABLE_ENTITY
  };
  Ok((status, Json(report)))
}

// ─── Capacity ────────────────────────────────────────────────────────────────

/// `GET /products/{id}/capacity`
pub async fn capacity<S: Backend>(
  State(state): State<ApiState<S>>,
  path: Result<Path<ProductId>, PathRejection>,
) -> Result<Json<ProductStockProjection>, ApiError> {
  let Path(product_id) = path?;
  Ok(Json(state.projector.compute(product_id).await?))
}
