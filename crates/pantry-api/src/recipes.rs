//! Handlers for `/recipes` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/recipes?product_id=N` | Empty array for an unknown product |
//! | `POST` | `/recipes` | Body: [`CreateBody`]; 404 if the ingredient is missing |

use axum::{
  Json,
  extract::{
    Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use pantry_core::{
  id::ProductId,
  recipe::{NewRecipeItem, RecipeItem},
  store::RecipeStore,
};
use serde::Deserialize;

use crate::{ApiState, Backend, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub product_id: ProductId,
}

/// `GET /recipes?product_id=<id>`
pub async fn list<S: Backend>(
  State(state): State<ApiState<S>>,
  query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<RecipeItem>>, ApiError> {
  let Query(params) = query?;
  let items = state
    .store
    .get_recipe(params.product_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(items))
}

/// A single recipe line plus the product it belongs to.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub product_id: ProductId,
  #[serde(flatten)]
  pub item:       NewRecipeItem,
}

/// `POST /recipes`
pub async fn create<S: Backend>(
  State(state): State<ApiState<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(CreateBody { product_id, item }) = body?;
  item.validate()?;

  let ingredient_id = item.ingredient_id;
  let created = state
    .store
    .add_recipe_item(product_id, item)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("ingredient {ingredient_id} not found"))
    })?;
  Ok((StatusCode::CREATED, Json(created)))
}
