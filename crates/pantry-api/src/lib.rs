//! JSON REST API for Pantry.
//!
//! Exposes an axum [`Router`] backed by any store implementing
//! [`LedgerStore`] and [`RecipeStore`]. TLS, timeouts and request tracing are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = ApiState::new(store.clone(), NegativeStockPolicy::Allow);
//! Router::new().merge(pantry_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod ingredients;
pub mod products;
pub mod recipes;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post},
};
use pantry_core::{
  adjustment::NegativeStockPolicy,
  capacity::CapacityProjector,
  ledger::StockAdjuster,
  store::{LedgerStore, RecipeStore},
};

pub use auth::AdminAuth;
pub use error::ApiError;

/// Everything a backend must provide to serve the API.
pub trait Backend: LedgerStore + RecipeStore + 'static {}

impl<T: LedgerStore + RecipeStore + 'static> Backend for T {}

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:     Arc<S>,
  pub adjuster:  StockAdjuster<S>,
  pub projector: CapacityProjector<S, S>,
  /// When `None`, administrative endpoints are open.
  pub admin:     Option<Arc<AdminAuth>>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      adjuster:  self.adjuster.clone(),
      projector: self.projector.clone(),
      admin:     self.admin.clone(),
    }
  }
}

impl<S: Backend> ApiState<S> {
  pub fn new(store: Arc<S>, policy: NegativeStockPolicy) -> Self {
    Self {
      adjuster: StockAdjuster::new(store.clone(), policy),
      projector: CapacityProjector::new(store.clone(), store.clone()),
      store,
      admin: None,
    }
  }

  /// Require `auth` on administrative endpoints.
  pub fn with_admin(mut self, auth: AdminAuth) -> Self {
    self.admin = Some(Arc::new(auth));
    self
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn api_router<S: Backend>(state: ApiState<S>) -> Router<()> {
  Router::new()
    // Ingredients
    .route(
      "/ingredients",
      get(ingredients::list::<S>).post(ingredients::create::<S>),
    )
    .route("/ingredients/low-stock", get(ingredients::low_stock::<S>))
    .route(
      "/ingredients/{id}",
      get(ingredients::get_one::<S>).put(ingredients::replace::<S>),
    )
    .route("/ingredients/{id}/adjust", patch(ingredients::adjust::<S>))
    .route("/ingredients/{id}/adjustments", get(ingredients::adjustments::<S>))
    // Recipes
    .route("/recipes", get(recipes::list::<S>).post(recipes::create::<S>))
    // Products
    .route("/products/{id}/recipe", post(products::create_recipe::<S>))
    .route("/products/{id}/capacity", get(products::capacity::<S>))
    .with_state(state)
}
