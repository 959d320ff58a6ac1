//! HTTP server assembly for Pantry.
//!
//! Turns a [`ServerConfig`] and a store handle into a ready-to-serve axum
//! [`Router`]: the JSON API from `pantry-api`, a `/health` probe, request
//! tracing and a request timeout.

pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use pantry_api::{AdminAuth, ApiState, Backend, api_router};
use pantry_core::adjustment::NegativeStockPolicy;
use serde::Deserialize;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `pantry.toml` and
/// `PANTRY_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  /// Whether adjustments may drive stock below zero.
  pub negative_stock:       NegativeStockPolicy,
  pub request_timeout_secs: u64,
  /// Admin credentials for `PUT /ingredients/{id}`. Both or neither.
  pub admin_username:       Option<String>,
  /// Argon2 PHC string, see `--hash-password`.
  pub admin_password_hash:  Option<String>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                 "127.0.0.1".to_string(),
      port:                 8080,
      store_path:           PathBuf::from("pantry.db"),
      negative_stock:       NegativeStockPolicy::default(),
      request_timeout_secs: 30,
      admin_username:       None,
      admin_password_hash:  None,
    }
  }
}

impl ServerConfig {
  /// The configured admin credentials, if any.
  pub fn admin(&self) -> Result<Option<AdminAuth>, Error> {
    match (&self.admin_username, &self.admin_password_hash) {
      (Some(username), Some(password_hash)) => Ok(Some(AdminAuth {
        username:      username.clone(),
        password_hash: password_hash.clone(),
      })),
      (None, None) => Ok(None),
      (Some(_), None) => {
        Err(Error::IncompleteAdmin { present: "admin_username" })
      }
      (None, Some(_)) => {
        Err(Error::IncompleteAdmin { present: "admin_password_hash" })
      }
    }
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the full application router for `store` under `config`.
pub fn app<S: Backend>(
  config: &ServerConfig,
  store: Arc<S>,
) -> Result<Router, Error> {
  let mut state = ApiState::new(store, config.negative_stock);
  if let Some(admin) = config.admin()? {
    state = state.with_admin(admin);
  }

  Ok(
    Router::new()
      .route("/health", get(health))
      .merge(api_router(state))
      .layer(TimeoutLayer::new(config.request_timeout()))
      .layer(TraceLayer::new_for_http()),
  )
}

async fn health() -> &'static str { "ok" }

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use pantry_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  async fn store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().await.unwrap())
  }

  fn parse(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = parse("");
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.negative_stock, NegativeStockPolicy::Allow);
    assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
    assert!(cfg.admin().unwrap().is_none());
  }

  #[test]
  fn config_file_overrides_defaults() {
    let cfg = parse(
      r#"
        port = 9000
        store_path = "/var/lib/pantry/pantry.db"
        negative_stock = "reject"
        request_timeout_secs = 5
      "#,
    );
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/pantry/pantry.db"));
    assert_eq!(cfg.negative_stock, NegativeStockPolicy::Reject);
    assert_eq!(cfg.request_timeout_secs, 5);
  }

  #[test]
  fn admin_requires_both_fields() {
    let cfg = parse(r#"admin_username = "admin""#);
    assert!(matches!(
      cfg.admin(),
      Err(Error::IncompleteAdmin { present: "admin_username" })
    ));

    let cfg = parse(
      r#"
        admin_username = "admin"
        admin_password_hash = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA"
      "#,
    );
    assert_eq!(cfg.admin().unwrap().unwrap().username, "admin");
  }

  #[tokio::test]
  async fn health_answers_ok() {
    let app = app(&ServerConfig::default(), store().await).unwrap();
    let resp = app
      .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = axum::body::to_bytes(resp.into_body(), 64).await.unwrap();
    assert_eq!(&body[..], b"ok");
  }

  #[tokio::test]
  async fn api_routes_are_mounted() {
    let app = app(&ServerConfig::default(), store().await).unwrap();
    let resp = app
      .oneshot(
        Request::builder()
          .uri("/ingredients")
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn incomplete_admin_config_refuses_to_build() {
    let cfg = ServerConfig {
      admin_password_hash: Some("hash".into()),
      ..ServerConfig::default()
    };
    assert!(app(&cfg, store().await).is_err());
  }
}
