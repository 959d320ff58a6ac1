//! HTTP Basic-auth guard for administrative endpoints.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

use crate::{ApiState, Backend, error::ApiError};

/// Credentials for the administrative endpoints.
#[derive(Clone)]
pub struct AdminAuth {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Zero-size marker: present in the handler means the caller is an
/// administrator, or no admin credentials are configured.
pub struct Admin;

/// Split an `Authorization: Basic …` header into `(username, password)`.
///
/// Any malformed header yields `None`.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let decoded = B64.decode(value.strip_prefix("Basic ")?).ok()?;
  let pair = String::from_utf8(decoded).ok()?;
  let (username, password) = pair.split_once(':')?;
  Some((username.to_owned(), password.to_owned()))
}

impl AdminAuth {
  /// Whether `password` matches the stored argon2 hash. A malformed hash
  /// matches nothing.
  fn password_matches(&self, password: &str) -> bool {
    PasswordHash::new(&self.password_hash).is_ok_and(|hash| {
      Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
    })
  }
}

/// Verify HTTP Basic credentials in `headers` against `auth`.
pub fn verify_basic(headers: &HeaderMap, auth: &AdminAuth) -> Result<(), ApiError> {
  match basic_credentials(headers) {
    Some((username, password))
      if username == auth.username && auth.password_matches(&password) =>
    {
      Ok(())
    }
    _ => Err(ApiError::Unauthorized),
  }
}

impl<S: Backend> FromRequestParts<ApiState<S>> for Admin {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    if let Some(auth) = &state.admin {
      verify_basic(&parts.headers, auth).inspect_err(|_| {
        tracing::warn!(path = %parts.uri.path(), "rejected admin credentials");
      })?;
    }
    Ok(Admin)
  }
}
