//! HTTP Basic-auth guard for admin routes.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use quran_core::{source::ContentSource, store::QuranStore};
use serde::Deserialize;
use tracing::warn;

use crate::{AppState, error::ApiError};

/// Credentials accepted for admin routes.
#[derive(Clone, Deserialize)]
pub struct AdminAuth {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

impl std::fmt::Debug for AdminAuth {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AdminAuth")
      .field("username", &self.username)
      .finish_non_exhaustive()
  }
}

/// Zero-size marker: present in the handler means the caller may run admin
/// operations.
pub struct Admin;

/// Verify Basic credentials in `headers` against `config`.
pub fn verify_basic(headers: &HeaderMap, config: &AdminAuth) -> Result<(), ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  if username != config.username {
    return Err(ApiError::Unauthorized);
  }

  let parsed_hash = PasswordHash::new(&config.password_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(())
}

impl<S, A> FromRequestParts<AppState<S, A>> for Admin
where
  S: QuranStore + 'static,
  A: ContentSource + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, A>,
  ) -> Result<Self, Self::Rejection> {
    let Some(admin) = &state.admin else {
      return Ok(Admin);
    };
    verify_basic(&parts.headers, admin).inspect_err(|_| {
      warn!(path = %parts.uri.path(), "rejected admin request");
    })?;
    Ok(Admin)
  }
}
