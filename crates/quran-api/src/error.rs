//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use quran_core::SourceError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("upstream error: {0}")]
  Upstream(#[from] SourceError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<quran_sync::Error> for ApiError {
  fn from(e: quran_sync::Error) -> Self {
    match e {
      quran_sync::Error::Source(e) => ApiError::Upstream(e),
      quran_sync::Error::Store(e) => ApiError::Store(e),
      quran_sync::Error::Validation(m) => ApiError::Validation(m),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, summary, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, "Not found", m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, "Invalid request", m.clone()),
      ApiError::Validation(m) => {
        (StatusCode::UNPROCESSABLE_ENTITY, "Validation failed", m.clone())
      }
      ApiError::Unauthorized => {
        (StatusCode::UNAUTHORIZED, "Unauthorized", "admin credentials required".to_owned())
      }
      ApiError::Upstream(e) => {
        error!(error = %e, "upstream failure");
        (StatusCode::SERVICE_UNAVAILABLE, "Upstream unavailable", e.to_string())
      }
      ApiError::Store(e) => {
        error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, "Store failure", e.to_string())
      }
    };

    let mut res = (status, Json(json!({ "error": summary, "message": message }))).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"quran-admin\""),
      );
    }
    res
  }
}
