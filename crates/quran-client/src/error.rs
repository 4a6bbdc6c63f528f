//! Error type for `quran-client`.

use quran_core::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The client-credentials grant failed. Never retried here.
  #[error("authentication failed: {0}")]
  Authentication(String),

  /// A non-2xx, non-404 response after the single re-auth retry.
  #[error("upstream returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("malformed upstream payload: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for SourceError {
  fn from(e: Error) -> Self {
    match e {
      Error::Authentication(m) => SourceError::Authentication(m),
      Error::Status { status, body } => SourceError::transport(Some(status), body),
      Error::Http(e) => {
        SourceError::transport(e.status().map(|s| s.as_u16()), e.to_string())
      }
      Error::Decode(m) => SourceError::transport(None, format!("malformed payload: {m}")),
    }
  }
}
