//! Error type for `quran-sync`.

use quran_core::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The upstream could not be reached or refused us.
  #[error(transparent)]
  Source(#[from] SourceError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// Caller input rejected before any store or upstream access.
  #[error("{0}")]
  Validation(String),
}

impl Error {
  pub(crate) fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Error::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
