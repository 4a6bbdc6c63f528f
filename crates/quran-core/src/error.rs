//! Error types for `quran-core`.

use thiserror::Error;

/// A chapter number outside the fixed 1..=114 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid chapter id {0}: must be between 1 and 114")]
pub struct InvalidChapterId(pub i64);

/// Failure talking to the upstream content API.
///
/// "Not found" is not an error: sources report it as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
  /// The token grant was rejected, unreachable, or returned garbage.
  #[error("authentication failed: {0}")]
  Authentication(String),

  /// Non-2xx/non-404 after the re-auth retry, a network error, or an
  /// undecodable payload.
  #[error("upstream request failed{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
  Transport {
    status:  Option<u16>,
    message: String,
  },
}

impl SourceError {
  pub fn transport(status: Option<u16>, message: impl Into<String>) -> Self {
    SourceError::Transport { status, message: message.into() }
  }
}
