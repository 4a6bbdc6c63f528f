//! Upstream connection settings and cache lifetimes.

use std::{fmt, time::Duration};

use serde::Deserialize;

fn default_api_prefix() -> String { "/content/api/v4".to_owned() }

fn default_scope() -> String { "content".to_owned() }

fn default_timeout_secs() -> u64 { 30 }

/// Where the content API and its OAuth endpoint live, and how to authenticate.
#[derive(Clone, Deserialize)]
pub struct UpstreamConfig {
  pub base_url:      String,
  pub oauth_url:     String,
  #[serde(default = "default_api_prefix")]
  pub api_prefix:    String,
  pub client_id:     String,
  pub client_secret: String,
  #[serde(default = "default_scope")]
  pub scope:         String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:  u64,
}

impl UpstreamConfig {
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

impl fmt::Debug for UpstreamConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("UpstreamConfig")
      .field("base_url", &self.base_url)
      .field("oauth_url", &self.oauth_url)
      .field("api_prefix", &self.api_prefix)
      .field("client_id", &self.client_id)
      .field("client_secret", &"<redacted>")
      .field("scope", &self.scope)
      .field("timeout_secs", &self.timeout_secs)
      .finish()
  }
}

/// Cache lifetimes, in seconds.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TtlConfig {
  /// Ceiling on the token lifetime; the upstream's `expires_in` wins if
  /// shorter.
  pub token:        u64,
  /// Subtracted from the token lifetime so a token is dropped before the
  /// upstream expires it.
  pub token_margin: u64,
  pub chapters:     u64,
  pub chapter:      u64,
  pub chapter_info: u64,
  pub languages:    u64,
}

impl Default for TtlConfig {
  fn default() -> Self {
    Self {
      token:        3500,
      token_margin: 60,
      chapters:     86_400,
      chapter:      86_400,
      chapter_info: 86_400,
      languages:    86_400,
    }
  }
}

impl TtlConfig {
  /// Lifetime for a token the upstream declared valid for `expires_in`
  /// seconds. Never shorter than one second.
  pub fn token_ttl(&self, expires_in: Option<u64>) -> Duration {
    let declared = expires_in.map_or(self.token, |e| e.min(self.token));
    Duration::from_secs(declared.saturating_sub(self.token_margin).max(1))
  }

  pub fn chapters(&self) -> Duration { Duration::from_secs(self.chapters) }

  pub fn chapter(&self) -> Duration { Duration::from_secs(self.chapter) }

  pub fn chapter_info(&self) -> Duration { Duration::from_secs(self.chapter_info) }

  pub fn languages(&self) -> Duration { Duration::from_secs(self.languages) }
}
