//! OAuth2 client-credentials token, cached until shortly before it expires.

use moka::future::Cache;
use reqwest::Client;
use tracing::{debug, error, info};

use crate::{
  Error, Result,
  config::{TtlConfig, UpstreamConfig},
  dto::AccessTokenResponse,
  ttl::{Expiring, ttl_cache},
};

const TOKEN_KEY: &str = "quran_api_access_token";

/// Obtains and caches the bearer token used against the content API.
///
/// Holds no lock across the grant: two callers racing on an empty cache both
/// perform a grant and the later one wins the slot.
#[derive(Debug)]
pub struct TokenCache {
  http:          Client,
  token_url:     String,
  client_id:     String,
  client_secret: String,
  scope:         String,
  ttl:           TtlConfig,
  tokens:        Cache<String, Expiring<String>>,
}

impl TokenCache {
  pub fn new(http: Client, upstream: &UpstreamConfig, ttl: TtlConfig) -> Self {
    Self {
      http,
      token_url: upstream.oauth_url.clone(),
      client_id: upstream.client_id.clone(),
      client_secret: upstream.client_secret.clone(),
      scope: upstream.scope.clone(),
      ttl,
      tokens: ttl_cache(1),
    }
  }

  /// The cached token, or a freshly granted one.
  pub async fn token(&self) -> Result<String> {
    if let Some(cached) = self.tokens.get(TOKEN_KEY).await {
      return Ok(cached.value);
    }

    let grant = self.grant().await?;
    let ttl = self.ttl.token_ttl(grant.expires_in);
    debug!(ttl_secs = ttl.as_secs(), "caching access token");
    self
      .tokens
      .insert(TOKEN_KEY.to_owned(), Expiring::new(grant.access_token.clone(), ttl))
      .await;
    Ok(grant.access_token)
  }

  /// Drop the cached token so the next [`Self::token`] re-authenticates.
  pub async fn invalidate(&self) {
    debug!("invalidating cached access token");
    self.tokens.invalidate(TOKEN_KEY).await;
  }

  #[cfg(test)]
  pub(crate) async fn seed(&self, token: &str, ttl: std::time::Duration) {
    self.tokens.insert(TOKEN_KEY.to_owned(), Expiring::new(token.to_owned(), ttl)).await;
  }

  async fn grant(&self) -> Result<AccessTokenResponse> {
    info!(token_url = %self.token_url, "requesting access token");

    let resp = self
      .http
      .post(&self.token_url)
      .basic_auth(&self.client_id, Some(&self.client_secret))
      .form(&[("grant_type", "client_credentials"), ("scope", self.scope.as_str())])
      .send()
      .await
      .map_err(|e| {
        error!(error = %e, "token request failed");
        Error::Authentication(format!("token request failed: {e}"))
      })?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      error!(status = status.as_u16(), %body, "token grant rejected");
      return Err(Error::Authentication(format!("token endpoint returned {status}")));
    }

    let grant: AccessTokenResponse = resp.json().await.map_err(|e| {
      error!(error = %e, "malformed token response");
      Error::Authentication(format!("malformed token response: {e}"))
    })?;

    if grant.access_token.is_empty() {
      return Err(Error::Authentication("token response carried an empty token".to_owned()));
    }

    Ok(grant)
  }
}
