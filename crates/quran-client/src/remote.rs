//! Authenticated GET requests against the content API.

use reqwest::{Client, Response, StatusCode, header::ACCEPT};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::{
  Error, Result,
  config::{TtlConfig, UpstreamConfig},
  token::TokenCache,
};

/// Issues GETs with the cached token, re-authenticating exactly once on 401.
///
/// Cheap to share behind an `Arc`; the inner [`reqwest::Client`] pools
/// connections.
#[derive(Debug)]
pub struct RemoteClient {
  http:      Client,
  base:      String,
  client_id: String,
  tokens:    TokenCache,
}

impl RemoteClient {
  pub fn new(upstream: &UpstreamConfig, ttl: TtlConfig) -> Result<Self> {
    let http = Client::builder().timeout(upstream.timeout()).build()?;
    let base = format!(
      "{}/{}",
      upstream.base_url.trim_end_matches('/'),
      upstream.api_prefix.trim_matches('/'),
    );
    Ok(Self {
      tokens: TokenCache::new(http.clone(), upstream, ttl),
      http,
      base,
      client_id: upstream.client_id.clone(),
    })
  }

  pub fn tokens(&self) -> &TokenCache { &self.tokens }

  fn url(&self, path: &str) -> String {
    format!("{}/{}", self.base, path.trim_start_matches('/'))
  }

  /// `GET {base}/{path}?{query}`.
  ///
  /// Returns `Ok(None)` on 404. Any other non-2xx status after the single
  /// re-auth retry is [`Error::Status`].
  pub async fn request(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<Value>> {
    let url = self.url(path);

    let token = self.tokens.token().await?;
    let mut resp = self.send(&url, query, &token).await?;

    if resp.status() == StatusCode::UNAUTHORIZED {
      warn!(path, "upstream rejected access token; re-authenticating once");
      self.tokens.invalidate().await;
      let token = self.tokens.token().await?;
      resp = self.send(&url, query, &token).await?;
    }

    let status = resp.status();
    if status.is_success() {
      debug!(path, status = status.as_u16(), "upstream request succeeded");
      let body = resp
        .json::<Value>()
        .await
        .map_err(|e| Error::Decode(e.to_string()))?;
      return Ok(Some(body));
    }

    if status == StatusCode::NOT_FOUND {
      debug!(path, "upstream reports resource absent");
      return Ok(None);
    }

    let body = resp.text().await.unwrap_or_default();
    error!(path, status = status.as_u16(), %body, "upstream request failed");
    Err(Error::Status { status: status.as_u16(), body })
  }

  async fn send(&self, url: &str, query: &[(&str, &str)], token: &str) -> Result<Response> {
    debug!(url, ?query, "sending upstream request");
    let resp = self
      .http
      .get(url)
      .header("x-auth-token", token)
      .header("x-client-id", &self.client_id)
      .header(ACCEPT, "application/json")
      .query(query)
      .send()
      .await
      .inspect_err(|e| error!(url, error = %e, "upstream request did not complete"))?;
    Ok(resp)
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use httpmock::{
    Method::{GET, POST},
    MockServer,
  };
  use serde_json::json;

  use super::*;

  fn client_for(server: &MockServer) -> RemoteClient {
    let upstream = UpstreamConfig {
      base_url:      server.base_url(),
      oauth_url:     server.url("/oauth2/token"),
      api_prefix:    "/content/api/v4".into(),
      client_id:     "client-id".into(),
      client_secret: "client-secret".into(),
      scope:         "content".into(),
      timeout_secs:  5,
    };
    RemoteClient::new(&upstream, TtlConfig::default()).unwrap()
  }

  #[tokio::test]
  async fn sends_auth_and_client_headers() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(POST).path("/oauth2/token");
        then.status(200).json_body(json!({ "access_token": "tok", "expires_in": 3600 }));
      })
      .await;
    let chapters = server
      .mock_async(|when, then| {
        when
          .method(GET)
          .path("/content/api/v4/chapters")
          .query_param("language", "en")
          .header("x-auth-token", "tok")
          .header("x-client-id", "client-id")
          .header("accept", "application/json");
        then.status(200).json_body(json!({ "chapters": [] }));
      })
      .await;

    let client = client_for(&server);
    let body = client.request("chapters", &[("language", "en")]).await.unwrap();
    assert_eq!(body, Some(json!({ "chapters": [] })));
    assert_eq!(chapters.hits_async().await, 1);
  }

  #[tokio::test]
  async fn not_found_is_none() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(POST).path("/oauth2/token");
        then.status(200).json_body(json!({ "access_token": "tok", "expires_in": 3600 }));
      })
      .await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/content/api/v4/chapters/999");
        then.status(404).json_body(json!({ "message": "not found" }));
      })
      .await;

    let client = client_for(&server);
    assert_eq!(client.request("chapters/999", &[]).await.unwrap(), None);
  }

  #[tokio::test]
  async fn server_error_carries_status_and_body() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(POST).path("/oauth2/token");
        then.status(200).json_body(json!({ "access_token": "tok", "expires_in": 3600 }));
      })
      .await;
    let failing = server
      .mock_async(|when, then| {
        when.method(GET).path("/content/api/v4/chapters");
        then.status(502).body("bad gateway");
      })
      .await;

    let client = client_for(&server);
    match client.request("chapters", &[]).await {
      Err(Error::Status { status, body }) => {
        assert_eq!(status, 502);
        assert_eq!(body, "bad gateway");
      }
      other => panic!("expected status error, got {other:?}"),
    }
    assert_eq!(failing.hits_async().await, 1, "non-401 failures are not retried");
  }

  #[tokio::test]
  async fn unauthorized_reauthenticates_and_retries_once() {
    let server = MockServer::start_async().await;
    let grant = server
      .mock_async(|when, then| {
        when.method(POST).path("/oauth2/token");
        then.status(200).json_body(json!({ "access_token": "fresh", "expires_in": 3600 }));
      })
      .await;
    let stale = server
      .mock_async(|when, then| {
        when
          .method(GET)
          .path("/content/api/v4/chapters/1")
          .header("x-auth-token", "stale");
        then.status(401);
      })
      .await;
    let fresh = server
      .mock_async(|when, then| {
        when
          .method(GET)
          .path("/content/api/v4/chapters/1")
          .header("x-auth-token", "fresh");
        then.status(200).json_body(json!({ "chapter": { "id": 1 } }));
      })
      .await;

    let client = client_for(&server);
    client.tokens().seed("stale", Duration::from_secs(600)).await;

    let body = client.request("chapters/1", &[]).await.unwrap();
    assert_eq!(body, Some(json!({ "chapter": { "id": 1 } })));
    assert_eq!(stale.hits_async().await, 1);
    assert_eq!(grant.hits_async().await, 1);
    assert_eq!(fresh.hits_async().await, 1);

    // The fresh token is now cached.
    client.request("chapters/1", &[]).await.unwrap();
    assert_eq!(grant.hits_async().await, 1);
  }

  #[tokio::test]
  async fn persistent_unauthorized_fails_after_one_retry() {
    let server = MockServer::start_async().await;
    let grant = server
      .mock_async(|when, then| {
        when.method(POST).path("/oauth2/token");
        then.status(200).json_body(json!({ "access_token": "tok", "expires_in": 3600 }));
      })
      .await;
    let denied = server
      .mock_async(|when, then| {
        when.method(GET).path("/content/api/v4/chapters");
        then.status(401).body("denied");
      })
      .await;

    let client = client_for(&server);
    let err = client.request("chapters", &[]).await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 401, .. }), "got {err:?}");
    assert_eq!(denied.hits_async().await, 2);
    assert_eq!(grant.hits_async().await, 2);
  }

  #[tokio::test]
  async fn failed_grant_surfaces_as_authentication_error() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(POST).path("/oauth2/token");
        then.status(400).body("invalid_client");
      })
      .await;
    let content = server
      .mock_async(|when, then| {
        when.method(GET).path("/content/api/v4/chapters");
        then.status(200).json_body(json!({ "chapters": [] }));
      })
      .await;

    let client = client_for(&server);
    let err = client.request("chapters", &[]).await.unwrap_err();
    assert!(matches!(err, Error::Authentication(_)), "got {err:?}");
    assert_eq!(content.hits_async().await, 0);
  }
}
