//! [`ContentApi`]: the typed, cache-fronted view of the content API.

use std::time::Duration;

use quran_core::{
  SourceError,
  cache::{LANGUAGES_KEY, ResponseCache, chapter_info_key, chapter_key, chapters_key},
  chapter::ChapterId,
  language::Language,
  source::{CachePolicy, ContentSource, SourceChapter, SourceInfo},
};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::{
  Result,
  cache::get_or_fetch,
  config::TtlConfig,
  dto::{ChapterEnvelope, ChapterInfoEnvelope, ChaptersEnvelope, LanguagesEnvelope, decode},
  remote::RemoteClient,
};

/// [`RemoteClient`] behind a [`ResponseCache`], decoding payloads into
/// domain types.
pub struct ContentApi<C> {
  remote: RemoteClient,
  cache:  C,
  ttl:    TtlConfig,
}

impl<C: ResponseCache> ContentApi<C> {
  pub fn new(remote: RemoteClient, cache: C, ttl: TtlConfig) -> Self {
    Self { remote, cache, ttl }
  }

  pub fn remote(&self) -> &RemoteClient { &self.remote }

  pub fn cache(&self) -> &C { &self.cache }

  /// Fetch `path` through the cache and decode it as `T`.
  ///
  /// A payload that fails to decode is evicted before the error returns.
  async fn cached<T: DeserializeOwned>(
    &self,
    key: &str,
    ttl: Duration,
    policy: CachePolicy,
    path: &str,
    query: &[(&str, &str)],
  ) -> Result<Option<T>> {
    if policy == CachePolicy::Refresh {
      info!(key, "refreshing cached response");
      self.evict(key).await;
    }

    let fetched = get_or_fetch(&self.cache, key, ttl, || self.remote.request(path, query)).await?;
    let Some(payload) = fetched else {
      return Ok(None);
    };

    match decode(payload) {
      Ok(decoded) => Ok(Some(decoded)),
      Err(e) => {
        warn!(key, error = %e, "evicting undecodable response");
        self.evict(key).await;
        Err(e)
      }
    }
  }

  async fn evict(&self, key: &str) {
    if let Err(e) = self.cache.invalidate(key).await {
      warn!(key, error = %e, "response cache invalidation failed");
    }
  }
}

impl<C: ResponseCache> ContentSource for ContentApi<C> {
  async fn chapters(
    &self,
    language: &str,
    policy: CachePolicy,
  ) -> Result<Vec<SourceChapter>, SourceError> {
    let key = chapters_key(language);
    let envelope: Option<ChaptersEnvelope> = self
      .cached(&key, self.ttl.chapters(), policy, "chapters", &[("language", language)])
      .await?;

    let Some(envelope) = envelope else {
      return Ok(Vec::new());
    };
    Ok(envelope.chapters.into_iter().map(SourceChapter::from).collect())
  }

  async fn chapter(
    &self,
    id: ChapterId,
    language: &str,
    policy: CachePolicy,
  ) -> Result<Option<SourceChapter>, SourceError> {
    let key = chapter_key(id, language);
    let path = format!("chapters/{id}");
    let envelope: Option<ChapterEnvelope> = self
      .cached(&key, self.ttl.chapter(), policy, &path, &[("language", language)])
      .await?;

    Ok(envelope.map(|e| SourceChapter::from(e.chapter)))
  }

  async fn chapter_info(
    &self,
    id: ChapterId,
    language: &str,
    locale: Option<&str>,
  ) -> Result<Option<SourceInfo>, SourceError> {
    let key = chapter_info_key(id, language, locale);
    let path = format!("chapters/{id}/info");
    let mut query = vec![("language", language)];
    if let Some(locale) = locale {
      query.push(("locale", locale));
    }

    let envelope: Option<ChapterInfoEnvelope> = self
      .cached(&key, self.ttl.chapter_info(), CachePolicy::Cached, &path, &query)
      .await?;

    Ok(envelope.map(|e| SourceInfo::from(e.chapter_info)))
  }

  async fn languages(&self, policy: CachePolicy) -> Result<Vec<Language>, SourceError> {
    let envelope: Option<LanguagesEnvelope> = self
      .cached(LANGUAGES_KEY, self.ttl.languages(), policy, "resources/languages", &[])
      .await?;

    let Some(envelope) = envelope else {
      return Ok(Vec::new());
    };
    Ok(envelope.languages.into_iter().map(Language::from).collect())
  }
}

#[cfg(test)]
mod tests {
  use httpmock::{
    Method::{GET, POST},
    MockServer,
  };
  use serde_json::{Value, json};

  use super::*;
  use crate::{UpstreamConfig, cache::MemoryCache};

  fn chapter_json(id: u8, name: &str) -> Value {
    json!({
      "id": id,
      "revelation_place": "makkah",
      "revelation_order": 5,
      "bismillah_pre": false,
      "name_simple": "Al-Fatihah",
      "name_complex": "Al-Fātiĥah",
      "name_arabic": "الفاتحة",
      "verses_count": 7,
      "pages": [1, 1],
      "translated_name": { "language_name": "english", "name": name }
    })
  }

  async fn api_for(server: &MockServer) -> ContentApi<MemoryCache> {
    server
      .mock_async(|when, then| {
        when.method(POST).path("/oauth2/token");
        then.status(200).json_body(json!({ "access_token": "tok", "expires_in": 3600 }));
      })
      .await;
    let upstream = UpstreamConfig {
      base_url:      server.base_url(),
      oauth_url:     server.url("/oauth2/token"),
      api_prefix:    "/content/api/v4".into(),
      client_id:     "client-id".into(),
      client_secret: "client-secret".into(),
      scope:         "content".into(),
      timeout_secs:  5,
    };
    let ttl = TtlConfig::default();
    ContentApi::new(RemoteClient::new(&upstream, ttl).unwrap(), MemoryCache::new(), ttl)
  }

  #[tokio::test]
  async fn chapters_are_decoded_and_cached() {
    let server = MockServer::start_async().await;
    let api = api_for(&server).await;
    let list = server
      .mock_async(|when, then| {
        when
          .method(GET)
          .path("/content/api/v4/chapters")
          .query_param("language", "en");
        then.status(200).json_body(json!({ "chapters": [chapter_json(1, "The Opener")] }));
      })
      .await;

    let first = api.chapters("en", CachePolicy::Cached).await.unwrap();
    let second = api.chapters("en", CachePolicy::Cached).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].translated_name.as_ref().unwrap().name, "The Opener");
    assert_eq!(list.hits_async().await, 1);

    api.chapters("en", CachePolicy::Refresh).await.unwrap();
    assert_eq!(list.hits_async().await, 2);
  }

  #[tokio::test]
  async fn missing_chapter_is_none_and_refetched() {
    let server = MockServer::start_async().await;
    let api = api_for(&server).await;
    let missing = server
      .mock_async(|when, then| {
        when.method(GET).path("/content/api/v4/chapters/5");
        then.status(404);
      })
      .await;

    let id = ChapterId::new(5).unwrap();
    assert_eq!(api.chapter(id, "en", CachePolicy::Cached).await.unwrap(), None);
    assert_eq!(api.chapter(id, "en", CachePolicy::Cached).await.unwrap(), None);
    assert_eq!(missing.hits_async().await, 2);
  }

  #[tokio::test]
  async fn chapter_info_passes_locale() {
    let server = MockServer::start_async().await;
    let api = api_for(&server).await;
    let info = server
      .mock_async(|when, then| {
        when
          .method(GET)
          .path("/content/api/v4/chapters/1/info")
          .query_param("language", "en")
          .query_param("locale", "en_US");
        then.status(200).json_body(json!({
          "chapter_info": {
            "id": 1, "chapter_id": 1, "language_name": "english",
            "short_text": "The opening", "source": "Tafhim", "text": "<p>...</p>"
          }
        }));
      })
      .await;

    let got = api
      .chapter_info(ChapterId::new(1).unwrap(), "en", Some("en_US"))
      .await
      .unwrap()
      .unwrap();
    assert_eq!(got.short_text, "The opening");
    assert_eq!(got.language_name.as_deref(), Some("english"));
    assert_eq!(info.hits_async().await, 1);
    assert!(api.cache().get("quran_chapter_info_1_en_en_US").await.unwrap().is_some());
  }

  #[tokio::test]
  async fn malformed_payload_is_transport_error() {
    let server = MockServer::start_async().await;
    let api = api_for(&server).await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/content/api/v4/resources/languages");
        then.status(200).json_body(json!({ "languages": "nope" }));
      })
      .await;

    let err = api.languages(CachePolicy::Cached).await.unwrap_err();
    assert!(matches!(err, SourceError::Transport { status: None, .. }), "got {err:?}");
  }

  #[tokio::test]
  async fn undecodable_payload_is_evicted_and_refetched() {
    let server = MockServer::start_async().await;
    let api = api_for(&server).await;
    let mut malformed = server
      .mock_async(|when, then| {
        when.method(GET).path("/content/api/v4/resources/languages");
        then.status(200).json_body(json!({ "languages": "nope" }));
      })
      .await;

    assert!(api.languages(CachePolicy::Cached).await.is_err());
    assert!(api.cache().get(LANGUAGES_KEY).await.unwrap().is_none());
    malformed.delete_async().await;

    let valid = server
      .mock_async(|when, then| {
        when.method(GET).path("/content/api/v4/resources/languages");
        then.status(200).json_body(json!({
          "languages": [{
            "id": 38, "name": "English", "iso_code": "en",
            "native_name": "English", "direction": "ltr", "translations_count": 12
          }]
        }));
      })
      .await;

    let languages = api.languages(CachePolicy::Cached).await.unwrap();
    assert_eq!(languages.len(), 1);
    assert_eq!(languages[0].iso_code, "en");
    assert_eq!(valid.hits_async().await, 1);
  }
}
