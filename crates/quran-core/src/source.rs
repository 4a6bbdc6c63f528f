//! The `ContentSource` trait: the upstream content API as seen by the sync
//! layer.
//!
//! Implemented by `quran-client` (HTTP + response cache) and, for tests, by
//! [`crate::fixture::FixtureSource`]. Absence is `Ok(None)` (or an empty list),
//! never an error.

use std::future::Future;

use crate::{
  chapter::{Chapter, ChapterId, ChapterInfo, TranslatedName},
  error::SourceError,
  language::Language,
};

// ─── Payloads ────────────────────────────────────────────────────────────────

/// The name block the upstream attaches to each chapter for the requested
/// language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceName {
  pub language_name: String,
  pub name:          String,
}

/// A chapter exactly as the upstream returns it for one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceChapter {
  pub chapter:         Chapter,
  pub translated_name: Option<SourceName>,
}

impl SourceChapter {
  /// The translated-name row this payload yields for `language_code`.
  pub fn translated_name(&self, language_code: &str) -> Option<TranslatedName> {
    self.translated_name.as_ref().map(|n| TranslatedName {
      chapter_id:    self.chapter.id,
      language_code: language_code.to_owned(),
      language_name: n.language_name.clone(),
      name:          n.name.clone(),
    })
  }
}

/// Chapter info as the upstream returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
  pub chapter_id:    ChapterId,
  pub language_name: Option<String>,
  pub text:          String,
  pub short_text:    String,
  pub source:        String,
}

impl SourceInfo {
  /// Normalise into a persisted row. A missing language name falls back to
  /// the language code.
  pub fn into_info(self, language_code: &str, locale: Option<&str>) -> ChapterInfo {
    ChapterInfo {
      chapter_id:    self.chapter_id,
      language_code: language_code.to_owned(),
      language_name: self
        .language_name
        .unwrap_or_else(|| language_code.to_owned()),
      locale:        locale.map(str::to_owned),
      text:          self.text,
      short_text:    self.short_text,
      source:        self.source,
    }
  }
}

/// Whether a source may answer from its response cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
  #[default]
  Cached,
  /// Drop any cached payload for the key before fetching.
  Refresh,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Read access to the upstream content API.
pub trait ContentSource: Send + Sync {
  /// Every chapter with its name in `language`.
  fn chapters<'a>(
    &'a self,
    language: &'a str,
    policy: CachePolicy,
  ) -> impl Future<Output = Result<Vec<SourceChapter>, SourceError>> + Send + 'a;

  /// One chapter with its name in `language`; `None` if the upstream has no
  /// such chapter.
  fn chapter<'a>(
    &'a self,
    id: ChapterId,
    language: &'a str,
    policy: CachePolicy,
  ) -> impl Future<Output = Result<Option<SourceChapter>, SourceError>> + Send + 'a;

  /// Descriptive info for a chapter in `language` and optional `locale`.
  fn chapter_info<'a>(
    &'a self,
    id: ChapterId,
    language: &'a str,
    locale: Option<&'a str>,
  ) -> impl Future<Output = Result<Option<SourceInfo>, SourceError>> + Send + 'a;

  /// Every language the upstream offers.
  fn languages(
    &self,
    policy: CachePolicy,
  ) -> impl Future<Output = Result<Vec<Language>, SourceError>> + Send + '_;
}
