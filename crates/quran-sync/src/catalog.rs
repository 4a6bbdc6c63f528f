//! [`Catalog`] and its coverage step.

use quran_core::{
  source::{CachePolicy, ContentSource},
  store::{BatchOutcome, QuranStore, SyncBatch, Upsert},
};
use serde::Serialize;
use tracing::{debug, info};

use crate::{Error, Result};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
  /// Language used when a request names none.
  pub default_language:  String,
  /// Language whose names stand in when the requested one has no row.
  pub fallback_language: String,
}

impl Default for CatalogConfig {
  fn default() -> Self {
    Self { default_language: "en".to_owned(), fallback_language: "en".to_owned() }
  }
}

// ─── Coverage ────────────────────────────────────────────────────────────────

/// What the coverage step decided to pull for a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
  /// Store already covers the language; no upstream call.
  Covered,
  /// No chapters stored: chapters and names.
  Full,
  /// Chapters stored, no names in the language.
  TranslationsOnly,
  /// Fewer names than chapters: fill the gaps without overwriting.
  MissingTranslations,
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// Reads served from the store, backfilled from the upstream on demand.
///
/// No lock is held between the coverage check and the write. Concurrent
/// duplicate syncs converge because every write is a keyed upsert.
pub struct Catalog<S, A> {
  pub(crate) store:  S,
  pub(crate) source: A,
  pub(crate) config: CatalogConfig,
}

impl<S, A> Catalog<S, A>
where
  S: QuranStore,
  A: ContentSource,
{
  pub fn new(store: S, source: A, config: CatalogConfig) -> Self {
    Self { store, source, config }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn source(&self) -> &A { &self.source }

  pub fn config(&self) -> &CatalogConfig { &self.config }

  /// `language`, or the configured default when absent or blank.
  pub fn language<'a>(&'a self, language: Option<&'a str>) -> &'a str {
    match language.map(str::trim) {
      Some(l) if !l.is_empty() => l,
      _ => &self.config.default_language,
    }
  }

  /// Bring the store's chapter list up to coverage for `language`.
  ///
  /// Coverage is judged by row counts alone: a store with as many names as
  /// chapters is considered complete even if the names belong to chapters
  /// that are not stored.
  pub async fn ensure_chapters(&self, language: &str) -> Result<SyncAction> {
    let chapters = self.store.count_chapters().await.map_err(Error::store)?;
    let action = if chapters == 0 {
      SyncAction::Full
    } else {
      let names = self
        .store
        .count_translations(language)
        .await
        .map_err(Error::store)?;
      if names == 0 {
        SyncAction::TranslationsOnly
      } else if names < chapters {
        SyncAction::MissingTranslations
      } else {
        SyncAction::Covered
      }
    };

    if action == SyncAction::Covered {
      debug!(language, chapters, "chapter coverage complete");
      return Ok(action);
    }

    info!(language, ?action, "syncing chapter list from upstream");
    self.sync_list(language, action, CachePolicy::Cached).await?;
    Ok(action)
  }

  /// Fetch the chapter list and write what `action` calls for.
  pub(crate) async fn sync_list(
    &self,
    language: &str,
    action: SyncAction,
    policy: CachePolicy,
  ) -> Result<BatchOutcome> {
    let listed = self.source.chapters(language, policy).await?;

    let batch: SyncBatch = listed
      .iter()
      .flat_map(|sc| {
        let chapter = (action == SyncAction::Full).then(|| Upsert::Chapter(sc.chapter.clone()));
        let name = sc.translated_name(language).map(|n| match action {
          SyncAction::MissingTranslations => Upsert::MissingTranslatedName(n),
          _ => Upsert::TranslatedName(n),
        });
        chapter.into_iter().chain(name)
      })
      .collect();

    if batch.is_empty() {
      return Ok(BatchOutcome::default());
    }

    let outcome = self.store.apply(batch).await.map_err(Error::store)?;
    info!(
      language,
      listed = listed.len(),
      chapters = outcome.chapters,
      translations = outcome.translations,
      "chapter list synced"
    );
    Ok(outcome)
  }
}
