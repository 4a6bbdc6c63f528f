//! Language reads and syncs.

use quran_core::{
  language::{Direction, Language},
  source::{CachePolicy, ContentSource},
  store::{LanguageQuery, QuranStore, Upsert},
};
use tracing::{debug, info};

use crate::{Catalog, Error, MIN_SEARCH_LEN, Result};

impl<S, A> Catalog<S, A>
where
  S: QuranStore,
  A: ContentSource,
{
  /// Sync languages when none are stored.
  async fn ensure_languages(&self) -> Result<()> {
    let stored = self.store.count_languages().await.map_err(Error::store)?;
    if stored > 0 {
      debug!(stored, "language coverage complete");
      return Ok(());
    }
    self.fetch_languages(CachePolicy::Cached).await.map(drop)
  }

  async fn fetch_languages(&self, policy: CachePolicy) -> Result<usize> {
    let languages = self.source.languages(policy).await?;
    if languages.is_empty() {
      return Ok(0);
    }
    let batch = languages
      .into_iter()
      .map(|l| Upsert::Language(l.with_name_fallback()))
      .collect();
    let outcome = self.store.apply(batch).await.map_err(Error::store)?;
    info!(languages = outcome.languages, "languages synced");
    Ok(outcome.languages)
  }

  async fn list_languages(&self, query: LanguageQuery) -> Result<Vec<Language>> {
    self.ensure_languages().await?;
    self.store.list_languages(&query).await.map_err(Error::store)
  }

  /// Every language, ordered by name.
  pub async fn languages(&self) -> Result<Vec<Language>> {
    self.list_languages(LanguageQuery::default()).await
  }

  /// A language by ISO code, case-insensitively.
  pub async fn language_by_iso(&self, iso_code: &str) -> Result<Option<Language>> {
    self.ensure_languages().await?;
    self.store.get_language(iso_code).await.map_err(Error::store)
  }

  pub async fn search_languages(&self, term: &str) -> Result<Vec<Language>> {
    let term = term.trim();
    if term.chars().count() < MIN_SEARCH_LEN {
      return Err(Error::Validation(format!(
        "search term must be at least {MIN_SEARCH_LEN} characters"
      )));
    }
    self
      .list_languages(LanguageQuery { text: Some(term.to_owned()), ..Default::default() })
      .await
  }

  pub async fn languages_by_direction(&self, direction: Direction) -> Result<Vec<Language>> {
    self
      .list_languages(LanguageQuery { direction: Some(direction), ..Default::default() })
      .await
  }

  /// Re-fetch every language past the response cache and overwrite it.
  /// Returns the number of rows written.
  pub async fn sync_languages(&self) -> Result<usize> {
    info!("language sync requested");
    self.fetch_languages(CachePolicy::Refresh).await
  }
}
