//! Chapter reads and syncs.

use quran_core::{
  SourceError,
  chapter::{ChapterId, ChapterInfo, ChapterView, RevelationPlace},
  source::{CachePolicy, ContentSource},
  store::{BatchOutcome, ChapterOrder, ChapterQuery, QuranStore, SyncBatch, Upsert},
};
use tracing::{debug, info, warn};

use crate::{Catalog, Error, MIN_SEARCH_LEN, Result, SyncAction};

impl<S, A> Catalog<S, A>
where
  S: QuranStore,
  A: ContentSource,
{
  fn query(&self, language: &str) -> ChapterQuery {
    ChapterQuery {
      fallback_language: Some(self.config.fallback_language.clone()),
      ..ChapterQuery::new(language)
    }
  }

  async fn list(&self, query: ChapterQuery) -> Result<Vec<ChapterView>> {
    self.ensure_chapters(&query.language).await?;
    self.store.list_chapters(&query).await.map_err(Error::store)
  }

  // ── Collection reads ──────────────────────────────────────────────────────

  /// Every chapter ordered by id, with names in `language`.
  pub async fn chapters(&self, language: &str) -> Result<Vec<ChapterView>> {
    self.list(self.query(language)).await
  }

  /// Chapters whose names contain `term`. Rejects terms shorter than
  /// [`MIN_SEARCH_LEN`] characters.
  pub async fn search_chapters(&self, term: &str, language: &str) -> Result<Vec<ChapterView>> {
    let term = term.trim();
    if term.chars().count() < MIN_SEARCH_LEN {
      return Err(Error::Validation(format!(
        "search term must be at least {MIN_SEARCH_LEN} characters"
      )));
    }
    self
      .list(ChapterQuery { text: Some(term.to_owned()), ..self.query(language) })
      .await
  }

  pub async fn chapters_by_place(
    &self,
    place: RevelationPlace,
    language: &str,
  ) -> Result<Vec<ChapterView>> {
    self
      .list(ChapterQuery { place: Some(place), ..self.query(language) })
      .await
  }

  pub async fn chapters_by_revelation_order(&self, language: &str) -> Result<Vec<ChapterView>> {
    self
      .list(ChapterQuery { order: ChapterOrder::RevelationOrder, ..self.query(language) })
      .await
  }

  // ── Single-entity reads ───────────────────────────────────────────────────

  /// One chapter with its name in `language`.
  ///
  /// Syncs the chapter when it is not stored or lacks a name in `language`.
  /// `None` when the upstream does not know it either.
  pub async fn chapter(&self, id: ChapterId, language: &str) -> Result<Option<ChapterView>> {
    let fallback = self.config.fallback_language.as_str();
    let stored = self
      .store
      .get_chapter(id, language, Some(fallback))
      .await
      .map_err(Error::store)?;

    if let Some(view) = stored
      && view.has_translation(language)
    {
      return Ok(Some(view));
    }

    debug!(chapter_id = %id, language, "chapter not covered locally");
    self.sync_chapter(id, language, CachePolicy::Cached).await?;
    self
      .store
      .get_chapter(id, language, Some(fallback))
      .await
      .map_err(Error::store)
  }

  /// Descriptive info for a chapter in `language`.
  ///
  /// Info is synced only when no row exists for `(id, language)` at all. The
  /// row for `locale` is preferred; otherwise the first stored row is used.
  pub async fn chapter_info(
    &self,
    id: ChapterId,
    language: &str,
    locale: Option<&str>,
  ) -> Result<Option<ChapterInfo>> {
    if self.chapter(id, language).await?.is_none() {
      return Ok(None);
    }

    let mut rows = self
      .store
      .chapter_infos(id, language)
      .await
      .map_err(Error::store)?;

    if rows.is_empty() {
      debug!(chapter_id = %id, language, ?locale, "chapter info not stored");
      self.sync_info(id, language, locale).await?;
      rows = self
        .store
        .chapter_infos(id, language)
        .await
        .map_err(Error::store)?;
    }

    let exact = rows.iter().position(|r| r.locale.as_deref() == locale);
    Ok(match exact {
      Some(i) => Some(rows.swap_remove(i)),
      None => rows.into_iter().next(),
    })
  }

  // ── Syncs ─────────────────────────────────────────────────────────────────

  /// Re-fetch one chapter past the response cache and overwrite it.
  pub async fn refresh_chapter(
    &self,
    id: ChapterId,
    language: &str,
  ) -> Result<Option<ChapterView>> {
    info!(chapter_id = %id, language, "refreshing chapter");
    if !self.sync_chapter(id, language, CachePolicy::Refresh).await? {
      warn!(chapter_id = %id, "upstream no longer has chapter");
      return Ok(None);
    }
    self
      .store
      .get_chapter(id, language, Some(&self.config.fallback_language))
      .await
      .map_err(Error::store)
  }

  /// Re-fetch the whole chapter list past the response cache and overwrite
  /// every chapter and name, regardless of coverage.
  pub async fn sync_all(&self, language: &str) -> Result<BatchOutcome> {
    info!(language, "full chapter sync requested");
    self
      .sync_list(language, SyncAction::Full, CachePolicy::Refresh)
      .await
  }

  /// Fetch one chapter and upsert it with its name. `false` when the upstream
  /// does not have it; a record for a different chapter is a transport error
  /// and nothing is written.
  pub(crate) async fn sync_chapter(
    &self,
    id: ChapterId,
    language: &str,
    policy: CachePolicy,
  ) -> Result<bool> {
    let Some(fetched) = self.source.chapter(id, language, policy).await? else {
      debug!(chapter_id = %id, language, "upstream has no such chapter");
      return Ok(false);
    };
    if fetched.chapter.id != id {
      warn!(chapter_id = %id, returned = %fetched.chapter.id, "upstream returned another chapter");
      return Err(Error::Source(SourceError::transport(
        None,
        format!("upstream returned chapter {} for chapter {id}", fetched.chapter.id),
      )));
    }

    let mut batch = SyncBatch::new();
    let name = fetched.translated_name(language);
    batch.push(Upsert::Chapter(fetched.chapter));
    if let Some(name) = name {
      batch.push(Upsert::TranslatedName(name));
    }
    self.store.apply(batch).await.map_err(Error::store)?;

    info!(chapter_id = %id, language, "chapter synced");
    Ok(true)
  }

  /// Fetch info for one chapter and upsert it. `false` when the upstream has
  /// none.
  pub(crate) async fn sync_info(
    &self,
    id: ChapterId,
    language: &str,
    locale: Option<&str>,
  ) -> Result<bool> {
    let Some(fetched) = self.source.chapter_info(id, language, locale).await? else {
      debug!(chapter_id = %id, language, ?locale, "upstream has no info");
      return Ok(false);
    };

    let batch = SyncBatch::from_iter([Upsert::ChapterInfo(fetched.into_info(language, locale))]);
    let outcome = self.store.apply(batch).await.map_err(Error::store)?;

    info!(chapter_id = %id, language, ?locale, "chapter info synced");
    Ok(outcome.infos > 0)
  }
}
