//! The `QuranStore` trait and supporting query/batch types.
//!
//! The trait is implemented by storage backends (e.g. `quran-store-sqlite`).
//! The sync layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  chapter::{Chapter, ChapterId, ChapterInfo, ChapterView, RevelationPlace, TranslatedName},
  language::{Direction, Language},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Sort order for chapter listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChapterOrder {
  #[default]
  Id,
  RevelationOrder,
}

/// Parameters for [`QuranStore::list_chapters`].
#[derive(Debug, Clone, Default)]
pub struct ChapterQuery {
  /// Language whose translated names are attached to each view.
  pub language:          String,
  /// Used when a chapter has no name in `language`.
  pub fallback_language: Option<String>,
  /// Case-insensitive substring over the three chapter names and the
  /// translated name in `language`.
  pub text:              Option<String>,
  pub place:             Option<RevelationPlace>,
  pub order:             ChapterOrder,
}

impl ChapterQuery {
  pub fn new(language: impl Into<String>) -> Self {
    Self { language: language.into(), ..Default::default() }
  }
}

/// Parameters for [`QuranStore::list_languages`].
#[derive(Debug, Clone, Default)]
pub struct LanguageQuery {
  /// Case-insensitive substring over name and native name.
  pub text:      Option<String>,
  pub direction: Option<Direction>,
}

// ─── Write batches ───────────────────────────────────────────────────────────

/// One write in a [`SyncBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
  /// Insert or overwrite the chapter, reviving it if soft-deleted.
  Chapter(Chapter),
  /// Insert or overwrite the name. Skipped if the chapter is not stored.
  TranslatedName(TranslatedName),
  /// Insert the name only where no live row exists for
  /// `(chapter, language)`. Never overwrites.
  MissingTranslatedName(TranslatedName),
  /// Insert or overwrite the info row. Skipped if the chapter is not stored.
  ChapterInfo(ChapterInfo),
  /// Insert or overwrite the language, keyed by upstream id.
  Language(Language),
}

/// Writes that must land together or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncBatch {
  pub upserts: Vec<Upsert>,
}

impl SyncBatch {
  pub fn new() -> Self { Self::default() }

  pub fn push(&mut self, upsert: Upsert) { self.upserts.push(upsert); }

  pub fn len(&self) -> usize { self.upserts.len() }

  pub fn is_empty(&self) -> bool { self.upserts.is_empty() }
}

impl FromIterator<Upsert> for SyncBatch {
  fn from_iter<I: IntoIterator<Item = Upsert>>(iter: I) -> Self {
    Self { upserts: iter.into_iter().collect() }
  }
}

/// Rows actually written by [`QuranStore::apply`], per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
  pub chapters:     usize,
  pub translations: usize,
  pub infos:        usize,
  pub languages:    usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the local persistence of chapters, names, info and
/// languages.
///
/// Soft-deleted rows are invisible to every read and count.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait QuranStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Coverage ──────────────────────────────────────────────────────────

  /// Number of live chapters.
  fn count_chapters(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Number of live translated names in `language`.
  fn count_translations<'a>(
    &'a self,
    language: &'a str,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Number of live languages.
  fn count_languages(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// A chapter with its name in `language` (or `fallback`). `None` if the
  /// chapter is not stored.
  fn get_chapter<'a>(
    &'a self,
    id: ChapterId,
    language: &'a str,
    fallback: Option<&'a str>,
  ) -> impl Future<Output = Result<Option<ChapterView>, Self::Error>> + Send + 'a;

  /// Chapters matching `query`.
  fn list_chapters<'a>(
    &'a self,
    query: &'a ChapterQuery,
  ) -> impl Future<Output = Result<Vec<ChapterView>, Self::Error>> + Send + 'a;

  /// Every info row for `(id, language)`, null locale first.
  fn chapter_infos<'a>(
    &'a self,
    id: ChapterId,
    language: &'a str,
  ) -> impl Future<Output = Result<Vec<ChapterInfo>, Self::Error>> + Send + 'a;

  /// Languages matching `query`, ordered by name.
  fn list_languages<'a>(
    &'a self,
    query: &'a LanguageQuery,
  ) -> impl Future<Output = Result<Vec<Language>, Self::Error>> + Send + 'a;

  /// A language by ISO code.
  fn get_language<'a>(
    &'a self,
    iso_code: &'a str,
  ) -> impl Future<Output = Result<Option<Language>, Self::Error>> + Send + 'a;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Apply every upsert in `batch` inside one transaction.
  fn apply(
    &self,
    batch: SyncBatch,
  ) -> impl Future<Output = Result<BatchOutcome, Self::Error>> + Send + '_;

  /// Mark a chapter and its satellite rows deleted. Returns `false` if the
  /// chapter was not live.
  fn soft_delete_chapter(
    &self,
    id: ChapterId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
