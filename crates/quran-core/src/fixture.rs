//! A deterministic in-memory [`ContentSource`] for tests.
//!
//! Serves all 114 chapters with synthetic names and counts every call so tests
//! can assert exactly how often the upstream would have been hit.

use std::{
  collections::{HashMap, HashSet},
  sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  },
};

use crate::{
  chapter::{Chapter, ChapterId, RevelationPlace},
  error::SourceError,
  language::{Direction, Language, LanguageName},
  source::{CachePolicy, ContentSource, SourceChapter, SourceInfo, SourceName},
};

/// The synthetic chapter record for `id`.
pub fn chapter(id: ChapterId) -> Chapter {
  let n = u32::from(id.get());
  Chapter {
    id,
    revelation_place: if n % 3 == 0 { RevelationPlace::Madinah } else { RevelationPlace::Makkah },
    revelation_order: 115 - n,
    bismillah_pre: n != 1 && n != 9,
    name_simple: format!("Surah {n}"),
    name_complex: format!("Sūrah {n}"),
    name_arabic: format!("سورة {n}"),
    verses_count: 3 + n,
    pages: [n * 5, n * 5 + 4],
  }
}

/// The synthetic translated name for `id` in `language`.
pub fn translated_name(id: ChapterId, language: &str) -> String {
  format!("{language}:name-{id}")
}

fn language_name(language: &str) -> String {
  match language {
    "en" => "english".to_owned(),
    "ar" => "arabic".to_owned(),
    "fr" => "french".to_owned(),
    other => other.to_owned(),
  }
}

/// Per-operation call counters.
#[derive(Debug, Default)]
pub struct Calls {
  pub chapters:     AtomicUsize,
  pub chapter:      AtomicUsize,
  pub chapter_info: AtomicUsize,
  pub languages:    AtomicUsize,
  /// Calls made with [`CachePolicy::Refresh`].
  pub refreshes:    AtomicUsize,
}

impl Calls {
  pub fn total(&self) -> usize {
    self.chapters.load(Ordering::SeqCst)
      + self.chapter.load(Ordering::SeqCst)
      + self.chapter_info.load(Ordering::SeqCst)
      + self.languages.load(Ordering::SeqCst)
  }
}

#[derive(Debug, Default)]
pub struct FixtureSource {
  pub calls: Calls,
  missing:   Mutex<HashSet<ChapterId>>,
  no_info:   Mutex<HashSet<ChapterId>>,
  misrouted: Mutex<HashMap<ChapterId, ChapterId>>,
  failure:   Mutex<Option<SourceError>>,
}

impl FixtureSource {
  pub fn new() -> Self { Self::default() }

  /// Make the upstream report `id` as absent.
  pub fn without_chapter(self, id: ChapterId) -> Self {
    self.missing.lock().unwrap().insert(id);
    self
  }

  /// Keep `id` available but report no info for it.
  pub fn without_info(self, id: ChapterId) -> Self {
    self.no_info.lock().unwrap().insert(id);
    self
  }

  /// Answer requests for `requested` with the record for `served`.
  pub fn misrouted(self, requested: ChapterId, served: ChapterId) -> Self {
    self.misrouted.lock().unwrap().insert(requested, served);
    self
  }

  /// Make every subsequent call fail with `error` until [`Self::recover`].
  pub fn fail_with(&self, error: SourceError) {
    *self.failure.lock().unwrap() = Some(error);
  }

  pub fn recover(&self) { *self.failure.lock().unwrap() = None; }

  fn check(&self, policy: CachePolicy) -> Result<(), SourceError> {
    if policy == CachePolicy::Refresh {
      self.calls.refreshes.fetch_add(1, Ordering::SeqCst);
    }
    match self.failure.lock().unwrap().clone() {
      Some(e) => Err(e),
      None => Ok(()),
    }
  }

  fn is_missing(&self, id: ChapterId) -> bool { self.missing.lock().unwrap().contains(&id) }

  fn source_chapter(id: ChapterId, language: &str) -> SourceChapter {
    SourceChapter {
      chapter:         chapter(id),
      translated_name: Some(SourceName {
        language_name: language_name(language),
        name:          translated_name(id, language),
      }),
    }
  }
}

impl ContentSource for FixtureSource {
  async fn chapters(
    &self,
    language: &str,
    policy: CachePolicy,
  ) -> Result<Vec<SourceChapter>, SourceError> {
    self.calls.chapters.fetch_add(1, Ordering::SeqCst);
    self.check(policy)?;
    Ok(
      ChapterId::all()
        .filter(|id| !self.is_missing(*id))
        .map(|id| Self::source_chapter(id, language))
        .collect(),
    )
  }

  async fn chapter(
    &self,
    id: ChapterId,
    language: &str,
    policy: CachePolicy,
  ) -> Result<Option<SourceChapter>, SourceError> {
    self.calls.chapter.fetch_add(1, Ordering::SeqCst);
    self.check(policy)?;
    if self.is_missing(id) {
      return Ok(None);
    }
    let served = self.misrouted.lock().unwrap().get(&id).copied().unwrap_or(id);
    Ok(Some(Self::source_chapter(served, language)))
  }

  async fn chapter_info(
    &self,
    id: ChapterId,
    language: &str,
    locale: Option<&str>,
  ) -> Result<Option<SourceInfo>, SourceError> {
    self.calls.chapter_info.fetch_add(1, Ordering::SeqCst);
    self.check(CachePolicy::Cached)?;
    if self.is_missing(id) || self.no_info.lock().unwrap().contains(&id) {
      return Ok(None);
    }
    Ok(Some(SourceInfo {
      chapter_id:    id,
      language_name: Some(language_name(language)),
      text:          format!("<p>About chapter {id} ({})</p>", locale.unwrap_or(language)),
      short_text:    format!("Chapter {id} in brief"),
      source:        "Fixture Tafsir".to_owned(),
    }))
  }

  async fn languages(&self, policy: CachePolicy) -> Result<Vec<Language>, SourceError> {
    self.calls.languages.fetch_add(1, Ordering::SeqCst);
    self.check(policy)?;
    Ok(vec![
      Language {
        language_id:        38,
        name:               "English".to_owned(),
        iso_code:           "en".to_owned(),
        native_name:        "English".to_owned(),
        direction:          Direction::Ltr,
        translations_count: 23,
        translated_name:    Some(LanguageName {
          name:          "English".to_owned(),
          language_name: "english".to_owned(),
        }),
      },
      Language {
        language_id:        9,
        name:               "Arabic".to_owned(),
        iso_code:           "ar".to_owned(),
        native_name:        "العربية".to_owned(),
        direction:          Direction::Rtl,
        translations_count: 4,
        translated_name:    None,
      },
      Language {
        language_id:        59,
        name:               "Urdu".to_owned(),
        iso_code:           "ur".to_owned(),
        native_name:        "اردو".to_owned(),
        direction:          Direction::Rtl,
        translations_count: 7,
        translated_name:    None,
      },
      Language {
        language_id:        18,
        name:               "French".to_owned(),
        iso_code:           "fr".to_owned(),
        native_name:        "Français".to_owned(),
        direction:          Direction::Ltr,
        translations_count: 3,
        translated_name:    None,
      },
    ])
  }
}
