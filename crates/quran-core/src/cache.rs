//! The `ResponseCache` trait: time-bounded storage for raw upstream payloads.
//!
//! A response cache is never a source of truth. Entries may vanish at any time
//! and callers must treat every error as a miss.

use std::{future::Future, time::Duration};

use serde_json::Value;

/// Keyed JSON blobs with a per-entry time-to-live.
pub trait ResponseCache: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return the live entry under `key`, if any. Expired entries are misses.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send + 'a;

  /// Store `value` under `key`, replacing any previous entry.
  fn put<'a>(
    &'a self,
    key: &'a str,
    value: Value,
    ttl: Duration,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Drop the entry under `key`. Missing keys are not an error.
  fn invalidate<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── Keys ────────────────────────────────────────────────────────────────────

pub fn chapters_key(language: &str) -> String { format!("quran_chapters_{language}") }

pub fn chapter_key(id: crate::chapter::ChapterId, language: &str) -> String {
  format!("quran_chapter_{id}_{language}")
}

pub fn chapter_info_key(
  id: crate::chapter::ChapterId,
  language: &str,
  locale: Option<&str>,
) -> String {
  match locale {
    Some(locale) => format!("quran_chapter_info_{id}_{language}_{locale}"),
    None => format!("quran_chapter_info_{id}_{language}"),
  }
}

pub const LANGUAGES_KEY: &str = "quran_languages";

#[cfg(test)]
mod tests {
  use super::*;
  use crate::chapter::ChapterId;

  #[test]
  fn keys_include_locale_only_when_present() {
    let id = ChapterId::new(2).unwrap();
    assert_eq!(chapter_info_key(id, "en", None), "quran_chapter_info_2_en");
    assert_eq!(chapter_info_key(id, "en", Some("en_US")), "quran_chapter_info_2_en_en_US");
    assert_eq!(chapter_key(id, "fr"), "quran_chapter_2_fr");
    assert_eq!(chapters_key("ar"), "quran_chapters_ar");
  }
}
