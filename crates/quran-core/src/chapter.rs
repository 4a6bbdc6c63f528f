//! Chapter records and their per-language satellites.
//!
//! A [`Chapter`] is language-independent. Everything a reader sees in a
//! particular language lives in [`TranslatedName`] and [`ChapterInfo`] rows
//! keyed by `(chapter, language)`.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::error::InvalidChapterId;

// ─── Identity ────────────────────────────────────────────────────────────────

/// A chapter number, guaranteed to be within 1..=114.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct ChapterId(u8);

impl ChapterId {
  pub const FIRST: u8 = 1;
  pub const LAST: u8 = 114;

  pub fn new(id: i64) -> Result<Self, InvalidChapterId> {
    if (i64::from(Self::FIRST)..=i64::from(Self::LAST)).contains(&id) {
      Ok(Self(id as u8))
    } else {
      Err(InvalidChapterId(id))
    }
  }

  pub fn get(self) -> u8 { self.0 }

  /// Every chapter id in ascending order.
  pub fn all() -> impl Iterator<Item = ChapterId> {
    (Self::FIRST..=Self::LAST).map(ChapterId)
  }
}

impl TryFrom<i64> for ChapterId {
  type Error = InvalidChapterId;

  fn try_from(value: i64) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<ChapterId> for i64 {
  fn from(id: ChapterId) -> Self { i64::from(id.0) }
}

impl fmt::Display for ChapterId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Attributes ──────────────────────────────────────────────────────────────

/// Where a chapter was revealed.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RevelationPlace {
  #[serde(alias = "Makkah", alias = "makki")]
  Makkah,
  #[serde(alias = "Madinah", alias = "madani")]
  Madinah,
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// The language-independent chapter record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
  pub id:               ChapterId,
  pub revelation_place: RevelationPlace,
  pub revelation_order: u32,
  pub bismillah_pre:    bool,
  pub name_simple:      String,
  pub name_complex:     String,
  pub name_arabic:      String,
  pub verses_count:     u32,
  /// First and last mushaf page.
  pub pages:            [u32; 2],
}

/// A chapter's display name in one language.
///
/// Unique per `(chapter_id, language_code)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedName {
  pub chapter_id:    ChapterId,
  pub language_code: String,
  pub language_name: String,
  pub name:          String,
}

/// Long-form descriptive text for a chapter in one language.
///
/// Unique per `(chapter_id, language_code, locale)`; `None` is its own locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterInfo {
  pub chapter_id:    ChapterId,
  pub language_code: String,
  pub language_name: String,
  pub locale:        Option<String>,
  pub text:          String,
  pub short_text:    String,
  pub source:        String,
}

// ─── Read model ──────────────────────────────────────────────────────────────

/// The translated name attached to a [`ChapterView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName {
  pub language_code: String,
  pub language_name: String,
  pub name:          String,
  /// Set when the requested language had no row and the fallback language
  /// was used instead.
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub fallback:      bool,
}

/// A chapter as served to readers: the canonical record plus its name in the
/// requested language, if one is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterView {
  #[serde(flatten)]
  pub chapter:         Chapter,
  pub translated_name: Option<DisplayName>,
}

impl ChapterView {
  /// Whether the view carries a name in exactly `language` (not a fallback).
  pub fn has_translation(&self, language: &str) -> bool {
    self
      .translated_name
      .as_ref()
      .is_some_and(|n| !n.fallback && n.language_code == language)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn chapter_id_bounds() {
    assert!(ChapterId::new(0).is_err());
    assert!(ChapterId::new(115).is_err());
    assert!(ChapterId::new(-3).is_err());
    assert_eq!(ChapterId::new(1).unwrap().get(), 1);
    assert_eq!(ChapterId::new(114).unwrap().get(), 114);
  }

  #[test]
  fn chapter_id_all_covers_range() {
    let ids: Vec<_> = ChapterId::all().map(ChapterId::get).collect();
    assert_eq!(ids.len(), 114);
    assert_eq!(ids.first(), Some(&1));
    assert_eq!(ids.last(), Some(&114));
  }

  #[test]
  fn chapter_id_deserialize_rejects_out_of_range() {
    assert!(serde_json::from_str::<ChapterId>("7").is_ok());
    assert!(serde_json::from_str::<ChapterId>("200").is_err());
  }

  #[test]
  fn revelation_place_parses_case_insensitively() {
    assert_eq!("Makkah".parse::<RevelationPlace>().unwrap(), RevelationPlace::Makkah);
    assert_eq!("madinah".parse::<RevelationPlace>().unwrap(), RevelationPlace::Madinah);
    assert!("medina".parse::<RevelationPlace>().is_err());
    assert_eq!(RevelationPlace::Madinah.as_ref(), "madinah");
  }

  #[test]
  fn view_flattens_chapter_fields() {
    let view = ChapterView {
      chapter: Chapter {
        id:               ChapterId::new(1).unwrap(),
        revelation_place: RevelationPlace::Makkah,
        revelation_order: 5,
        bismillah_pre:    false,
        name_simple:      "Al-Fatihah".into(),
        name_complex:     "Al-Fātiĥah".into(),
        name_arabic:      "الفاتحة".into(),
        verses_count:     7,
        pages:            [1, 1],
      },
      translated_name: None,
    };
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["id"], 1);
    assert_eq!(json["revelation_place"], "makkah");
    assert_eq!(json["pages"], serde_json::json!([1, 1]));
    assert!(json["translated_name"].is_null());
  }
}
