//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; response-cache expiry as unix
//! milliseconds. Enums are stored in their lowercase wire form.

use chrono::{DateTime, Utc};
use quran_core::{
  chapter::{Chapter, ChapterId, ChapterInfo, ChapterView, DisplayName, RevelationPlace},
  language::{Direction, Language, LanguageName},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_place(s: &str) -> Result<RevelationPlace> {
  s.parse().map_err(|_| Error::UnknownValue {
    column: "revelation_place",
    value:  s.to_owned(),
  })
}

pub fn decode_direction(s: &str) -> Result<Direction> {
  s.parse().map_err(|_| Error::UnknownValue {
    column: "direction",
    value:  s.to_owned(),
  })
}

// ─── Locale ──────────────────────────────────────────────────────────────────

/// `None` is stored as the empty string.
pub fn encode_locale(locale: Option<&str>) -> String { locale.unwrap_or_default().to_owned() }

pub fn decode_locale(s: String) -> Option<String> { (!s.is_empty()).then_some(s) }

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// `%term%` with LIKE wildcards in `term` escaped by `\`.
pub fn like_pattern(term: &str) -> String {
  let mut out = String::with_capacity(term.len() + 2);
  out.push('%');
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Shared projection for chapter reads. `?1` binds the requested language,
/// `?2` the fallback language (or NULL).
pub const CHAPTER_SELECT: &str = "
  SELECT
    c.chapter_id, c.revelation_place, c.revelation_order, c.bismillah_pre,
    c.name_simple, c.name_complex, c.name_arabic, c.verses_count,
    c.page_start, c.page_end,
    t.language_code, t.language_name, t.name,
    f.language_code, f.language_name, f.name
  FROM chapters c
  LEFT JOIN chapter_translated_names t
    ON t.chapter_id = c.chapter_id AND t.language_code = ?1 AND t.deleted_at IS NULL
  LEFT JOIN chapter_translated_names f
    ON f.chapter_id = c.chapter_id AND f.language_code = ?2 AND f.deleted_at IS NULL
  WHERE c.deleted_at IS NULL";

pub struct RawName {
  pub language_code: String,
  pub language_name: String,
  pub name:          String,
}

/// Columns of [`CHAPTER_SELECT`].
pub struct RawChapter {
  pub chapter_id:       i64,
  pub revelation_place: String,
  pub revelation_order: u32,
  pub bismillah_pre:    bool,
  pub name_simple:      String,
  pub name_complex:     String,
  pub name_arabic:      String,
  pub verses_count:     u32,
  pub page_start:       u32,
  pub page_end:         u32,
  pub name:             Option<RawName>,
  pub fallback_name:    Option<RawName>,
}

fn name_at(row: &rusqlite::Row<'_>, at: usize) -> rusqlite::Result<Option<RawName>> {
  let code: Option<String> = row.get(at)?;
  let language_name: Option<String> = row.get(at + 1)?;
  let name: Option<String> = row.get(at + 2)?;
  Ok(match (code, language_name, name) {
    (Some(language_code), Some(language_name), Some(name)) => {
      Some(RawName { language_code, language_name, name })
    }
    _ => None,
  })
}

impl RawChapter {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawChapter {
      chapter_id:       row.get(0)?,
      revelation_place: row.get(1)?,
      revelation_order: row.get(2)?,
      bismillah_pre:    row.get(3)?,
      name_simple:      row.get(4)?,
      name_complex:     row.get(5)?,
      name_arabic:      row.get(6)?,
      verses_count:     row.get(7)?,
      page_start:       row.get(8)?,
      page_end:         row.get(9)?,
      name:             name_at(row, 10)?,
      fallback_name:    name_at(row, 13)?,
    })
  }

  pub fn into_view(self) -> Result<ChapterView> {
    let chapter = Chapter {
      id:               ChapterId::new(self.chapter_id)?,
      revelation_place: decode_place(&self.revelation_place)?,
      revelation_order: self.revelation_order,
      bismillah_pre:    self.bismillah_pre,
      name_simple:      self.name_simple,
      name_complex:     self.name_complex,
      name_arabic:      self.name_arabic,
      verses_count:     self.verses_count,
      pages:            [self.page_start, self.page_end],
    };

    let translated_name = match (self.name, self.fallback_name) {
      (Some(n), _) => Some(display_name(n, false)),
      (None, Some(f)) => Some(display_name(f, true)),
      (None, None) => None,
    };

    Ok(ChapterView { chapter, translated_name })
  }
}

fn display_name(raw: RawName, fallback: bool) -> DisplayName {
  DisplayName {
    language_code: raw.language_code,
    language_name: raw.language_name,
    name: raw.name,
    fallback,
  }
}

/// Raw columns of a `chapter_info` row.
pub struct RawInfo {
  pub chapter_id:    i64,
  pub language_code: String,
  pub language_name: String,
  pub locale:        String,
  pub text:          String,
  pub short_text:    String,
  pub source:        String,
}

impl RawInfo {
  pub fn into_info(self) -> Result<ChapterInfo> {
    Ok(ChapterInfo {
      chapter_id:    ChapterId::new(self.chapter_id)?,
      language_code: self.language_code,
      language_name: self.language_name,
      locale:        decode_locale(self.locale),
      text:          self.text,
      short_text:    self.short_text,
      source:        self.source,
    })
  }
}

/// Raw columns of a `languages` row.
pub struct RawLanguage {
  pub language_id:              i64,
  pub name:                     String,
  pub iso_code:                 String,
  pub native_name:              String,
  pub direction:                String,
  pub translations_count:       u32,
  pub translated_name:          Option<String>,
  pub translated_name_language: Option<String>,
}

impl RawLanguage {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawLanguage {
      language_id:              row.get(0)?,
      name:                     row.get(1)?,
      iso_code:                 row.get(2)?,
      native_name:              row.get(3)?,
      direction:                row.get(4)?,
      translations_count:       row.get(5)?,
      translated_name:          row.get(6)?,
      translated_name_language: row.get(7)?,
    })
  }

  pub fn into_language(self) -> Result<Language> {
    let translated_name = match (self.translated_name, self.translated_name_language) {
      (Some(name), Some(language_name)) => Some(LanguageName { name, language_name }),
      _ => None,
    };
    Ok(Language {
      language_id: self.language_id,
      name: self.name,
      iso_code: self.iso_code,
      native_name: self.native_name,
      direction: decode_direction(&self.direction)?,
      translations_count: self.translations_count,
      translated_name,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn like_pattern_escapes_wildcards() {
    assert_eq!(like_pattern("cow"), "%cow%");
    assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
  }

  #[test]
  fn empty_locale_round_trips_to_none() {
    assert_eq!(decode_locale(encode_locale(None)), None);
    assert_eq!(decode_locale(encode_locale(Some("en_US"))), Some("en_US".to_owned()));
  }

  #[test]
  fn unknown_place_is_rejected() {
    assert!(matches!(
      decode_place("medina"),
      Err(Error::UnknownValue { column: "revelation_place", .. })
    ));
  }
}
