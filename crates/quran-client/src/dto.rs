//! Wire shapes of the upstream JSON payloads.

use quran_core::{
  chapter::{Chapter, ChapterId, RevelationPlace},
  language::{Direction, Language, LanguageName},
  source::{SourceChapter, SourceInfo, SourceName},
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{Error, Result};

pub(crate) fn decode<T: DeserializeOwned>(payload: Value) -> Result<T> {
  serde_json::from_value(payload).map_err(|e| Error::Decode(e.to_string()))
}

// ─── OAuth ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct AccessTokenResponse {
  pub access_token: String,
  #[serde(default)]
  pub expires_in:   Option<u64>,
}

// ─── Chapters ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct RawName {
  pub language_name: String,
  pub name:          String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawChapter {
  pub id:               ChapterId,
  pub revelation_place: RevelationPlace,
  pub revelation_order: u32,
  #[serde(default)]
  pub bismillah_pre:    bool,
  pub name_simple:      String,
  pub name_complex:     String,
  pub name_arabic:      String,
  pub verses_count:     u32,
  pub pages:            [u32; 2],
  #[serde(default)]
  pub translated_name:  Option<RawName>,
}

impl From<RawChapter> for SourceChapter {
  fn from(raw: RawChapter) -> Self {
    SourceChapter {
      chapter:         Chapter {
        id:               raw.id,
        revelation_place: raw.revelation_place,
        revelation_order: raw.revelation_order,
        bismillah_pre:    raw.bismillah_pre,
        name_simple:      raw.name_simple,
        name_complex:     raw.name_complex,
        name_arabic:      raw.name_arabic,
        verses_count:     raw.verses_count,
        pages:            raw.pages,
      },
      translated_name: raw.translated_name.map(|n| SourceName {
        language_name: n.language_name,
        name:          n.name,
      }),
    }
  }
}

/// `GET chapters`
#[derive(Debug, Deserialize)]
pub(crate) struct ChaptersEnvelope {
  pub chapters: Vec<RawChapter>,
}

/// `GET chapters/{id}`
#[derive(Debug, Deserialize)]
pub(crate) struct ChapterEnvelope {
  pub chapter: RawChapter,
}

// ─── Chapter info ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct RawInfo {
  pub chapter_id:    ChapterId,
  #[serde(default)]
  pub language_name: Option<String>,
  pub text:          String,
  #[serde(default)]
  pub short_text:    String,
  #[serde(default)]
  pub source:        String,
}

impl From<RawInfo> for SourceInfo {
  fn from(raw: RawInfo) -> Self {
    SourceInfo {
      chapter_id:    raw.chapter_id,
      language_name: raw.language_name,
      text:          raw.text,
      short_text:    raw.short_text,
      source:        raw.source,
    }
  }
}

/// `GET chapters/{id}/info`
#[derive(Debug, Deserialize)]
pub(crate) struct ChapterInfoEnvelope {
  pub chapter_info: RawInfo,
}

// ─── Languages ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct RawLanguage {
  pub id:                 i64,
  pub name:               String,
  pub iso_code:           String,
  #[serde(default)]
  pub native_name:        String,
  #[serde(default)]
  pub direction:          Direction,
  #[serde(default)]
  pub translations_count: u32,
  #[serde(default)]
  pub translated_name:    Option<RawName>,
}

impl From<RawLanguage> for Language {
  fn from(raw: RawLanguage) -> Self {
    Language {
      language_id:        raw.id,
      name:               raw.name,
      iso_code:           raw.iso_code,
      native_name:        raw.native_name,
      direction:          raw.direction,
      translations_count: raw.translations_count,
      translated_name:    raw.translated_name.map(|n| LanguageName {
        name:          n.name,
        language_name: n.language_name,
      }),
    }
    .with_name_fallback()
  }
}

/// `GET resources/languages`
#[derive(Debug, Deserialize)]
pub(crate) struct LanguagesEnvelope {
  pub languages: Vec<RawLanguage>,
}
