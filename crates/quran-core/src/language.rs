//! Languages offered by the content API.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Script direction of a language.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Direction {
  #[default]
  Ltr,
  Rtl,
}

/// A language's name as rendered in another language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageName {
  pub name:          String,
  pub language_name: String,
}

/// A language record, keyed by the upstream numeric id and unique by ISO code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
  pub language_id:        i64,
  pub name:               String,
  pub iso_code:           String,
  pub native_name:        String,
  pub direction:          Direction,
  pub translations_count: u32,
  pub translated_name:    Option<LanguageName>,
}

impl Language {
  /// Fill a missing translated name with the language's own name.
  pub fn with_name_fallback(mut self) -> Self {
    if self.translated_name.is_none() {
      self.translated_name = Some(LanguageName {
        name:          self.name.clone(),
        language_name: "english".to_owned(),
      });
    }
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fallback_only_fills_missing_name() {
    let lang = Language {
      language_id:        38,
      name:               "English".into(),
      iso_code:           "en".into(),
      native_name:        "English".into(),
      direction:          Direction::Ltr,
      translations_count: 12,
      translated_name:    None,
    }
    .with_name_fallback();
    assert_eq!(
      lang.translated_name,
      Some(LanguageName { name: "English".into(), language_name: "english".into() })
    );

    let kept = Language {
      translated_name: Some(LanguageName { name: "Inglés".into(), language_name: "spanish".into() }),
      ..lang
    }
    .with_name_fallback();
    assert_eq!(kept.translated_name.unwrap().name, "Inglés");
  }

  #[test]
  fn direction_round_trips_through_strum() {
    assert_eq!("RTL".parse::<Direction>().unwrap(), Direction::Rtl);
    assert_eq!(Direction::Ltr.to_string(), "ltr");
    assert!("up".parse::<Direction>().is_err());
  }
}
