//! The `{"data": …, "meta": {…}}` success body.

use axum::{
  Json,
  response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};

/// A success response: the payload plus free-form metadata.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
  pub data: T,
  pub meta: Map<String, Value>,
}

impl<T: Serialize> Envelope<T> {
  pub fn new(data: T) -> Self { Self { data, meta: Map::new() } }

  /// Add one metadata field. `None` values are skipped.
  pub fn meta(mut self, key: &str, value: impl Into<Value>) -> Self {
    let value = value.into();
    if !value.is_null() {
      self.meta.insert(key.to_owned(), value);
    }
    self
  }

  pub fn with_count(self, count: usize) -> Self { self.meta("count", count) }

  pub fn with_timestamp(self) -> Self { self.meta("timestamp", Utc::now().to_rfc3339()) }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
  fn into_response(self) -> Response { Json(self).into_response() }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn skips_null_meta() {
    let body = Envelope::new(vec![1, 2])
      .with_count(2)
      .meta("language", "en")
      .meta("locale", Option::<String>::None);
    assert_eq!(
      serde_json::to_value(&body).unwrap(),
      json!({ "data": [1, 2], "meta": { "count": 2, "language": "en" } })
    );
  }
}
