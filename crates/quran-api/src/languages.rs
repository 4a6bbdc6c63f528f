//! Handlers for `/languages` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/languages` | Ordered by name |
//! | `GET`  | `/languages/search` | `?q` (2+ chars, else 422) |
//! | `GET`  | `/languages/direction/:direction` | `ltr\|rtl`, else 400 |
//! | `GET`  | `/languages/:iso` | 404 if unknown |
//! | `POST` | `/languages/sync` | Admin |

use axum::extract::{Path, Query, State};
use quran_core::{
  language::{Direction, Language},
  source::ContentSource,
  store::QuranStore,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, Envelope, auth::Admin, error::ApiError};

type Result<T> = std::result::Result<Envelope<T>, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
  pub q: Option<String>,
}

/// `GET /languages`
pub async fn list<S, A>(State(state): State<AppState<S, A>>) -> Result<Vec<Language>>
where
  S: QuranStore,
  A: ContentSource,
{
  let languages = state.catalog.languages().await?;
  let count = languages.len();
  Ok(Envelope::new(languages).with_count(count).with_timestamp())
}

/// `GET /languages/search?q=<term>`
pub async fn search<S, A>(
  State(state): State<AppState<S, A>>,
  Query(params): Query<SearchParams>,
) -> Result<Vec<Language>>
where
  S: QuranStore,
  A: ContentSource,
{
  let term = params
    .q
    .as_deref()
    .ok_or_else(|| ApiError::Validation("the q parameter is required".to_owned()))?;
  let hits = state.catalog.search_languages(term).await?;
  let count = hits.len();
  Ok(Envelope::new(hits).with_count(count).meta("search_term", term))
}

/// `GET /languages/direction/:direction`
pub async fn by_direction<S, A>(
  State(state): State<AppState<S, A>>,
  Path(direction): Path<String>,
) -> Result<Vec<Language>>
where
  S: QuranStore,
  A: ContentSource,
{
  let direction: Direction = direction.parse().map_err(|_| {
    ApiError::BadRequest("Invalid direction. Must be \"ltr\" or \"rtl\".".to_owned())
  })?;
  let languages = state.catalog.languages_by_direction(direction).await?;
  let count = languages.len();
  Ok(
    Envelope::new(languages)
      .with_count(count)
      .meta("direction", direction.as_ref()),
  )
}

/// `GET /languages/:iso`
pub async fn get_one<S, A>(
  State(state): State<AppState<S, A>>,
  Path(iso): Path<String>,
) -> Result<Language>
where
  S: QuranStore,
  A: ContentSource,
{
  let language = state
    .catalog
    .language_by_iso(&iso)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("language {iso} not found")))?;
  Ok(Envelope::new(language))
}

/// `POST /languages/sync`
pub async fn sync<S, A>(_admin: Admin, State(state): State<AppState<S, A>>) -> Result<Value>
where
  S: QuranStore + 'static,
  A: ContentSource + 'static,
{
  let written = state.catalog.sync_languages().await?;
  let total = state
    .catalog
    .store()
    .count_languages()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Envelope::new(json!({ "languages": written })).meta("total_languages", total))
}
