//! Handlers for `/chapters` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/chapters` | Optional `?language` |
//! | `GET`  | `/chapters/search` | `?q` (2+ chars, else 422), `?language` |
//! | `GET`  | `/chapters/revelation-order` | Ordered by revelation order |
//! | `GET`  | `/chapters/revelation-place/:place` | `makkah\|madinah`, else 400 |
//! | `GET`  | `/chapters/:id` | 400 outside 1..=114, 404 if unknown upstream |
//! | `GET`  | `/chapters/:id/info` | Optional `?language&locale` |
//! | `POST` | `/chapters/:id/refresh` | Admin |
//! | `POST` | `/chapters/sync` | Admin; full list re-sync |

use axum::extract::{Path, Query, State};
use quran_core::{
  chapter::{ChapterId, ChapterInfo, ChapterView, RevelationPlace},
  source::ContentSource,
  store::QuranStore,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, Envelope, auth::Admin, error::ApiError};

type Result<T> = std::result::Result<Envelope<T>, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct LanguageParams {
  pub language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InfoParams {
  pub language: Option<String>,
  pub locale:   Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
  pub q:        Option<String>,
  pub language: Option<String>,
}

pub(crate) fn parse_id(raw: &str) -> std::result::Result<ChapterId, ApiError> {
  raw
    .parse::<i64>()
    .ok()
    .and_then(|n| ChapterId::new(n).ok())
    .ok_or_else(|| {
      ApiError::BadRequest("Invalid chapter ID. Must be between 1 and 114.".to_owned())
    })
}

// ─── Collections ─────────────────────────────────────────────────────────────

/// `GET /chapters[?language=<code>]`
pub async fn list<S, A>(
  State(state): State<AppState<S, A>>,
  Query(params): Query<LanguageParams>,
) -> Result<Vec<ChapterView>>
where
  S: QuranStore,
  A: ContentSource,
{
  let language = state.catalog.language(params.language.as_deref());
  let chapters = state.catalog.chapters(language).await?;
  let count = chapters.len();
  Ok(
    Envelope::new(chapters)
      .with_count(count)
      .meta("language", language)
      .with_timestamp(),
  )
}

/// `GET /chapters/search?q=<term>[&language=<code>]`
pub async fn search<S, A>(
  State(state): State<AppState<S, A>>,
  Query(params): Query<SearchParams>,
) -> Result<Vec<ChapterView>>
where
  S: QuranStore,
  A: ContentSource,
{
  let term = params
    .q
    .as_deref()
    .ok_or_else(|| ApiError::Validation("the q parameter is required".to_owned()))?;
  let language = state.catalog.language(params.language.as_deref());
  let hits = state.catalog.search_chapters(term, language).await?;
  let count = hits.len();
  Ok(
    Envelope::new(hits)
      .with_count(count)
      .meta("search_term", term)
      .meta("language", language)
      .with_timestamp(),
  )
}

/// `GET /chapters/revelation-order[?language=<code>]`
pub async fn by_revelation_order<S, A>(
  State(state): State<AppState<S, A>>,
  Query(params): Query<LanguageParams>,
) -> Result<Vec<ChapterView>>
where
  S: QuranStore,
  A: ContentSource,
{
  let language = state.catalog.language(params.language.as_deref());
  let chapters = state.catalog.chapters_by_revelation_order(language).await?;
  let count = chapters.len();
  Ok(
    Envelope::new(chapters)
      .with_count(count)
      .meta("order_by", "revelation_order")
      .meta("language", language),
  )
}

/// `GET /chapters/revelation-place/:place[?language=<code>]`
pub async fn by_place<S, A>(
  State(state): State<AppState<S, A>>,
  Path(place): Path<String>,
  Query(params): Query<LanguageParams>,
) -> Result<Vec<ChapterView>>
where
  S: QuranStore,
  A: ContentSource,
{
  let place: RevelationPlace = place.parse().map_err(|_| {
    ApiError::BadRequest("Invalid revelation place. Must be \"makkah\" or \"madinah\".".to_owned())
  })?;
  let language = state.catalog.language(params.language.as_deref());
  let chapters = state.catalog.chapters_by_place(place, language).await?;
  let count = chapters.len();
  Ok(
    Envelope::new(chapters)
      .with_count(count)
      .meta("revelation_place", place.as_ref())
      .meta("language", language),
  )
}

// ─── Single chapter ──────────────────────────────────────────────────────────

/// `GET /chapters/:id[?language=<code>]`
pub async fn get_one<S, A>(
  State(state): State<AppState<S, A>>,
  Path(id): Path<String>,
  Query(params): Query<LanguageParams>,
) -> Result<ChapterView>
where
  S: QuranStore,
  A: ContentSource,
{
  let id = parse_id(&id)?;
  let language = state.catalog.language(params.language.as_deref());
  let view = state
    .catalog
    .chapter(id, language)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("chapter {id} not found")))?;
  Ok(Envelope::new(view).meta("language", language))
}

/// `GET /chapters/:id/info[?language=<code>&locale=<locale>]`
pub async fn info<S, A>(
  State(state): State<AppState<S, A>>,
  Path(id): Path<String>,
  Query(params): Query<InfoParams>,
) -> Result<ChapterInfo>
where
  S: QuranStore,
  A: ContentSource,
{
  let id = parse_id(&id)?;
  let language = state.catalog.language(params.language.as_deref());
  let locale = params.locale.as_deref().filter(|l| !l.is_empty());
  let info = state
    .catalog
    .chapter_info(id, language, locale)
    .await?
    .ok_or_else(|| {
      ApiError::NotFound(format!("no info for chapter {id} in language {language}"))
    })?;
  Ok(
    Envelope::new(info)
      .meta("language", language)
      .meta("locale", locale),
  )
}

// ─── Admin ───────────────────────────────────────────────────────────────────

/// `POST /chapters/:id/refresh[?language=<code>]`
pub async fn refresh<S, A>(
  _admin: Admin,
  State(state): State<AppState<S, A>>,
  Path(id): Path<String>,
  Query(params): Query<LanguageParams>,
) -> Result<ChapterView>
where
  S: QuranStore + 'static,
  A: ContentSource + 'static,
{
  let id = parse_id(&id)?;
  let language = state.catalog.language(params.language.as_deref());
  let view = state
    .catalog
    .refresh_chapter(id, language)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("chapter {id} not found upstream")))?;
  Ok(
    Envelope::new(view)
      .meta("language", language)
      .meta("refreshed", true),
  )
}

/// `POST /chapters/sync[?language=<code>]`
pub async fn sync_all<S, A>(
  _admin: Admin,
  State(state): State<AppState<S, A>>,
  Query(params): Query<LanguageParams>,
) -> Result<Value>
where
  S: QuranStore + 'static,
  A: ContentSource + 'static,
{
  let language = state.catalog.language(params.language.as_deref());
  let outcome = state.catalog.sync_all(language).await?;
  let total = state
    .catalog
    .store()
    .count_chapters()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(
    Envelope::new(json!({
      "chapters":     outcome.chapters,
      "translations": outcome.translations,
    }))
    .meta("total_chapters", total)
    .meta("language", language),
  )
}
