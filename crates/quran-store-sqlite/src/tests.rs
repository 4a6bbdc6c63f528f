//! Integration tests for `SqliteStore` against an in-memory database.

use std::time::Duration;

use quran_core::{
  cache::ResponseCache,
  chapter::{ChapterId, ChapterInfo, RevelationPlace, TranslatedName},
  fixture,
  language::{Direction, Language},
  store::{ChapterOrder, ChapterQuery, LanguageQuery, QuranStore, SyncBatch, Upsert},
};
use serde_json::json;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn id(n: i64) -> ChapterId { ChapterId::new(n).unwrap() }

fn name(n: i64, language: &str, text: &str) -> TranslatedName {
  TranslatedName {
    chapter_id:    id(n),
    language_code: language.to_owned(),
    language_name: language.to_owned(),
    name:          text.to_owned(),
  }
}

fn info(n: i64, language: &str, locale: Option<&str>, text: &str) -> ChapterInfo {
  ChapterInfo {
    chapter_id:    id(n),
    language_code: language.to_owned(),
    language_name: "english".to_owned(),
    locale:        locale.map(str::to_owned),
    text:          text.to_owned(),
    short_text:    String::new(),
    source:        "test".to_owned(),
  }
}

fn language(language_id: i64, iso: &str, name: &str, direction: Direction) -> Language {
  Language {
    language_id,
    name: name.to_owned(),
    iso_code: iso.to_owned(),
    native_name: name.to_owned(),
    direction,
    translations_count: 1,
    translated_name: None,
  }
  .with_name_fallback()
}

/// All 114 fixture chapters, with English names for every one.
fn full_batch(language: &str) -> SyncBatch {
  ChapterId::all()
    .flat_map(|id| {
      [
        Upsert::Chapter(fixture::chapter(id)),
        Upsert::TranslatedName(TranslatedName {
          chapter_id:    id,
          language_code: language.to_owned(),
          language_name: "english".to_owned(),
          name:          fixture::translated_name(id, language),
        }),
      ]
    })
    .collect()
}

// ─── Chapters ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn apply_full_batch_then_counts() {
  let s = store().await;
  let outcome = s.apply(full_batch("en")).await.unwrap();
  assert_eq!(outcome.chapters, 114);
  assert_eq!(outcome.translations, 114);

  assert_eq!(s.count_chapters().await.unwrap(), 114);
  assert_eq!(s.count_translations("en").await.unwrap(), 114);
  assert_eq!(s.count_translations("fr").await.unwrap(), 0);
}

#[tokio::test]
async fn reapplying_batch_keeps_counts_stable() {
  let s = store().await;
  s.apply(full_batch("en")).await.unwrap();
  s.apply(full_batch("en")).await.unwrap();

  assert_eq!(s.count_chapters().await.unwrap(), 114);
  assert_eq!(s.count_translations("en").await.unwrap(), 114);
}

#[tokio::test]
async fn get_chapter_with_translated_name() {
  let s = store().await;
  s.apply(full_batch("en")).await.unwrap();

  let view = s.get_chapter(id(2), "en", None).await.unwrap().unwrap();
  assert_eq!(view.chapter, fixture::chapter(id(2)));
  let tn = view.translated_name.unwrap();
  assert_eq!(tn.name, "en:name-2");
  assert!(!tn.fallback);
}

#[tokio::test]
async fn get_chapter_missing_returns_none() {
  let s = store().await;
  assert!(s.get_chapter(id(7), "en", None).await.unwrap().is_none());
}

#[tokio::test]
async fn missing_language_uses_fallback_name() {
  let s = store().await;
  s.apply(full_batch("en")).await.unwrap();

  let view = s.get_chapter(id(3), "fr", Some("en")).await.unwrap().unwrap();
  let tn = view.translated_name.unwrap();
  assert_eq!(tn.language_code, "en");
  assert!(tn.fallback);
  assert!(!s.get_chapter(id(3), "fr", Some("en")).await.unwrap().unwrap().has_translation("fr"));

  let bare = s.get_chapter(id(3), "fr", None).await.unwrap().unwrap();
  assert!(bare.translated_name.is_none());
}

#[tokio::test]
async fn translated_name_for_unknown_chapter_is_skipped() {
  let s = store().await;
  let outcome = s
    .apply(SyncBatch::from_iter([Upsert::TranslatedName(name(5, "en", "The Table"))]))
    .await
    .unwrap();
  assert_eq!(outcome.translations, 0);
  assert_eq!(s.count_translations("en").await.unwrap(), 0);
}

// ─── Gap fill ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_translated_name_never_overwrites() {
  let s = store().await;
  s.apply(ChapterId::all().map(|id| Upsert::Chapter(fixture::chapter(id))).collect())
    .await
    .unwrap();
  s.apply(SyncBatch::from_iter([
    Upsert::TranslatedName(name(1, "fr", "sentinel")),
    Upsert::TranslatedName(name(2, "fr", "other")),
  ]))
  .await
  .unwrap();

  let gap_fill: SyncBatch = ChapterId::all()
    .map(|id| Upsert::MissingTranslatedName(name(i64::from(id), "fr", "filled")))
    .collect();
  let outcome = s.apply(gap_fill).await.unwrap();

  assert_eq!(outcome.translations, 112);
  assert_eq!(s.count_translations("fr").await.unwrap(), 114);
  let sentinel = s.get_chapter(id(1), "fr", None).await.unwrap().unwrap();
  assert_eq!(sentinel.translated_name.unwrap().name, "sentinel");
}

#[tokio::test]
async fn plain_upsert_overwrites_name() {
  let s = store().await;
  s.apply(full_batch("en")).await.unwrap();
  s.apply(SyncBatch::from_iter([Upsert::TranslatedName(name(1, "en", "The Opening"))]))
    .await
    .unwrap();

  let view = s.get_chapter(id(1), "en", None).await.unwrap().unwrap();
  assert_eq!(view.translated_name.unwrap().name, "The Opening");
  assert_eq!(s.count_translations("en").await.unwrap(), 114);
}

// ─── Soft delete ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn soft_delete_hides_chapter_and_satellites() {
  let s = store().await;
  s.apply(full_batch("en")).await.unwrap();
  s.apply(SyncBatch::from_iter([Upsert::ChapterInfo(info(4, "en", None, "about"))]))
    .await
    .unwrap();

  assert!(s.soft_delete_chapter(id(4)).await.unwrap());
  assert!(!s.soft_delete_chapter(id(4)).await.unwrap());

  assert!(s.get_chapter(id(4), "en", None).await.unwrap().is_none());
  assert!(s.chapter_infos(id(4), "en").await.unwrap().is_empty());
  assert_eq!(s.count_chapters().await.unwrap(), 113);
  assert_eq!(s.count_translations("en").await.unwrap(), 113);
}

#[tokio::test]
async fn upsert_revives_soft_deleted_rows() {
  let s = store().await;
  s.apply(full_batch("en")).await.unwrap();
  s.soft_delete_chapter(id(9)).await.unwrap();

  s.apply(SyncBatch::from_iter([
    Upsert::Chapter(fixture::chapter(id(9))),
    Upsert::MissingTranslatedName(name(9, "en", "revived")),
  ]))
  .await
  .unwrap();

  let view = s.get_chapter(id(9), "en", None).await.unwrap().unwrap();
  assert_eq!(view.translated_name.unwrap().name, "revived");
  assert_eq!(s.count_chapters().await.unwrap(), 114);
  assert_eq!(s.count_translations("en").await.unwrap(), 114);
}

// ─── Listing and search ──────────────────────────────────────────────────────

#[tokio::test]
async fn list_orders_by_id_or_revelation_order() {
  let s = store().await;
  s.apply(full_batch("en")).await.unwrap();

  let by_id = s.list_chapters(&ChapterQuery::new("en")).await.unwrap();
  assert_eq!(by_id.len(), 114);
  assert!(by_id.windows(2).all(|w| w[0].chapter.id < w[1].chapter.id));

  let query = ChapterQuery { order: ChapterOrder::RevelationOrder, ..ChapterQuery::new("en") };
  let by_revelation = s.list_chapters(&query).await.unwrap();
  assert_eq!(by_revelation.first().unwrap().chapter.id, id(114));
  assert!(
    by_revelation
      .windows(2)
      .all(|w| w[0].chapter.revelation_order <= w[1].chapter.revelation_order)
  );
}

#[tokio::test]
async fn list_filters_by_place() {
  let s = store().await;
  s.apply(full_batch("en")).await.unwrap();

  let query = ChapterQuery { place: Some(RevelationPlace::Madinah), ..ChapterQuery::new("en") };
  let madani = s.list_chapters(&query).await.unwrap();
  assert_eq!(madani.len(), 38);
  assert!(madani.iter().all(|v| v.chapter.revelation_place == RevelationPlace::Madinah));
}

#[tokio::test]
async fn search_matches_names_case_insensitively() {
  let s = store().await;
  s.apply(full_batch("en")).await.unwrap();
  s.apply(SyncBatch::from_iter([Upsert::TranslatedName(name(2, "en", "The Cow"))]))
    .await
    .unwrap();

  let query = ChapterQuery { text: Some("cow".into()), ..ChapterQuery::new("en") };
  let hits = s.list_chapters(&query).await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].chapter.id, id(2));

  let query = ChapterQuery { text: Some("SURAH 11".into()), ..ChapterQuery::new("en") };
  let ids: Vec<_> = s
    .list_chapters(&query)
    .await
    .unwrap()
    .into_iter()
    .map(|v| v.chapter.id.get())
    .collect();
  assert_eq!(ids, vec![11, 110, 111, 112, 113, 114]);

  let query = ChapterQuery { text: Some("%".into()), ..ChapterQuery::new("en") };
  assert!(s.list_chapters(&query).await.unwrap().is_empty());
}

// ─── Chapter info ────────────────────────────────────────────────────────────

#[tokio::test]
async fn info_locale_identity() {
  let s = store().await;
  s.apply(full_batch("en")).await.unwrap();
  s.apply(SyncBatch::from_iter([
    Upsert::ChapterInfo(info(1, "en", Some("en_US"), "us")),
    Upsert::ChapterInfo(info(1, "en", None, "first")),
    Upsert::ChapterInfo(info(1, "en", None, "second")),
  ]))
  .await
  .unwrap();

  let rows = s.chapter_infos(id(1), "en").await.unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].locale, None);
  assert_eq!(rows[0].text, "second");
  assert_eq!(rows[1].locale.as_deref(), Some("en_US"));
  assert!(s.chapter_infos(id(1), "ar").await.unwrap().is_empty());
}

// ─── Languages ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn languages_list_search_and_lookup() {
  let s = store().await;
  s.apply(SyncBatch::from_iter([
    Upsert::Language(language(59, "ur", "Urdu", Direction::Rtl)),
    Upsert::Language(language(38, "en", "English", Direction::Ltr)),
    Upsert::Language(language(9, "ar", "Arabic", Direction::Rtl)),
  ]))
  .await
  .unwrap();
  assert_eq!(s.count_languages().await.unwrap(), 3);

  let all = s.list_languages(&LanguageQuery::default()).await.unwrap();
  let names: Vec<_> = all.iter().map(|l| l.name.as_str()).collect();
  assert_eq!(names, ["Arabic", "English", "Urdu"]);

  let rtl = s
    .list_languages(&LanguageQuery { direction: Some(Direction::Rtl), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(rtl.len(), 2);

  let hits = s
    .list_languages(&LanguageQuery { text: Some("engl".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(hits.len(), 1);

  let ar = s.get_language("AR").await.unwrap().unwrap();
  assert_eq!(ar.language_id, 9);
  assert_eq!(ar.translated_name.unwrap().language_name, "english");
  assert!(s.get_language("xx").await.unwrap().is_none());
}

// ─── Atomicity ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn failing_upsert_rolls_back_whole_batch() {
  let s = store().await;
  // Two upstream ids claiming one ISO code violate UNIQUE(iso_code).
  let result = s
    .apply(SyncBatch::from_iter([
      Upsert::Chapter(fixture::chapter(id(1))),
      Upsert::Language(language(38, "en", "English", Direction::Ltr)),
      Upsert::Language(language(39, "en", "English (dup)", Direction::Ltr)),
    ]))
    .await;

  assert!(result.is_err());
  assert_eq!(s.count_chapters().await.unwrap(), 0);
  assert_eq!(s.count_languages().await.unwrap(), 0);
}

// ─── Response cache ──────────────────────────────────────────────────────────

#[tokio::test]
async fn response_cache_round_trip_and_invalidate() {
  let s = store().await;
  let payload = json!({ "chapters": [{ "id": 1 }] });

  assert_eq!(s.get("quran_chapters_en").await.unwrap(), None);
  s.put("quran_chapters_en", payload.clone(), Duration::from_secs(60)).await.unwrap();
  assert_eq!(s.get("quran_chapters_en").await.unwrap(), Some(payload));

  s.invalidate("quran_chapters_en").await.unwrap();
  assert_eq!(s.get("quran_chapters_en").await.unwrap(), None);
}

#[tokio::test]
async fn expired_entries_are_misses_and_purged() {
  let s = store().await;
  s.put("stale", json!(1), Duration::ZERO).await.unwrap();
  s.put("live", json!(2), Duration::from_secs(3600)).await.unwrap();

  assert_eq!(s.get("stale").await.unwrap(), None);
  assert_eq!(s.purge_expired().await.unwrap(), 1);
  assert_eq!(s.get("live").await.unwrap(), Some(json!(2)));
}
