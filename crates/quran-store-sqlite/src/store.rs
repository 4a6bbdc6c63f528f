//! [`SqliteStore`]: the SQLite implementation of [`QuranStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _};

use quran_core::{
  chapter::{Chapter, ChapterId, ChapterInfo, ChapterView, TranslatedName},
  language::Language,
  store::{
    BatchOutcome, ChapterOrder, ChapterQuery, LanguageQuery, QuranStore, SyncBatch, Upsert,
  },
};

use crate::{
  Result,
  encode::{
    CHAPTER_SELECT, RawChapter, RawInfo, RawLanguage, encode_dt, encode_locale, like_pattern,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Quran chapter store backed by a single SQLite file.
///
/// Cloning shares the inner connection.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn count(&self, sql: &'static str, param: Option<String>) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(move |conn| {
        let n = match param {
          Some(p) => conn.query_row(sql, rusqlite::params![p], |r| r.get(0))?,
          None => conn.query_row(sql, [], |r| r.get(0))?,
        };
        Ok(n)
      })
      .await?;
    Ok(n.max(0) as u64)
  }
}

// ─── Upsert statements ───────────────────────────────────────────────────────

fn upsert_chapter(conn: &Connection, c: &Chapter, now: &str) -> rusqlite::Result<usize> {
  conn.execute(
    "INSERT INTO chapters (
       chapter_id, revelation_place, revelation_order, bismillah_pre,
       name_simple, name_complex, name_arabic, verses_count,
       page_start, page_end, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
     ON CONFLICT(chapter_id) DO UPDATE SET
       revelation_place = excluded.revelation_place,
       revelation_order = excluded.revelation_order,
       bismillah_pre    = excluded.bismillah_pre,
       name_simple      = excluded.name_simple,
       name_complex     = excluded.name_complex,
       name_arabic      = excluded.name_arabic,
       verses_count     = excluded.verses_count,
       page_start       = excluded.page_start,
       page_end         = excluded.page_end,
       updated_at       = excluded.updated_at,
       deleted_at       = NULL",
    rusqlite::params![
      i64::from(c.id),
      c.revelation_place.as_ref(),
      c.revelation_order,
      c.bismillah_pre,
      c.name_simple,
      c.name_complex,
      c.name_arabic,
      c.verses_count,
      c.pages[0],
      c.pages[1],
      now,
    ],
  )
}

/// With `overwrite` false, a live row for `(chapter, language)` is left
/// untouched; only absent or soft-deleted rows are written.
fn upsert_translated_name(
  conn: &Connection,
  n: &TranslatedName,
  now: &str,
  overwrite: bool,
) -> rusqlite::Result<usize> {
  let guard = if overwrite { "" } else { "WHERE chapter_translated_names.deleted_at IS NOT NULL" };
  let sql = format!(
    "INSERT INTO chapter_translated_names (
       chapter_id, language_code, language_name, name, created_at, updated_at
     )
     SELECT ?1, ?2, ?3, ?4, ?5, ?5
     WHERE EXISTS (SELECT 1 FROM chapters WHERE chapter_id = ?1 AND deleted_at IS NULL)
     ON CONFLICT(chapter_id, language_code) DO UPDATE SET
       language_name = excluded.language_name,
       name          = excluded.name,
       updated_at    = excluded.updated_at,
       deleted_at    = NULL
     {guard}"
  );
  conn.execute(
    &sql,
    rusqlite::params![i64::from(n.chapter_id), n.language_code, n.language_name, n.name, now],
  )
}

fn upsert_info(conn: &Connection, i: &ChapterInfo, now: &str) -> rusqlite::Result<usize> {
  conn.execute(
    "INSERT INTO chapter_info (
       chapter_id, language_code, language_name, locale,
       text, short_text, source, created_at, updated_at
     )
     SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8
     WHERE EXISTS (SELECT 1 FROM chapters WHERE chapter_id = ?1 AND deleted_at IS NULL)
     ON CONFLICT(chapter_id, language_code, locale) DO UPDATE SET
       language_name = excluded.language_name,
       text          = excluded.text,
       short_text    = excluded.short_text,
       source        = excluded.source,
       updated_at    = excluded.updated_at,
       deleted_at    = NULL",
    rusqlite::params![
      i64::from(i.chapter_id),
      i.language_code,
      i.language_name,
      encode_locale(i.locale.as_deref()),
      i.text,
      i.short_text,
      i.source,
      now,
    ],
  )
}

fn upsert_language(conn: &Connection, l: &Language, now: &str) -> rusqlite::Result<usize> {
  let (tn, tn_lang) = match &l.translated_name {
    Some(t) => (Some(t.name.as_str()), Some(t.language_name.as_str())),
    None => (None, None),
  };
  conn.execute(
    "INSERT INTO languages (
       language_id, name, iso_code, native_name, direction, translations_count,
       translated_name, translated_name_language, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
     ON CONFLICT(language_id) DO UPDATE SET
       name                     = excluded.name,
       iso_code                 = excluded.iso_code,
       native_name              = excluded.native_name,
       direction                = excluded.direction,
       translations_count       = excluded.translations_count,
       translated_name          = excluded.translated_name,
       translated_name_language = excluded.translated_name_language,
       updated_at               = excluded.updated_at,
       deleted_at               = NULL",
    rusqlite::params![
      l.language_id,
      l.name,
      l.iso_code,
      l.native_name,
      l.direction.as_ref(),
      l.translations_count,
      tn,
      tn_lang,
      now,
    ],
  )
}

// ─── QuranStore impl ─────────────────────────────────────────────────────────

impl QuranStore for SqliteStore {
  type Error = crate::Error;

  // ── Coverage ──────────────────────────────────────────────────────────────

  async fn count_chapters(&self) -> Result<u64> {
    self
      .count("SELECT COUNT(*) FROM chapters WHERE deleted_at IS NULL", None)
      .await
  }

  async fn count_translations(&self, language: &str) -> Result<u64> {
    self
      .count(
        "SELECT COUNT(*) FROM chapter_translated_names
         WHERE language_code = ?1 AND deleted_at IS NULL",
        Some(language.to_owned()),
      )
      .await
  }

  async fn count_languages(&self) -> Result<u64> {
    self
      .count("SELECT COUNT(*) FROM languages WHERE deleted_at IS NULL", None)
      .await
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_chapter(
    &self,
    id: ChapterId,
    language: &str,
    fallback: Option<&str>,
  ) -> Result<Option<ChapterView>> {
    let id_val   = i64::from(id);
    let language = language.to_owned();
    let fallback = fallback.map(str::to_owned);

    let raw: Option<RawChapter> = self
      .conn
      .call(move |conn| {
        let sql = format!("{CHAPTER_SELECT} AND c.chapter_id = ?3");
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params![language, fallback, id_val],
              RawChapter::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawChapter::into_view).transpose()
  }

  async fn list_chapters(&self, query: &ChapterQuery) -> Result<Vec<ChapterView>> {
    let language = query.language.clone();
    let fallback = query.fallback_language.clone();
    let pattern  = query.text.as_deref().map(like_pattern);
    let place    = query.place.map(|p| p.as_ref().to_owned());
    let order_by = match query.order {
      ChapterOrder::Id => "c.chapter_id",
      ChapterOrder::RevelationOrder => "c.revelation_order, c.chapter_id",
    };

    let raws: Vec<RawChapter> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "{CHAPTER_SELECT}
             AND (?3 IS NULL OR c.revelation_place = ?3)
             AND (?4 IS NULL
                  OR c.name_simple  LIKE ?4 ESCAPE '\\'
                  OR c.name_complex LIKE ?4 ESCAPE '\\'
                  OR c.name_arabic  LIKE ?4 ESCAPE '\\'
                  OR t.name         LIKE ?4 ESCAPE '\\')
           ORDER BY {order_by}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![language, fallback, place, pattern],
            RawChapter::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawChapter::into_view).collect()
  }

  async fn chapter_infos(&self, id: ChapterId, language: &str) -> Result<Vec<ChapterInfo>> {
    let id_val   = i64::from(id);
    let language = language.to_owned();

    let raws: Vec<RawInfo> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT chapter_id, language_code, language_name, locale, text, short_text, source
           FROM chapter_info
           WHERE chapter_id = ?1 AND language_code = ?2 AND deleted_at IS NULL
           ORDER BY locale <> '', locale",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_val, language], |row| {
            Ok(RawInfo {
              chapter_id:    row.get(0)?,
              language_code: row.get(1)?,
              language_name: row.get(2)?,
              locale:        row.get(3)?,
              text:          row.get(4)?,
              short_text:    row.get(5)?,
              source:        row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawInfo::into_info).collect()
  }

  async fn list_languages(&self, query: &LanguageQuery) -> Result<Vec<Language>> {
    let pattern   = query.text.as_deref().map(like_pattern);
    let direction = query.direction.map(|d| d.as_ref().to_owned());

    let raws: Vec<RawLanguage> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT language_id, name, iso_code, native_name, direction, translations_count,
                  translated_name, translated_name_language
           FROM languages
           WHERE deleted_at IS NULL
             AND (?1 IS NULL
                  OR name        LIKE ?1 ESCAPE '\\'
                  OR native_name LIKE ?1 ESCAPE '\\'
                  OR iso_code    LIKE ?1 ESCAPE '\\')
             AND (?2 IS NULL OR direction = ?2)
           ORDER BY name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![pattern, direction], RawLanguage::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLanguage::into_language).collect()
  }

  async fn get_language(&self, iso_code: &str) -> Result<Option<Language>> {
    let iso_code = iso_code.to_owned();

    let raw: Option<RawLanguage> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT language_id, name, iso_code, native_name, direction, translations_count,
                      translated_name, translated_name_language
               FROM languages
               WHERE iso_code = ?1 COLLATE NOCASE AND deleted_at IS NULL",
              rusqlite::params![iso_code],
              RawLanguage::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLanguage::into_language).transpose()
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn apply(&self, batch: SyncBatch) -> Result<BatchOutcome> {
    let now = encode_dt(Utc::now());

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut outcome = BatchOutcome::default();
        for upsert in &batch.upserts {
          match upsert {
            Upsert::Chapter(c) => outcome.chapters += upsert_chapter(&tx, c, &now)?,
            Upsert::TranslatedName(n) => {
              outcome.translations += upsert_translated_name(&tx, n, &now, true)?
            }
            Upsert::MissingTranslatedName(n) => {
              outcome.translations += upsert_translated_name(&tx, n, &now, false)?
            }
            Upsert::ChapterInfo(i) => outcome.infos += upsert_info(&tx, i, &now)?,
            Upsert::Language(l) => outcome.languages += upsert_language(&tx, l, &now)?,
          }
        }
        tx.commit()?;
        Ok(outcome)
      })
      .await?;

    Ok(outcome)
  }

  async fn soft_delete_chapter(&self, id: ChapterId) -> Result<bool> {
    let id_val = i64::from(id);
    let now    = encode_dt(Utc::now());

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE chapters SET deleted_at = ?2, updated_at = ?2
           WHERE chapter_id = ?1 AND deleted_at IS NULL",
          rusqlite::params![id_val, now],
        )?;
        if changed > 0 {
          for table in ["chapter_translated_names", "chapter_info"] {
            tx.execute(
              &format!(
                "UPDATE {table} SET deleted_at = ?2, updated_at = ?2
                 WHERE chapter_id = ?1 AND deleted_at IS NULL"
              ),
              rusqlite::params![id_val, now],
            )?;
          }
        }
        tx.commit()?;
        Ok(changed > 0)
      })
      .await?;

    Ok(deleted)
  }
}
