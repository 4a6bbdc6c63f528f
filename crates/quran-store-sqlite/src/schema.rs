//! SQL schema for the Quran SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Rows are soft-deleted via deleted_at and revived by the next upsert.
CREATE TABLE IF NOT EXISTS chapters (
    chapter_id        INTEGER PRIMARY KEY CHECK (chapter_id BETWEEN 1 AND 114),
    revelation_place  TEXT    NOT NULL,   -- 'makkah' | 'madinah'
    revelation_order  INTEGER NOT NULL,
    bismillah_pre     INTEGER NOT NULL,
    name_simple       TEXT    NOT NULL,
    name_complex      TEXT    NOT NULL,
    name_arabic       TEXT    NOT NULL,
    verses_count      INTEGER NOT NULL,
    page_start        INTEGER NOT NULL,
    page_end          INTEGER NOT NULL,
    created_at        TEXT    NOT NULL,   -- RFC 3339 UTC
    updated_at        TEXT    NOT NULL,
    deleted_at        TEXT
);

CREATE TABLE IF NOT EXISTS chapter_translated_names (
    id             INTEGER PRIMARY KEY,
    chapter_id     INTEGER NOT NULL REFERENCES chapters(chapter_id),
    language_code  TEXT    NOT NULL,
    language_name  TEXT    NOT NULL,
    name           TEXT    NOT NULL,
    created_at     TEXT    NOT NULL,
    updated_at     TEXT    NOT NULL,
    deleted_at     TEXT,
    UNIQUE (chapter_id, language_code)
);

-- The empty string stands for \"no locale\" so UNIQUE treats it as one value.
CREATE TABLE IF NOT EXISTS chapter_info (
    id             INTEGER PRIMARY KEY,
    chapter_id     INTEGER NOT NULL REFERENCES chapters(chapter_id),
    language_code  TEXT    NOT NULL,
    language_name  TEXT    NOT NULL,
    locale         TEXT    NOT NULL DEFAULT '',
    text           TEXT    NOT NULL,
    short_text     TEXT    NOT NULL DEFAULT '',
    source         TEXT    NOT NULL DEFAULT '',
    created_at     TEXT    NOT NULL,
    updated_at     TEXT    NOT NULL,
    deleted_at     TEXT,
    UNIQUE (chapter_id, language_code, locale)
);

CREATE TABLE IF NOT EXISTS languages (
    language_id             INTEGER PRIMARY KEY,   -- upstream id
    name                    TEXT    NOT NULL,
    iso_code                TEXT    NOT NULL UNIQUE,
    native_name             TEXT    NOT NULL DEFAULT '',
    direction               TEXT    NOT NULL DEFAULT 'ltr',
    translations_count      INTEGER NOT NULL DEFAULT 0,
    translated_name         TEXT,
    translated_name_language TEXT,
    created_at              TEXT    NOT NULL,
    updated_at              TEXT    NOT NULL,
    deleted_at              TEXT
);

-- Raw upstream payloads. Never a source of truth.
CREATE TABLE IF NOT EXISTS response_cache (
    cache_key   TEXT    PRIMARY KEY,
    payload     TEXT    NOT NULL,   -- JSON
    expires_at  INTEGER NOT NULL    -- unix milliseconds
);

CREATE INDEX IF NOT EXISTS translated_names_language_idx ON chapter_translated_names(language_code);
CREATE INDEX IF NOT EXISTS chapter_info_lookup_idx       ON chapter_info(chapter_id, language_code);
CREATE INDEX IF NOT EXISTS chapters_place_idx            ON chapters(revelation_place);
CREATE INDEX IF NOT EXISTS response_cache_expiry_idx     ON response_cache(expires_at);

PRAGMA user_version = 1;
";
