//! Persistent [`ResponseCache`] on the `response_cache` table.

use std::time::Duration;

use chrono::Utc;
use quran_core::cache::ResponseCache;
use rusqlite::OptionalExtension as _;
use serde_json::Value;
use tracing::info;

use crate::{Error, Result, SqliteStore};

fn now_ms() -> i64 { Utc::now().timestamp_millis() }

impl SqliteStore {
  /// Delete every expired response-cache entry. Returns the number removed.
  pub async fn purge_expired(&self) -> Result<usize> {
    let now = now_ms();
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM response_cache WHERE expires_at <= ?1",
          rusqlite::params![now],
        )?)
      })
      .await?;
    info!(removed, "purged expired response cache entries");
    Ok(removed)
  }
}

impl ResponseCache for SqliteStore {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<Value>> {
    let key = key.to_owned();
    let now = now_ms();

    let payload: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT payload FROM response_cache WHERE cache_key = ?1 AND expires_at > ?2",
              rusqlite::params![key, now],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    payload
      .map(|p| serde_json::from_str(&p))
      .transpose()
      .map_err(Error::from)
  }

  async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<()> {
    let key        = key.to_owned();
    let payload    = serde_json::to_string(&value)?;
    let ttl_ms     = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    let expires_at = now_ms().saturating_add(ttl_ms);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO response_cache (cache_key, payload, expires_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(cache_key) DO UPDATE SET
             payload    = excluded.payload,
             expires_at = excluded.expires_at",
          rusqlite::params![key, payload, expires_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn invalidate(&self, key: &str) -> Result<()> {
    let key = key.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM response_cache WHERE cache_key = ?1", rusqlite::params![key])?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
