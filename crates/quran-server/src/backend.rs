//! The response cache chosen at startup.

use std::time::Duration;

use quran_client::cache::MemoryCache;
use quran_core::cache::ResponseCache;
use quran_store_sqlite::SqliteStore;
use serde_json::Value;
use thiserror::Error;

/// Either an in-process cache or the `response_cache` table of the store.
pub enum CacheBackend {
  Memory(MemoryCache),
  Sqlite(SqliteStore),
}

#[derive(Debug, Error)]
pub enum CacheError {
  #[error(transparent)]
  Sqlite(#[from] quran_store_sqlite::Error),
}

impl ResponseCache for CacheBackend {
  type Error = CacheError;

  async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
    match self {
      CacheBackend::Memory(cache) => {
        let Ok(hit) = cache.get(key).await;
        Ok(hit)
      }
      CacheBackend::Sqlite(store) => Ok(store.get(key).await?),
    }
  }

  async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
    match self {
      CacheBackend::Memory(cache) => {
        let Ok(()) = cache.put(key, value, ttl).await;
        Ok(())
      }
      CacheBackend::Sqlite(store) => Ok(store.put(key, value, ttl).await?),
    }
  }

  async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
    match self {
      CacheBackend::Memory(cache) => {
        let Ok(()) = cache.invalidate(key).await;
        Ok(())
      }
      CacheBackend::Sqlite(store) => Ok(store.invalidate(key).await?),
    }
  }
}
