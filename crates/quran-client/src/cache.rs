//! In-process response cache and the memoising fetch helper.

use std::{convert::Infallible, future::Future, time::Duration};

use moka::future::Cache;
use quran_core::cache::ResponseCache;
use serde_json::Value;
use tracing::{debug, warn};

use crate::ttl::{Expiring, ttl_cache};

/// Entries held by [`MemoryCache::new`] before the least useful are evicted.
pub const DEFAULT_CAPACITY: u64 = 10_000;

/// A [`ResponseCache`] held in process memory. Lost on restart.
#[derive(Debug)]
pub struct MemoryCache {
  entries: Cache<String, Expiring<Value>>,
}

impl MemoryCache {
  pub fn new() -> Self { Self::with_capacity(DEFAULT_CAPACITY) }

  pub fn with_capacity(max_entries: u64) -> Self {
    Self { entries: ttl_cache(max_entries) }
  }
}

impl Default for MemoryCache {
  fn default() -> Self { Self::new() }
}

impl ResponseCache for MemoryCache {
  type Error = Infallible;

  async fn get(&self, key: &str) -> Result<Option<Value>, Infallible> {
    Ok(self.entries.get(key).await.map(|entry| entry.value))
  }

  async fn put(&self, key: &str, value: Value, ttl: Duration) -> Result<(), Infallible> {
    self.entries.insert(key.to_owned(), Expiring::new(value, ttl)).await;
    Ok(())
  }

  async fn invalidate(&self, key: &str) -> Result<(), Infallible> {
    self.entries.invalidate(key).await;
    Ok(())
  }
}

/// Return the cached payload under `key`, or run `fetch` and cache what it
/// returns for `ttl`.
///
/// `Ok(None)` from `fetch` is passed through uncached, so absent resources
/// are re-fetched on every call. Cache failures are logged and treated as
/// misses.
pub async fn get_or_fetch<C, F, Fut, E>(
  cache: &C,
  key: &str,
  ttl: Duration,
  fetch: F,
) -> Result<Option<Value>, E>
where
  C: ResponseCache + ?Sized,
  F: FnOnce() -> Fut,
  Fut: Future<Output = Result<Option<Value>, E>>,
{
  match cache.get(key).await {
    Ok(Some(hit)) => {
      debug!(key, "response cache hit");
      return Ok(Some(hit));
    }
    Ok(None) => debug!(key, "response cache miss"),
    Err(e) => warn!(key, error = %e, "response cache read failed; fetching"),
  }

  let fetched = fetch().await?;

  if let Some(value) = &fetched
    && let Err(e) = cache.put(key, value.clone(), ttl).await
  {
    warn!(key, error = %e, "response cache write failed");
  }

  Ok(fetched)
}
