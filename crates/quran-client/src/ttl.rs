//! Per-entry expiry for the moka caches in this crate.

use std::time::{Duration, Instant};

use moka::{Expiry, future::Cache};

/// A cached value and how long it lives from its last write.
#[derive(Debug, Clone)]
pub(crate) struct Expiring<V> {
  pub value: V,
  pub ttl:   Duration,
}

impl<V> Expiring<V> {
  pub fn new(value: V, ttl: Duration) -> Self { Self { value, ttl } }
}

/// Expires each entry after its own `ttl`. Overwrites restart the clock.
struct PerEntryTtl;

impl<V> Expiry<String, Expiring<V>> for PerEntryTtl {
  fn expire_after_create(
    &self,
    _key: &String,
    entry: &Expiring<V>,
    _created_at: Instant,
  ) -> Option<Duration> {
    Some(entry.ttl)
  }

  fn expire_after_update(
    &self,
    _key: &String,
    entry: &Expiring<V>,
    _updated_at: Instant,
    _remaining: Option<Duration>,
  ) -> Option<Duration> {
    Some(entry.ttl)
  }
}

/// A string-keyed cache bounded to `max_capacity` entries, each expiring
/// after the `ttl` it was written with.
pub(crate) fn ttl_cache<V>(max_capacity: u64) -> Cache<String, Expiring<V>>
where
  V: Clone + Send + Sync + 'static,
{
  Cache::builder()
    .max_capacity(max_capacity)
    .expire_after(PerEntryTtl)
    .build()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn entries_expire_after_their_own_ttl() {
    let cache = ttl_cache::<u32>(16);
    cache.insert("short".into(), Expiring::new(1, Duration::from_millis(100))).await;
    cache.insert("long".into(), Expiring::new(2, Duration::from_secs(60))).await;

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(cache.get("short").await.is_none());
    assert_eq!(cache.get("long").await.map(|e| e.value), Some(2));
  }

  #[tokio::test]
  async fn overwrite_takes_the_new_ttl() {
    let cache = ttl_cache::<u32>(16);
    cache.insert("k".into(), Expiring::new(1, Duration::from_secs(60))).await;
    cache.insert("k".into(), Expiring::new(2, Duration::from_millis(100))).await;

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(cache.get("k").await.is_none());
  }
}
