//! The time-expiring key-value store.

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A cached payload with its expiry instant.
struct Entry {
  value: serde_json::Value,
  expires_at: DateTime<Utc>,
  /// Matches the generation of the eviction timer that may remove it.
  generation: u64,
}

/// Pending deferred eviction for one key.
struct EvictionTimer {
  generation: u64,
  handle: JoinHandle<()>,
}

#[derive(Default)]
struct Inner {
  entries: HashMap<String, Entry>,
  timers: HashMap<String, EvictionTimer>,
  next_generation: u64,
}

/// In-memory, time-expiring key-value store.
///
/// Values are stored as serialized JSON so any entity type can share one
/// cache instance. A read after expiry is a miss, never a stale hit: expiry
/// is enforced lazily on every read, with a deferred per-key eviction task
/// reclaiming memory when a runtime is available. Re-`set`ting a key cancels
/// and replaces its pending timer; a superseded timer can never evict a
/// newer entry because each entry carries the generation its timer was
/// armed with.
///
/// Handles are cheap to clone and share one underlying store.
#[derive(Clone, Default)]
pub struct EntityCache {
  inner: Arc<Mutex<Inner>>,
}

fn lock(inner: &Mutex<Inner>) -> std::sync::MutexGuard<'_, Inner> {
  // A poisoned lock only means some holder panicked; the map is still usable.
  inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl EntityCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Store `value` under `key` for `ttl`.
  ///
  /// Serialization failure is logged and swallowed: cache writes are an
  /// optimization and must never fail an operation that produced the value.
  pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
    let value = match serde_json::to_value(value) {
      Ok(v) => v,
      Err(e) => {
        warn!(key, error = %e, "failed to serialize cache value, skipping");
        return;
      }
    };

    let mut inner = lock(&self.inner);
    let generation = inner.next_generation;
    inner.next_generation += 1;

    inner.entries.insert(
      key.to_string(),
      Entry {
        value,
        expires_at: Utc::now() + ttl,
        generation,
      },
    );

    if let Some(old) = inner.timers.remove(key) {
      old.handle.abort();
    }

    // Deferred eviction. Without a runtime (sync callers in tests), lazy
    // expiry on read still guarantees correctness; the timer only reclaims
    // memory.
    if let Ok(runtime) = tokio::runtime::Handle::try_current() {
      let store = Arc::clone(&self.inner);
      let timer_key = key.to_string();
      let sleep = ttl.to_std().unwrap_or_default();
      let handle = runtime.spawn(async move {
        tokio::time::sleep(sleep).await;
        let mut inner = lock(&store);
        let current = inner.entries.get(&timer_key).map(|e| e.generation);
        if current == Some(generation) {
          inner.entries.remove(&timer_key);
          debug!(key = %timer_key, "evicted expired cache entry");
        }
        if inner.timers.get(&timer_key).map(|t| t.generation) == Some(generation) {
          inner.timers.remove(&timer_key);
        }
      });
      inner
        .timers
        .insert(key.to_string(), EvictionTimer { generation, handle });
    }
  }

  /// Read the value under `key`, or `None` if absent or expired.
  ///
  /// Reads have no side effect: no sliding expiry, no eviction.
  pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
    let inner = lock(&self.inner);
    let entry = inner.entries.get(key)?;
    if Utc::now() >= entry.expires_at {
      return None;
    }
    match serde_json::from_value(entry.value.clone()) {
      Ok(v) => Some(v),
      Err(e) => {
        warn!(key, error = %e, "cached value failed to deserialize, treating as miss");
        None
      }
    }
  }

  /// Whether a live (non-expired) entry exists for `key`.
  pub fn has(&self, key: &str) -> bool {
    let inner = lock(&self.inner);
    inner
      .entries
      .get(key)
      .is_some_and(|e| Utc::now() < e.expires_at)
  }

  /// Cancel any pending eviction and delete the entry. No-op if absent.
  pub fn remove(&self, key: &str) {
    let mut inner = lock(&self.inner);
    if let Some(timer) = inner.timers.remove(key) {
      timer.handle.abort();
    }
    inner.entries.remove(key);
  }

  /// Cancel all timers and empty the store. Used on logout/teardown.
  pub fn clear(&self) {
    let mut inner = lock(&self.inner);
    for (_, timer) in inner.timers.drain() {
      timer.handle.abort();
    }
    inner.entries.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration as StdDuration;

  #[tokio::test]
  async fn get_before_ttl_hits_after_ttl_misses() {
    let cache = EntityCache::new();
    cache.set("issue:list", &vec![1, 2, 3], Duration::milliseconds(40));

    assert_eq!(cache.get::<Vec<i32>>("issue:list"), Some(vec![1, 2, 3]));
    assert!(cache.has("issue:list"));

    tokio::time::sleep(StdDuration::from_millis(60)).await;
    assert_eq!(cache.get::<Vec<i32>>("issue:list"), None);
    assert!(!cache.has("issue:list"));
  }

  #[tokio::test]
  async fn reset_cancels_the_pending_eviction() {
    let cache = EntityCache::new();
    cache.set("k", &"short", Duration::milliseconds(20));
    cache.set("k", &"long", Duration::minutes(10));

    // The first timer would have fired by now; the second set must survive it.
    tokio::time::sleep(StdDuration::from_millis(60)).await;
    assert_eq!(cache.get::<String>("k"), Some("long".to_string()));
  }

  #[tokio::test]
  async fn remove_and_clear_delete_entries() {
    let cache = EntityCache::new();
    cache.set("a", &1, Duration::minutes(5));
    cache.set("b", &2, Duration::minutes(5));

    cache.remove("a");
    assert!(!cache.has("a"));
    assert!(cache.has("b"));

    // Removing an absent key is a no-op.
    cache.remove("a");

    cache.clear();
    assert!(!cache.has("b"));
  }

  #[tokio::test]
  async fn type_mismatch_reads_as_miss() {
    let cache = EntityCache::new();
    cache.set("k", &"text", Duration::minutes(5));
    assert_eq!(cache.get::<u64>("k"), None);
  }
}
