use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use tracing::debug;

use super::CacheKey;

/// Unbounded in-memory key-value cache shared across concurrent fetch tasks.
///
/// Cloning shares the underlying map. Inserting one key never disturbs the
/// others; concurrent writers to the same key are last-writer-wins, which is
/// acceptable because concurrent fetches use disjoint keys in practice.
pub struct MemoryCache<V> {
  inner: Arc<RwLock<HashMap<String, V>>>,
}

impl<V: Clone> MemoryCache<V> {
  pub fn new() -> Self {
    Self {
      inner: Arc::new(RwLock::new(HashMap::new())),
    }
  }

  /// Look up a key, cloning the stored value on a hit.
  pub fn get(&self, key: &impl CacheKey) -> Option<V> {
    // Poisoning only means another task panicked; the map itself is intact
    let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
    map.get(&key.cache_key()).cloned()
  }

  /// Store a value under a key, leaving every other entry untouched.
  pub fn insert(&self, key: &impl CacheKey, value: V) {
    let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
    map.insert(key.cache_key(), value);
  }

  /// Drop every entry. The only invalidation the cache supports.
  pub fn reset(&self) {
    let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
    if !map.is_empty() {
      debug!(entries = map.len(), "resetting cache");
    }
    map.clear();
  }

  pub fn len(&self) -> usize {
    let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
    map.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Serve a key from the cache, or run the fetcher and store its result.
  ///
  /// On a hit the fetcher is never invoked, so no network traffic happens
  /// for a populated key. On a miss the resolved value is merged in under
  /// the key and returned.
  pub async fn get_or_fetch<K, F, Fut, E>(&self, key: &K, fetcher: F) -> Result<V, E>
  where
    K: CacheKey,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, E>>,
  {
    if let Some(hit) = self.get(key) {
      debug!(key = %key.description(), "cache hit");
      return Ok(hit);
    }

    debug!(key = %key.description(), "cache miss, fetching");
    let value = fetcher().await?;
    self.insert(key, value.clone());
    Ok(value)
  }
}

impl<V> Clone for MemoryCache<V> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<V: Clone> Default for MemoryCache<V> {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};

  struct Key(&'static str);

  impl CacheKey for Key {
    fn cache_key(&self) -> String {
      self.0.to_string()
    }

    fn description(&self) -> String {
      self.0.to_string()
    }
  }

  #[tokio::test]
  async fn test_hit_skips_the_fetcher() {
    let cache: MemoryCache<Vec<u32>> = MemoryCache::new();
    cache.insert(&Key("a"), vec![1, 2]);

    let calls = AtomicU32::new(0);
    let result = cache
      .get_or_fetch(&Key("a"), || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(vec![9])
      })
      .await
      .unwrap();

    assert_eq!(result, vec![1, 2]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_miss_fetches_once_then_hits() {
    let cache: MemoryCache<Vec<u32>> = MemoryCache::new();
    let calls = AtomicU32::new(0);

    for _ in 0..3 {
      let result = cache
        .get_or_fetch(&Key("a"), || async {
          calls.fetch_add(1, Ordering::SeqCst);
          Ok::<_, String>(vec![7])
        })
        .await
        .unwrap();
      assert_eq!(result, vec![7]);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_miss_preserves_other_keys() {
    let cache: MemoryCache<Vec<u32>> = MemoryCache::new();
    cache.insert(&Key("a"), vec![1]);
    cache.insert(&Key("b"), vec![2]);

    cache
      .get_or_fetch(&Key("c"), || async { Ok::<_, String>(vec![3]) })
      .await
      .unwrap();

    assert_eq!(cache.len(), 3);
    assert_eq!(cache.get(&Key("a")), Some(vec![1]));
    assert_eq!(cache.get(&Key("b")), Some(vec![2]));
    assert_eq!(cache.get(&Key("c")), Some(vec![3]));
  }

  #[tokio::test]
  async fn test_fetch_error_is_not_cached() {
    let cache: MemoryCache<Vec<u32>> = MemoryCache::new();

    let result = cache
      .get_or_fetch(&Key("a"), || async { Err::<Vec<u32>, _>("boom".to_string()) })
      .await;

    assert_eq!(result.unwrap_err(), "boom");
    assert!(cache.is_empty());
  }

  #[test]
  fn test_reset_clears_everything() {
    let cache: MemoryCache<u32> = MemoryCache::new();
    cache.insert(&Key("a"), 1);
    cache.insert(&Key("b"), 2);

    cache.reset();

    assert!(cache.is_empty());
    assert_eq!(cache.get(&Key("a")), None);
  }

  #[test]
  fn test_clones_share_the_map() {
    let cache: MemoryCache<u32> = MemoryCache::new();
    let other = cache.clone();

    cache.insert(&Key("a"), 1);
    assert_eq!(other.get(&Key("a")), Some(1));

    other.reset();
    assert!(cache.is_empty());
  }
}
