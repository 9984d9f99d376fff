//! # Cache Trait Hierarchy
//!
//! This module defines the trait surface for the cache, separating read-only
//! queries from mutating operations so that generic call-sites can ask for
//! exactly the capability they need.
//!
//! ## Architecture
//!
//! ```text
//!   ┌─────────────────────────────────────────┐
//!   │          ReadOnlyCache<K, V>            │
//!   │                                         │
//!   │  contains(&, &K) → bool                 │
//!   │  len(&) → usize                         │
//!   │  is_empty(&) → bool                     │
//!   │  capacity(&) → usize                    │
//!   └─────────────────────────────────────────┘
//!
//!   ┌─────────────────────────────────────────┐
//!   │            CoreCache<K, V>              │
//!   │                                         │
//!   │  insert(&mut, K, V) → Option<V>         │
//!   │  get(&mut, &K) → Option<&V>             │
//!   │  contains(&, &K) → bool                 │
//!   │  len(&) → usize                         │
//!   │  is_empty(&) → bool                     │
//!   │  capacity(&) → usize                    │
//!   │  clear(&mut)                            │
//!   └──────────────────┬──────────────────────┘
//!                      │ extends
//!                      ▼
//!   ┌─────────────────────────────────────────┐
//!   │          MutableCache<K, V>             │
//!   │                                         │
//!   │  remove(&K) → Option<V>                 │
//!   │  remove_batch(&[K]) → Vec<Option<V>>    │
//!   └─────────────────────────────────────────┘
//! ```
//!
//! The W-TinyLFU policy stores values as `Arc<V>` so that handles returned
//! from `get` stay valid across later evictions and overwrites; it therefore
//! implements `CoreCache<K, Arc<V>>` and `MutableCache<K, Arc<V>>`.
//!
//! ## Trait Summary
//!
//! | Trait           | Extends     | Purpose                            |
//! |-----------------|-------------|------------------------------------|
//! | `ReadOnlyCache` | -           | Shared-reference queries           |
//! | `CoreCache`     | -           | Universal cache operations         |
//! | `MutableCache`  | `CoreCache` | Adds arbitrary key removal         |

/// Read-only cache queries that take `&self`.
///
/// None of these operations affect eviction order, frequency state, or the
/// hit/miss counters. Use this bound for monitoring and assertion code that
/// must not perturb the policy.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use wtinylfu::traits::ReadOnlyCache;
/// use wtinylfu::policy::wtinylfu::WTinyLfuCache;
///
/// fn occupancy<C: ReadOnlyCache<u64, Arc<&'static str>>>(cache: &C) -> f64 {
///     cache.len() as f64 / cache.capacity() as f64
/// }
///
/// let mut cache: WTinyLfuCache<u64, &str> = WTinyLfuCache::new(10);
/// cache.insert(1, "one");
/// assert!(occupancy(&cache) > 0.0);
/// ```
pub trait ReadOnlyCache<K, V> {
    /// Checks if a key exists without updating access state.
    fn contains(&self, key: &K) -> bool;

    /// Returns the current number of entries in the cache.
    fn len(&self) -> usize;

    /// Returns `true` if the cache contains no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum capacity of the cache.
    fn capacity(&self) -> usize;
}

/// Core cache operations that all caches support.
///
/// This trait defines the fundamental operations that make sense for any
/// cache type, regardless of eviction policy.
///
/// # Type Parameters
///
/// - `K`: Key type (implementations typically require `Eq + Hash`)
/// - `V`: Value type
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use wtinylfu::traits::CoreCache;
/// use wtinylfu::policy::wtinylfu::WTinyLfuCache;
///
/// fn warm_cache<C: CoreCache<u64, Arc<String>>>(cache: &mut C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.insert(*key, Arc::new(value.clone()));
///     }
/// }
///
/// let mut cache = WTinyLfuCache::new(100);
/// warm_cache(&mut cache, &[(1, "one".to_string()), (2, "two".to_string())]);
/// assert_eq!(CoreCache::len(&cache), 2);
/// ```
pub trait CoreCache<K, V> {
    /// Inserts a key-value pair, returning the previous value if it existed.
    ///
    /// If the cache is at capacity, an entry may be evicted according to the
    /// cache's eviction policy before the new entry is inserted.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Gets a reference to a value by key.
    ///
    /// May update internal state (recency, frequency) depending on the
    /// eviction policy. Use [`contains`](Self::contains) if you only need
    /// to check existence without affecting eviction order.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Checks if a key exists without updating access state.
    fn contains(&self, key: &K) -> bool;

    /// Returns the current number of entries in the cache.
    fn len(&self) -> usize;

    /// Returns `true` if the cache contains no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum capacity of the cache.
    fn capacity(&self) -> usize;

    /// Removes all entries from the cache.
    fn clear(&mut self);
}

/// Caches that support arbitrary key-based removal.
///
/// This trait extends [`CoreCache`] with the ability to remove entries by
/// key. Removal of an absent key is a no-op returning `None`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use wtinylfu::traits::{CoreCache, MutableCache};
/// use wtinylfu::policy::wtinylfu::WTinyLfuCache;
///
/// fn invalidate_keys<C: MutableCache<u64, Arc<String>>>(cache: &mut C, keys: &[u64]) {
///     for key in keys {
///         cache.remove(key);
///     }
/// }
///
/// let mut cache = WTinyLfuCache::new(100);
/// cache.insert(1, "one".to_string());
/// cache.insert(2, "two".to_string());
/// cache.insert(3, "three".to_string());
///
/// invalidate_keys(&mut cache, &[1, 3]);
/// assert!(!CoreCache::contains(&cache, &1));
/// assert!(CoreCache::contains(&cache, &2));
/// assert!(!CoreCache::contains(&cache, &3));
/// ```
pub trait MutableCache<K, V>: CoreCache<K, V> {
    /// Removes a specific key-value pair.
    ///
    /// Returns the removed value if the key existed, or `None` if it didn't.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Removes multiple keys.
    ///
    /// Returns a vector of `Option<V>` in the same order as the input keys.
    /// The default implementation loops over [`remove`](Self::remove).
    fn remove_batch(&mut self, keys: &[K]) -> Vec<Option<V>> {
        keys.iter().map(|k| self.remove(k)).collect()
    }
}
