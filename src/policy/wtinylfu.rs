//! Window-TinyLFU (W-TinyLFU) cache replacement policy.
//!
//! Combines recency and frequency: a small window LRU absorbs new entries
//! and temporal bursts, while the main segmented LRU holds the proven
//! working set behind a TinyLFU admission filter. The filter compares the
//! estimated access frequency of the window's victim against the main
//! cache's victim and keeps whichever has the better history, which
//! approximates optimal hit ratios on skewed workloads without letting
//! one-shot scans pollute the cache.
//!
//! ## Architecture
//!
//! ```text
//!            window victim  ┌──────────┐  main victim
//!          ┌───────────────▶│ TinyLFU  │◀───────────────┐
//!          │                │ (sketch) │                │
//!   ┌──────┴───────┐        └────┬─────┘        ┌───────┴──────────────┐
//!   │ window (~1%) │             │              │ main (~99%, SLRU)    │
//!   │    (LRU)     │             │              │ eden 80% | prob. 20% │
//!   └──────────────┘             │              └──────────────────────┘
//!          ▲                     └── winner readmitted ──▲
//!          │
//!      new entry
//!
//!   All pages live in one PageStore, which also carries each node's
//!   intrusive prev/next links; a queue is just a pair of endpoints:
//!
//!   pages: PageStore<Page>               index: FxHashMap<K, PageId>
//!   ┌────────┬──────────────────────────────────┐   ┌───────┬────────┐
//!   │ PageId │ node: page + links               │   │  Key  │ PageId │
//!   ├────────┼──────────────────────────────────┤   ├───────┼────────┤
//!   │ id_0   │ { "a", Window, … } ◄──► …        │◀──│ "a"   │ id_0   │
//!   │ id_1   │ { "b", Probationary, … } ◄──► …  │   │ "b"   │ id_1   │
//!   │ id_2   │ { "c", Eden, … } ◄──► …          │   │ "c"   │ id_2   │
//!   └────────┴──────────────────────────────────┘   └───────┴────────┘
//!
//!   Splicing a page between queues rewires two links and retags the
//!   segment; the PageId (and therefore the index entry) never changes.
//! ```
//!
//! ## Page lifecycle
//!
//! ```text
//!             insert
//!   (none) ──────────▶ window
//!                        │ window full
//!                        ├─ cache under-full ───────────▶ probationary
//!                        └─ cache full: admission duel
//!                             ├─ window victim wins ────▶ probationary
//!                             └─ loses (incl. ties) ────▶ (dropped)
//!                                          probationary
//!                                               │ hit
//!                                               ▼
//!                                             eden
//!                                               │ eden overflow
//!                                               ▼
//!                                          probationary
//!                                               │ LRU victim loses duel
//!                                               ▼
//!                                           (dropped)
//! ```
//!
//! ## Operations
//!
//! | Operation           | Time  | Notes                                     |
//! |---------------------|-------|-------------------------------------------|
//! | `get`               | O(1)  | Records a sketch access even on a miss    |
//! | `insert`            | O(1)  | May run one admission duel                |
//! | `contains`          | O(1)  | Index lookup only; no side effects        |
//! | `remove`            | O(1)  | No-op for absent keys                     |
//! | `change_capacity`   | O(k)  | k = entries trimmed to fit the new size   |
//! | `clear`             | O(n)  | Also clears sketch history and counters   |
//!
//! ## Sizing
//!
//! - window capacity: `max(1, ceil(0.01 × total))`
//! - main capacity: `total − window`
//! - eden gets 80% of main (truncated, then corrected upward by one when
//!   the two truncations lose a unit), probationary the rest
//!
//! The eden/probationary split steers promotion and demotion; only the
//! window and total capacities are hard bounds. A freshly filled cache
//! holds everything in probationary until hits promote pages to eden.
//!
//! ## Thread Safety
//!
//! - Not thread-safe; callers synchronize externally.
//! - Values are handed out as `Arc<V>`, so a handle returned by `get`
//!   stays valid after later evictions or overwrites.
//!
//! ## References
//!
//! - Einziger, Friedman, Manes: "TinyLFU: A Highly Efficient Cache
//!   Admission Policy", 2015
//! - Karedla et al., "Caching Strategies to Improve Disk System
//!   Performance", 1994 (SLRU)

use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::ds::frequency_sketch::FrequencySketch;
use crate::ds::page_store::{PageId, PageStore};
use crate::error::ConfigError;
#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;
use crate::traits::{CoreCache, MutableCache, ReadOnlyCache};

#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::WTinyLfuMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::WTinyLfuMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, MetricsReset, MetricsSnapshotProvider, WTinyLfuMetricsRecorder,
};

/// Which queue a page currently resides in.
///
/// Redundant with the list that links the page, but lets a hit dispatch in
/// O(1) without asking every queue.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Segment {
    /// Recently inserted; still riding the admission window.
    Window,
    /// In the main cache, accessed once since admission.
    Probationary,
    /// In the main cache, accessed at least twice.
    Eden,
}

/// One cached entry: the key, its queue tag, and the shared value handle.
/// The queue links live next to the page, inside its [`PageStore`] node.
#[derive(Debug)]
struct Page<K, V> {
    key: K,
    segment: Segment,
    data: Arc<V>,
}

/// LRU queue threaded through the shared page store.
///
/// Head is MRU, tail is LRU (the victim). The queue owns only its
/// endpoints and a capacity target; pages and their links live in the
/// store, so a page can be spliced between queues without invalidating
/// its `PageId`.
#[derive(Debug)]
struct LruQueue {
    head: Option<PageId>,
    tail: Option<PageId>,
    len: usize,
    capacity: usize,
    /// Tag stamped on every page attached to this queue.
    segment: Segment,
}

impl LruQueue {
    fn new(capacity: usize, segment: Segment) -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            capacity,
            segment,
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn is_full(&self) -> bool {
        self.len >= self.capacity
    }

    /// Sets the capacity target only. Pages are never dropped here: the
    /// owner trims via its victim path so the key index stays consistent.
    fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    /// The LRU page, next in line for eviction.
    fn victim(&self) -> Option<PageId> {
        self.tail
    }

    /// Stores `page` and attaches it at the MRU position.
    fn insert<K, V>(&mut self, pages: &mut PageStore<Page<K, V>>, page: Page<K, V>) -> PageId {
        let id = pages.insert(page);
        self.attach_mru(pages, id);
        id
    }

    /// Moves an existing page of this queue to the MRU position.
    fn move_to_mru<K, V>(&mut self, pages: &mut PageStore<Page<K, V>>, id: PageId) {
        if self.head == Some(id) {
            return;
        }
        if self.detach(pages, id).is_some() {
            self.attach_mru(pages, id);
        }
    }

    /// Splices a page out of `source` and onto this queue's MRU position,
    /// retagging its segment. The page's `PageId` stays valid.
    fn transfer_from<K, V>(
        &mut self,
        pages: &mut PageStore<Page<K, V>>,
        id: PageId,
        source: &mut LruQueue,
    ) {
        if source.detach(pages, id).is_some() {
            self.attach_mru(pages, id);
        }
    }

    /// Unlinks and frees the LRU page, returning it.
    fn pop_lru<K, V>(&mut self, pages: &mut PageStore<Page<K, V>>) -> Option<Page<K, V>> {
        let id = self.tail?;
        self.detach(pages, id)?;
        pages.remove(id)
    }

    /// Forgets the endpoints. The owner is responsible for the store contents.
    fn clear(&mut self) {
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn attach_mru<K, V>(&mut self, pages: &mut PageStore<Page<K, V>>, id: PageId) {
        let old_head = self.head;
        pages.set_prev(id, None);
        pages.set_next(id, old_head);
        if let Some(page) = pages.get_mut(id) {
            page.segment = self.segment;
        }
        match old_head {
            Some(head) => pages.set_prev(head, Some(id)),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.len += 1;
    }

    fn detach<K, V>(&mut self, pages: &mut PageStore<Page<K, V>>, id: PageId) -> Option<()> {
        let (prev, next) = pages.links(id)?;
        debug_assert!(
            pages.get(id).is_some_and(|page| page.segment == self.segment),
            "page detached from wrong queue"
        );

        match prev {
            Some(prev_id) => pages.set_next(prev_id, next),
            None => self.head = next,
        }
        match next {
            Some(next_id) => pages.set_prev(next_id, prev),
            None => self.tail = prev,
        }

        pages.unlink(id);
        self.len -= 1;
        Some(())
    }
}

/// The segmented main cache: an eden queue for pages hit at least twice
/// and a probationary queue for the rest.
#[derive(Debug)]
struct SlruQueues {
    eden: LruQueue,
    probationary: LruQueue,
}

impl SlruQueues {
    fn new(capacity: usize) -> Self {
        let (eden_cap, probationary_cap) = split_capacity(capacity);
        Self {
            eden: LruQueue::new(eden_cap, Segment::Eden),
            probationary: LruQueue::new(probationary_cap, Segment::Probationary),
        }
    }

    fn len(&self) -> usize {
        self.eden.len() + self.probationary.len()
    }

    fn capacity(&self) -> usize {
        self.eden.capacity() + self.probationary.capacity()
    }

    fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    fn set_capacity(&mut self, capacity: usize) {
        let (eden_cap, probationary_cap) = split_capacity(capacity);
        self.eden.set_capacity(eden_cap);
        self.probationary.set_capacity(probationary_cap);
    }

    /// The next eviction candidate: probationary LRU, falling back to the
    /// eden LRU when probationary is empty (possible after a shrink).
    fn victim(&self) -> Option<PageId> {
        self.probationary.victim().or_else(|| self.eden.victim())
    }

    fn pop_victim<K, V>(&mut self, pages: &mut PageStore<Page<K, V>>) -> Option<Page<K, V>> {
        if self.probationary.victim().is_some() {
            self.probationary.pop_lru(pages)
        } else {
            self.eden.pop_lru(pages)
        }
    }

    /// Accepts a page spliced out of another queue (the window) at the
    /// probationary MRU position.
    fn admit_from<K, V>(
        &mut self,
        pages: &mut PageStore<Page<K, V>>,
        id: PageId,
        source: &mut LruQueue,
    ) {
        self.probationary.transfer_from(pages, id, source);
    }

    /// Moves a hit page to the eden MRU position.
    ///
    /// A probationary page is promoted; if that fills eden, eden's LRU page
    /// is demoted back to the probationary MRU, giving it another chance.
    /// An eden page just moves to the front. Window pages never reach this
    /// path.
    fn handle_hit<K, V>(&mut self, pages: &mut PageStore<Page<K, V>>, id: PageId) {
        let Some(segment) = pages.get(id).map(|page| page.segment) else {
            return;
        };
        match segment {
            Segment::Probationary => {
                self.eden.transfer_from(pages, id, &mut self.probationary);
                if self.eden.is_full() {
                    if let Some(demoted) = self.eden.victim() {
                        self.probationary.transfer_from(pages, demoted, &mut self.eden);
                    }
                }
            },
            Segment::Eden => self.eden.move_to_mru(pages, id),
            Segment::Window => {
                debug_assert!(false, "window page routed into the main cache");
            },
        }
    }

    fn detach<K, V>(&mut self, pages: &mut PageStore<Page<K, V>>, id: PageId) {
        let Some(segment) = pages.get(id).map(|page| page.segment) else {
            return;
        };
        match segment {
            Segment::Eden => {
                let _ = self.eden.detach(pages, id);
            },
            Segment::Probationary => {
                let _ = self.probationary.detach(pages, id);
            },
            Segment::Window => {
                debug_assert!(false, "window page detached via the main cache");
            },
        }
    }

    fn clear(&mut self) {
        self.eden.clear();
        self.probationary.clear();
    }
}

/// `max(1, ceil(0.01 × total))` — the admission window is 1% of the cache,
/// but never empty.
fn window_capacity(total_capacity: usize) -> usize {
    ((0.01 * total_capacity as f64).ceil() as usize).max(1)
}

/// Splits a main-cache capacity 80/20 between eden and probationary.
///
/// Both shares are computed with float truncation the way the capacity is
/// configured; when the two truncations together lose a unit, eden gets it
/// back so the shares always sum to the requested capacity.
fn split_capacity(capacity: usize) -> (usize, usize) {
    let eden = (0.8 * capacity as f64) as usize;
    let probationary = (capacity as f64 - 0.8 * capacity as f64) as usize;
    if eden + probationary < capacity {
        (eden + 1, probationary)
    } else {
        (eden, probationary)
    }
}

/// W-TinyLFU cache mapping keys to shared value handles.
///
/// New entries enter a small LRU window. When the window overflows, its
/// victim either moves into the main cache (while the cache is filling) or
/// duels the main cache's victim on estimated frequency (once full): the
/// entry with the higher estimate survives, with ties keeping the incumbent.
/// Hits inside the main cache promote pages from the probationary segment
/// to eden.
///
/// # Type Parameters
///
/// - `K`: Key type, must be `Eq + Hash + Clone` (one copy lives in the
///   page, lookups clone nothing)
/// - `V`: Value type, stored as `Arc<V>`
///
/// # Example
///
/// ```
/// use wtinylfu::policy::wtinylfu::WTinyLfuCache;
///
/// let mut cache = WTinyLfuCache::new(100);
///
/// cache.insert("page1", "content1");
/// cache.insert("page2", "content2");
///
/// assert_eq!(cache.get(&"page1").as_deref(), Some(&"content1"));
/// assert_eq!(cache.len(), 2);
/// assert_eq!(cache.hit_count(), 1);
///
/// cache.remove(&"page2");
/// assert!(!cache.contains(&"page2"));
/// ```
pub struct WTinyLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Frequency estimator feeding the admission duel.
    sketch: FrequencySketch<K>,
    /// Every live page, addressed by the stable ids the queues link.
    pages: PageStore<Page<K, V>>,
    /// Key → page handle. Holds exactly the keys across all three queues.
    index: FxHashMap<K, PageId>,
    window: LruQueue,
    main: SlruQueues,
    hits: u64,
    misses: u64,
    #[cfg(feature = "metrics")]
    metrics: WTinyLfuMetrics,
}

impl<K, V> WTinyLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache holding up to `capacity` entries.
    ///
    /// Returns a [`ConfigError`] if `capacity` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use wtinylfu::policy::wtinylfu::WTinyLfuCache;
    ///
    /// let cache = WTinyLfuCache::<u64, String>::try_new(100).unwrap();
    /// assert_eq!(cache.capacity(), 100);
    /// assert!(WTinyLfuCache::<u64, String>::try_new(0).is_err());
    /// ```
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("cache capacity must be greater than zero"));
        }
        let window_cap = window_capacity(capacity);
        Ok(Self {
            sketch: FrequencySketch::try_new(capacity)?,
            pages: PageStore::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            window: LruQueue::new(window_cap, Segment::Window),
            main: SlruQueues::new(capacity - window_cap),
            hits: 0,
            misses: 0,
            #[cfg(feature = "metrics")]
            metrics: WTinyLfuMetrics::default(),
        })
    }

    /// Creates a cache holding up to `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Use [`try_new`](Self::try_new) to
    /// handle the error instead.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    /// Returns the current number of cached entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns the total capacity (window plus main).
    pub fn capacity(&self) -> usize {
        self.window.capacity() + self.main.capacity()
    }

    /// Returns the admission window's share of the capacity.
    pub fn window_capacity(&self) -> usize {
        self.window.capacity()
    }

    /// Returns the main cache's share of the capacity.
    pub fn main_capacity(&self) -> usize {
        self.main.capacity()
    }

    /// Number of successful lookups since creation (or the last `clear`).
    pub fn hit_count(&self) -> u64 {
        self.hits
    }

    /// Number of failed lookups since creation (or the last `clear`).
    pub fn miss_count(&self) -> u64 {
        self.misses
    }

    /// Returns `true` if `key` is cached.
    ///
    /// Pure index lookup: no sketch update, no recency change, no counter
    /// movement.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the sketch's current frequency estimate for `key`, in
    /// `0..=15`. Read-only; mainly useful for diagnostics.
    pub fn frequency_estimate(&self, key: &K) -> u8 {
        self.sketch.frequency(key)
    }

    /// Looks up `key`, returning a shared handle to its value.
    ///
    /// The access is recorded in the frequency sketch even on a miss; this
    /// is what lets a repeatedly requested key win a later admission duel.
    /// On a hit the page moves to the MRU position of its queue (promoting
    /// probationary pages to eden) and the hit counter advances; on a miss
    /// the miss counter advances.
    ///
    /// # Example
    ///
    /// ```
    /// use wtinylfu::policy::wtinylfu::WTinyLfuCache;
    ///
    /// let mut cache = WTinyLfuCache::new(10);
    /// cache.insert(1, "one");
    ///
    /// assert_eq!(cache.get(&1).as_deref(), Some(&"one"));
    /// assert_eq!(cache.get(&2), None);
    /// assert_eq!(cache.hit_count(), 1);
    /// assert_eq!(cache.miss_count(), 1);
    /// ```
    pub fn get(&mut self, key: &K) -> Option<Arc<V>> {
        let id = self.access(key)?;
        self.pages.get(id).map(|page| Arc::clone(&page.data))
    }

    /// Looks up `key`, inserting the value produced by `loader` on a miss.
    ///
    /// The loader runs only after the lookup missed, and must not call back
    /// into this cache (which the exclusive borrow already prevents).
    ///
    /// # Example
    ///
    /// ```
    /// use wtinylfu::policy::wtinylfu::WTinyLfuCache;
    ///
    /// let mut cache = WTinyLfuCache::new(10);
    /// let value = cache.get_or_insert_with(7, |k| k * 10);
    /// assert_eq!(*value, 70);
    ///
    /// // Second call hits the cache; the loader does not run.
    /// let value = cache.get_or_insert_with(7, |_| unreachable!());
    /// assert_eq!(*value, 70);
    /// ```
    pub fn get_or_insert_with<F>(&mut self, key: K, loader: F) -> Arc<V>
    where
        F: FnOnce(&K) -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = Arc::new(loader(&key));
        self.insert_shared(key, Arc::clone(&value));
        value
    }

    /// Fallible variant of [`get_or_insert_with`](Self::get_or_insert_with):
    /// a loader error propagates and nothing is inserted.
    ///
    /// # Example
    ///
    /// ```
    /// use wtinylfu::policy::wtinylfu::WTinyLfuCache;
    ///
    /// let mut cache: WTinyLfuCache<u64, u64> = WTinyLfuCache::new(10);
    /// let err: Result<_, &str> = cache.try_get_or_insert_with(7, |_| Err("io error"));
    /// assert!(err.is_err());
    /// assert!(!cache.contains(&7));
    /// ```
    pub fn try_get_or_insert_with<F, E>(&mut self, key: K, loader: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = Arc::new(loader(&key)?);
        self.insert_shared(key, Arc::clone(&value));
        Ok(value)
    }

    /// Inserts `value` under `key`, evicting if necessary.
    ///
    /// An existing key is overwritten in place: the page keeps its queue
    /// position and segment, and the sketch is not touched. Handles
    /// previously returned by [`get`](Self::get) keep the old value alive.
    ///
    /// # Example
    ///
    /// ```
    /// use wtinylfu::policy::wtinylfu::WTinyLfuCache;
    ///
    /// let mut cache = WTinyLfuCache::new(4);
    /// cache.insert(7, 'a');
    /// cache.insert(7, 'b');
    ///
    /// assert_eq!(cache.get(&7).as_deref(), Some(&'b'));
    /// assert_eq!(cache.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) {
        self.insert_shared(key, Arc::new(value));
    }

    /// Like [`insert`](Self::insert), but takes an already shared value.
    /// Returns the replaced value when the key was present.
    pub fn insert_shared(&mut self, key: K, data: Arc<V>) -> Option<Arc<V>> {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if self.window.is_full() {
            self.evict();
        }

        if let Some(&id) = self.index.get(&key) {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();
            let replaced = self
                .pages
                .get_mut(id)
                .map(|page| std::mem::replace(&mut page.data, data));
            #[cfg(debug_assertions)]
            self.debug_check();
            return replaced;
        }

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();
        let page = Page {
            key: key.clone(),
            segment: Segment::Window,
            data,
        };
        let id = self.window.insert(&mut self.pages, page);
        self.index.insert(key, id);

        #[cfg(debug_assertions)]
        self.debug_check();
        None
    }

    /// Removes `key`, returning its value handle. Absent keys are a no-op.
    ///
    /// # Example
    ///
    /// ```
    /// use wtinylfu::policy::wtinylfu::WTinyLfuCache;
    ///
    /// let mut cache = WTinyLfuCache::new(4);
    /// cache.insert(1, "one");
    /// cache.insert(2, "two");
    ///
    /// assert_eq!(cache.remove(&1).as_deref(), Some(&"one"));
    /// assert_eq!(cache.remove(&1), None);
    /// assert_eq!(cache.len(), 1);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        let id = self.index.remove(key)?;
        let segment = self.pages.get(id).map(|page| page.segment)?;
        match segment {
            Segment::Window => {
                let _ = self.window.detach(&mut self.pages, id);
            },
            Segment::Probationary | Segment::Eden => self.main.detach(&mut self.pages, id),
        }
        let removed = self.pages.remove(id).map(|page| page.data);

        #[cfg(debug_assertions)]
        self.debug_check();
        removed
    }

    /// Resizes the cache, trimming entries that no longer fit.
    ///
    /// The sketch is rebuilt for the new capacity, so frequency estimates
    /// degrade until it re-warms. Returns a [`ConfigError`] if `capacity`
    /// is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use wtinylfu::policy::wtinylfu::WTinyLfuCache;
    ///
    /// let mut cache = WTinyLfuCache::new(100);
    /// for key in 0..100u64 {
    ///     cache.insert(key, key);
    /// }
    ///
    /// cache.change_capacity(10).unwrap();
    /// assert!(cache.len() <= 10);
    /// assert_eq!(cache.capacity(), 10);
    /// ```
    pub fn change_capacity(&mut self, capacity: usize) -> Result<(), ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("cache capacity must be greater than zero"));
        }
        self.sketch.change_capacity(capacity)?;
        let window_cap = window_capacity(capacity);
        self.window.set_capacity(window_cap);
        self.main.set_capacity(capacity - window_cap);

        while self.window.is_full() {
            if !self.evict_from_window() {
                break;
            }
        }
        while self.main.is_full() {
            if !self.evict_from_main() {
                break;
            }
        }

        #[cfg(debug_assertions)]
        self.debug_check();
        Ok(())
    }

    /// Drops every entry, the hit/miss counters, and the sketch history.
    pub fn clear(&mut self) {
        self.pages.clear();
        self.index.clear();
        self.window.clear();
        self.main.clear();
        self.sketch.clear();
        self.hits = 0;
        self.misses = 0;
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    /// Shared lookup path: records the sketch access, moves the page, and
    /// keeps the hit/miss counters.
    fn access(&mut self, key: &K) -> Option<PageId> {
        self.sketch.record_access(key);
        if let Some(&id) = self.index.get(key) {
            self.touch_page(id);
            self.hits += 1;
            #[cfg(feature = "metrics")]
            self.metrics.record_get_hit();
            Some(id)
        } else {
            self.misses += 1;
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            None
        }
    }

    /// Routes a hit to the page's queue.
    fn touch_page(&mut self, id: PageId) {
        let Some(segment) = self.pages.get(id).map(|page| page.segment) else {
            return;
        };
        match segment {
            Segment::Window => self.window.move_to_mru(&mut self.pages, id),
            Segment::Probationary => {
                #[cfg(feature = "metrics")]
                {
                    self.metrics.record_probationary_to_eden_promotion();
                    if self.main.eden.len() + 1 >= self.main.eden.capacity() {
                        self.metrics.record_eden_to_probationary_demotion();
                    }
                }
                self.main.handle_hit(&mut self.pages, id);
            },
            Segment::Eden => self.main.handle_hit(&mut self.pages, id),
        }
    }

    /// Makes room in the window. While the cache is filling, the window's
    /// victim is demoted into the main cache; once full, it duels the main
    /// cache's victim on estimated frequency.
    fn evict(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_evict_call();

        if self.len() >= self.capacity() {
            self.evict_from_window_or_main();
        } else if let Some(id) = self.window.victim() {
            #[cfg(feature = "metrics")]
            self.metrics.record_window_to_probationary_demotion();
            self.main.admit_from(&mut self.pages, id, &mut self.window);
        }
    }

    /// The TinyLFU admission duel. A strictly higher estimate admits the
    /// window victim in place of the main victim; ties keep the main
    /// victim, which already proved itself to get where it is.
    fn evict_from_window_or_main(&mut self) {
        let Some(window_victim) = self.window.victim() else {
            return;
        };
        let Some(main_victim) = self.main.victim() else {
            // Nothing in the main cache to duel (its share can be zero at
            // tiny capacities); the window victim is dropped.
            self.evict_from_window();
            return;
        };

        let window_freq = self
            .pages
            .get(window_victim)
            .map_or(0, |page| self.sketch.frequency(&page.key));
        let main_freq = self
            .pages
            .get(main_victim)
            .map_or(0, |page| self.sketch.frequency(&page.key));

        if window_freq > main_freq {
            #[cfg(feature = "metrics")]
            self.metrics.record_admission_win();
            self.evict_from_main();
            self.main
                .admit_from(&mut self.pages, window_victim, &mut self.window);
        } else {
            #[cfg(feature = "metrics")]
            self.metrics.record_admission_loss();
            self.evict_from_window();
        }
    }

    /// Drops the window's LRU page and its index entry.
    fn evict_from_window(&mut self) -> bool {
        match self.window.pop_lru(&mut self.pages) {
            Some(page) => {
                self.index.remove(&page.key);
                #[cfg(feature = "metrics")]
                self.metrics.record_evicted_entry();
                true
            },
            None => false,
        }
    }

    /// Drops the main cache's victim page and its index entry.
    fn evict_from_main(&mut self) -> bool {
        match self.main.pop_victim(&mut self.pages) {
            Some(page) => {
                self.index.remove(&page.key);
                #[cfg(feature = "metrics")]
                self.metrics.record_evicted_entry();
                true
            },
            None => false,
        }
    }

    /// Validates the index/queue bijection and capacity bounds.
    ///
    /// Checks that:
    /// - every queue is a well-formed doubly linked list with matching
    ///   segment tags and length counters
    /// - the index maps exactly the pages reachable from the three queues
    /// - the window and the cache total respect their capacities
    /// - the page store's own bookkeeping holds
    ///
    /// Only available when debug assertions are enabled.
    #[cfg(any(test, debug_assertions))]
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut reachable = 0usize;
        for queue in [&self.window, &self.main.eden, &self.main.probationary] {
            let mut count = 0usize;
            let mut prev: Option<PageId> = None;
            let mut current = queue.head;
            while let Some(id) = current {
                let Some(page) = self.pages.get(id) else {
                    return Err(InvariantError::new("queue links a freed page"));
                };
                let Some((prev_link, next_link)) = self.pages.links(id) else {
                    return Err(InvariantError::new("queue links a freed page"));
                };
                if page.segment != queue.segment {
                    return Err(InvariantError::new("segment tag out of sync"));
                }
                if prev_link != prev {
                    return Err(InvariantError::new("broken back-link"));
                }
                if self.index.get(&page.key) != Some(&id) {
                    return Err(InvariantError::new(
                        "index does not map the page's key to its node",
                    ));
                }
                prev = current;
                current = next_link;
                count += 1;
                if count > self.pages.len() {
                    return Err(InvariantError::new("cycle in queue"));
                }
            }
            if queue.tail != prev {
                return Err(InvariantError::new("tail out of sync"));
            }
            if queue.len != count {
                return Err(InvariantError::new("length counter out of sync"));
            }
            reachable += count;
        }

        if reachable != self.index.len() {
            return Err(InvariantError::new("index and queues disagree"));
        }
        if reachable != self.pages.len() {
            return Err(InvariantError::new("store holds orphaned pages"));
        }
        if self.window.len() > self.window.capacity() {
            return Err(InvariantError::new("window exceeds its capacity"));
        }
        if self.len() > self.capacity() {
            return Err(InvariantError::new("cache exceeds its capacity"));
        }
        self.pages.check_invariants()
    }

    /// Debug-build enforcement of [`check_invariants`](Self::check_invariants)
    /// after every structural mutation.
    #[cfg(debug_assertions)]
    fn debug_check(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("{err}");
        }
    }
}

impl<K, V> std::fmt::Debug for WTinyLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WTinyLfuCache")
            .field("capacity", &self.capacity())
            .field("window_capacity", &self.window.capacity())
            .field("main_capacity", &self.main.capacity())
            .field("len", &self.len())
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish_non_exhaustive()
    }
}

impl<K, V> ReadOnlyCache<K, Arc<V>> for WTinyLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    #[inline]
    fn contains(&self, key: &K) -> bool {
        WTinyLfuCache::contains(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        WTinyLfuCache::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        WTinyLfuCache::capacity(self)
    }
}

/// Implementation of the [`CoreCache`] trait.
///
/// Allows the cache to be used through the unified cache interface. Values
/// travel as `Arc<V>` at this boundary.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use wtinylfu::traits::CoreCache;
/// use wtinylfu::policy::wtinylfu::WTinyLfuCache;
///
/// let mut cache: WTinyLfuCache<&str, i32> = WTinyLfuCache::new(100);
///
/// assert_eq!(CoreCache::insert(&mut cache, "key", Arc::new(1)), None);
/// let old = CoreCache::insert(&mut cache, "key", Arc::new(2));
/// assert_eq!(old.as_deref(), Some(&1));
/// assert_eq!(CoreCache::get(&mut cache, &"key").map(|v| **v), Some(2));
/// ```
impl<K, V> CoreCache<K, Arc<V>> for WTinyLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: Arc<V>) -> Option<Arc<V>> {
        self.insert_shared(key, value)
    }

    fn get(&mut self, key: &K) -> Option<&Arc<V>> {
        let id = self.access(key)?;
        self.pages.get(id).map(|page| &page.data)
    }

    fn contains(&self, key: &K) -> bool {
        WTinyLfuCache::contains(self, key)
    }

    fn len(&self) -> usize {
        WTinyLfuCache::len(self)
    }

    fn capacity(&self) -> usize {
        WTinyLfuCache::capacity(self)
    }

    fn clear(&mut self) {
        WTinyLfuCache::clear(self);
    }
}

impl<K, V> MutableCache<K, Arc<V>> for WTinyLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        WTinyLfuCache::remove(self, key)
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<WTinyLfuMetricsSnapshot> for WTinyLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn snapshot(&self) -> WTinyLfuMetricsSnapshot {
        let mut snapshot = self.metrics.snapshot();
        snapshot.cache_len = self.len();
        snapshot.window_len = self.window.len();
        snapshot.probationary_len = self.main.probationary.len();
        snapshot.eden_len = self.main.eden.len();
        snapshot.capacity = self.capacity();
        snapshot
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsReset for WTinyLfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn reset_metrics(&mut self) {
        self.metrics = WTinyLfuMetrics::default();
    }
}
