//! Standard 1-bit Bloom filter with double hashing.
//!
//! A compact probabilistic set: `contains` may report a key that was never
//! recorded (false positive, bounded by the configured error rate), but a
//! negative answer is definite. Ships as a standalone primitive for
//! doorkeeper experiments in front of the frequency sketch; the eviction
//! policy itself does not consult it.
//!
//! ## Sizing
//!
//! ```text
//!   bits       m = ceil(-n · ln(p) / (ln 2)²)
//!   hashes     k = round((m / n) · ln 2)
//! ```
//!
//! where `n` is the expected key count and `p` the target false-positive
//! rate. The `k` probe positions are derived from two base hashes with
//! double hashing: `(h1 + i·h2) mod m`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::ds::hash::mix32;
use crate::error::ConfigError;

const WORD_BITS: usize = 64;

/// Bloom filter over keys of type `K`.
///
/// # Example
///
/// ```
/// use wtinylfu::ds::bloom::BloomFilter;
///
/// let mut filter: BloomFilter<u64> = BloomFilter::new(1000);
///
/// filter.record_access(&7);
/// assert!(filter.contains(&7));
///
/// filter.clear();
/// assert!(!filter.contains(&7));
/// ```
#[derive(Debug)]
pub struct BloomFilter<K: ?Sized> {
    words: Vec<u64>,
    num_bits: usize,
    num_hashes: u32,
    _key: PhantomData<fn(&K)>,
}

impl<K: Hash + ?Sized> BloomFilter<K> {
    /// Creates a filter sized for `capacity` keys at a 1% false-positive
    /// rate.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Use
    /// [`try_with_error_rate`](Self::try_with_error_rate) to handle invalid
    /// parameters instead.
    pub fn new(capacity: usize) -> Self {
        match Self::try_with_error_rate(capacity, 0.01) {
            Ok(filter) => filter,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a filter sized for `capacity` keys at the given
    /// false-positive rate.
    ///
    /// Returns a [`ConfigError`] if `capacity` is zero or `error_rate` is
    /// outside `(0, 1)`.
    ///
    /// # Example
    ///
    /// ```
    /// use wtinylfu::ds::bloom::BloomFilter;
    ///
    /// assert!(BloomFilter::<u64>::try_with_error_rate(100, 0.01).is_ok());
    /// assert!(BloomFilter::<u64>::try_with_error_rate(0, 0.01).is_err());
    /// assert!(BloomFilter::<u64>::try_with_error_rate(100, 1.5).is_err());
    /// ```
    pub fn try_with_error_rate(capacity: usize, error_rate: f64) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new(
                "bloom filter capacity must be greater than zero",
            ));
        }
        if !(error_rate > 0.0 && error_rate < 1.0) {
            return Err(ConfigError::new(
                "bloom filter error rate must be between 0 and 1",
            ));
        }

        let num_bits = best_bitset_size(capacity, error_rate);
        let num_hashes = best_num_hashes(capacity, num_bits);
        Ok(Self {
            words: vec![0; num_bits.div_ceil(WORD_BITS)],
            num_bits,
            num_hashes,
            _key: PhantomData,
        })
    }

    /// Returns `true` if `key` may have been recorded.
    ///
    /// A `false` answer guarantees the key was never recorded since the
    /// last [`clear`](Self::clear).
    pub fn contains(&self, key: &K) -> bool {
        let (hash1, hash2) = self.base_hashes(key);
        (0..self.num_hashes).all(|i| self.bit(double_hash(hash1, hash2, i, self.num_bits)))
    }

    /// Records `key` by setting its probe bits.
    pub fn record_access(&mut self, key: &K) {
        let (hash1, hash2) = self.base_hashes(key);
        for i in 0..self.num_hashes {
            self.set_bit(double_hash(hash1, hash2, i, self.num_bits));
        }
    }

    /// Clears all recorded keys, keeping the configured size.
    pub fn clear(&mut self) {
        for word in &mut self.words {
            *word = 0;
        }
    }

    /// Number of bits in the filter.
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Number of probe positions per key.
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Two independent base hashes: the avalanche mix and the standard
    /// library's hasher.
    fn base_hashes(&self, key: &K) -> (u64, u64) {
        let hash1 = u64::from(mix32(key));
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hash1, hasher.finish())
    }

    fn bit(&self, index: usize) -> bool {
        self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0
    }

    fn set_bit(&mut self, index: usize) {
        self.words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
    }
}

/// `m = ceil(-n · ln(p) / (ln 2)²)`.
fn best_bitset_size(capacity: usize, error_rate: f64) -> usize {
    let m = -(capacity as f64) * error_rate.ln() / std::f64::consts::LN_2.powi(2);
    (m.ceil() as usize).max(1)
}

/// `k = round((m / n) · ln 2)`, floored at one probe.
fn best_num_hashes(capacity: usize, num_bits: usize) -> u32 {
    let k = std::f64::consts::LN_2 * num_bits as f64 / capacity as f64;
    (k.round() as u32).max(1)
}

/// `(h1 + i·h2) mod m` — the classic double-hashing probe sequence.
fn double_hash(hash1: u64, hash2: u64, i: u32, num_bits: usize) -> usize {
    let combined = hash1.wrapping_add(u64::from(i).wrapping_mul(hash2));
    (combined % num_bits as u64) as usize
}
