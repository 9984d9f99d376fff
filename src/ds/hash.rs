//! Hash mixing for the probabilistic structures.
//!
//! The frequency sketch and the bloom filter index their tables with a
//! 32-bit hash. Keys are first hashed with `FxHasher` (the same hasher the
//! key index uses), then the 64-bit result is finalized with Bob Jenkins'
//! one-at-a-time avalanche so that nearby base hashes spread across the
//! whole 32-bit range. Sketch row selection multiplies this value by per-row
//! seeds, so a weakly mixed input would correlate the rows.
//!
//! The mix is deterministic: equal keys always produce equal hashes, and it
//! is never the identity over the base hash bytes.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

/// Produces the mixed 32-bit hash of `value`.
///
/// # Example
///
/// ```
/// use wtinylfu::ds::hash::mix32;
///
/// // Deterministic: same input, same output.
/// assert_eq!(mix32(&42u64), mix32(&42u64));
///
/// // Not the identity over small integers.
/// assert_ne!(mix32(&1u64), 1);
/// ```
#[inline]
pub fn mix32<T: Hash + ?Sized>(value: &T) -> u32 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    one_at_a_time(hasher.finish())
}

/// Jenkins' one-at-a-time hash over the eight bytes of `base`.
#[inline]
fn one_at_a_time(base: u64) -> u32 {
    let mut hash: u32 = 0;
    for byte in base.to_le_bytes() {
        hash = hash.wrapping_add(u32::from(byte));
        hash = hash.wrapping_add(hash << 10);
        hash ^= hash >> 6;
    }
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash = hash.wrapping_add(hash << 15);
    hash
}
