pub use crate::ds::{BloomFilter, FrequencySketch, PageId, PageStore};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::policy::wtinylfu::WTinyLfuCache;
pub use crate::traits::{CoreCache, MutableCache, ReadOnlyCache};

#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::WTinyLfuMetricsSnapshot;
