#[derive(Debug, Default, Clone, Copy)]
pub struct WTinyLfuMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,

    pub evict_calls: u64,
    pub evicted_entries: u64,

    pub window_to_probationary_demotions: u64,
    pub probationary_to_eden_promotions: u64,
    pub eden_to_probationary_demotions: u64,
    pub admission_wins: u64,
    pub admission_losses: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub window_len: usize,
    pub probationary_len: usize,
    pub eden_len: usize,
    pub capacity: usize,
}
