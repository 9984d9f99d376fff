use crate::metrics::snapshot::WTinyLfuMetricsSnapshot;
use crate::metrics::traits::{CoreMetricsRecorder, WTinyLfuMetricsRecorder};

#[derive(Debug, Default)]
pub struct WTinyLfuMetrics {
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
}

impl WTinyLfuMetrics {
    /// Copies the counters into a snapshot. Gauges (lengths, capacity) are
    /// the owning cache's to fill in.
    pub fn snapshot(&self) -> WTinyLfuMetricsSnapshot {
        WTinyLfuMetricsSnapshot {
            get_calls: self.get_calls,
            get_hits: self.get_hits,
            get_misses: self.get_misses,
            insert_calls: self.insert_calls,
            insert_updates: self.insert_updates,
            insert_new: self.insert_new,
            evict_calls: self.evict_calls,
            evicted_entries: self.evicted_entries,
            window_to_probationary_demotions: self.window_to_probationary_demotions,
            probationary_to_eden_promotions: self.probationary_to_eden_promotions,
            eden_to_probationary_demotions: self.eden_to_probationary_demotions,
            admission_wins: self.admission_wins,
            admission_losses: self.admission_losses,
            cache_len: 0,
            window_len: 0,
            probationary_len: 0,
            eden_len: 0,
            capacity: 0,
        }
    }
}

impl CoreMetricsRecorder for WTinyLfuMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }

    fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }

    fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    fn record_evict_call(&mut self) {
        self.evict_calls += 1;
    }

    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }

    fn record_clear(&mut self) {
        // No explicit counter today; kept for trait completeness.
    }
}

impl WTinyLfuMetricsRecorder for WTinyLfuMetrics {
    fn record_window_to_probationary_demotion(&mut self) {
        self.window_to_probationary_demotions += 1;
    }

    fn record_probationary_to_eden_promotion(&mut self) {
        self.probationary_to_eden_promotions += 1;
    }

    fn record_eden_to_probationary_demotion(&mut self) {
        self.eden_to_probationary_demotions += 1;
    }

    fn record_admission_win(&mut self) {
        self.admission_wins += 1;
    }

    fn record_admission_loss(&mut self) {
        self.admission_losses += 1;
    }
}
