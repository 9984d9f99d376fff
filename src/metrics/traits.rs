//! # Metrics Trait Hierarchy
//!
//! Separates *recording*, *snapshotting*, and *resetting* responsibilities
//! into small, composable traits so monitoring and bench/test consumers do
//! not couple to the policy internals.
//!
//! ## Architecture
//!
//! ```text
//!        ┌─────────────────────────────┐
//!        │     CoreMetricsRecorder     │
//!        │  get_hit/get_miss/insert    │
//!        │  evict/clear                │
//!        └──────────────┬──────────────┘
//!                       │ extends
//!                       ▼
//!        ┌─────────────────────────────┐
//!        │   WTinyLfuMetricsRecorder   │
//!        │  promotions / demotions     │
//!        │  admission win / loss       │
//!        └─────────────────────────────┘
//!
//!   Consumption (decoupled from recording):
//!   ┌──────────────────────────────┐   ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │   │ MetricsReset                 │
//!   │ (bench/test)                 │   │ (between bench iterations)   │
//!   └──────────────────────────────┘   └──────────────────────────────┘
//! ```

/// Common counters for any cache policy.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evict_call(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_clear(&mut self);
}

/// Signals specific to the W-TinyLFU policy: page movement between the
/// window, probationary and eden queues, and admission duel outcomes.
pub trait WTinyLfuMetricsRecorder: CoreMetricsRecorder {
    /// Window victim moved into probationary while the cache was filling.
    fn record_window_to_probationary_demotion(&mut self);
    /// A probationary hit promoted its page to eden.
    fn record_probationary_to_eden_promotion(&mut self);
    /// A promotion overflowed eden and pushed its LRU back to probationary.
    fn record_eden_to_probationary_demotion(&mut self);
    /// The window victim won the admission duel and displaced the main victim.
    fn record_admission_win(&mut self);
    /// The window victim lost (or tied) the admission duel and was dropped.
    fn record_admission_loss(&mut self);
}

/// Snapshot provider for bench/testing.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&mut self);
}
