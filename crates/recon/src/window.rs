use serde::Serialize;
use tracing::debug;

use crate::model::Sale;

/// Default look-back for a run: two hours.
pub const DEFAULT_LOOKBACK_SECS: i64 = 2 * 60 * 60;

/// Default trailing buffer: five minutes, to let slower vendors catch up
/// on indexing before their data is compared.
pub const DEFAULT_LATENCY_BUFFER_SECS: i64 = 5 * 60;

/// Half-open interval `[from, to)` in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub from: i64,
    pub to: i64,
}

impl TimeWindow {
    /// `[now - lookback, now - buffer)`.
    pub fn ending_at(now: i64, lookback_secs: i64, buffer_secs: i64) -> Self {
        Self {
            from: now - lookback_secs,
            to: now - buffer_secs,
        }
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.from <= timestamp && timestamp < self.to
    }
}

/// Restrict Reservoir sales to the window, then keep the most recent
/// `reference_len` of them.
///
/// The Reservoir feed has no time-bounded query, so its window is matched
/// to the reference source by count. Records without a timestamp never
/// fall inside the window.
pub fn clip_to_reference(sales: Vec<Sale>, window: &TimeWindow, reference_len: usize) -> Vec<Sale> {
    let fetched = sales.len();
    let mut in_window: Vec<Sale> = sales
        .into_iter()
        .filter(|s| s.timestamp.is_some_and(|ts| window.contains(ts)))
        .collect();

    // Oldest first, so the tail is the most recent slice.
    in_window.sort_by_key(|s| s.timestamp);

    let keep_from = in_window.len().saturating_sub(reference_len);
    let clipped = in_window.split_off(keep_from);

    debug!(
        fetched,
        in_window = in_window.len() + clipped.len(),
        kept = clipped.len(),
        "clipped Reservoir sales to reference window"
    );
    clipped
}
