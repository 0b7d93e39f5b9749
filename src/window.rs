//! Bounded temporal sample window shared by position, pose, and motion history.

use std::collections::VecDeque;

/// A value paired with the monotonic millisecond timestamp it was observed at.
#[derive(Debug, Clone)]
pub struct Timestamped<T> {
    /// The stored sample.
    pub value: T,
    /// Monotonic timestamp in milliseconds.
    pub timestamp_ms: i64,
}

/// Append-only-then-evict buffer of timestamped samples.
///
/// Eviction is driven by two per-instance constants: an optional time horizon
/// (entries older than `horizon_ms` relative to the newest push are dropped)
/// and a hard capacity. Whichever evicts first wins. The front is always the
/// oldest surviving sample and insertion order is preserved; each push does
/// amortized O(1) work.
///
/// Timestamps are not trusted to be monotonic: a push with a timestamp older
/// than the newest entry is clamped to the newest entry's timestamp, so clock
/// skew can never make the window grow without bound or evict the wrong end.
#[derive(Debug, Clone)]
pub struct TemporalWindow<T> {
    samples: VecDeque<Timestamped<T>>,
    horizon_ms: Option<i64>,
    capacity: usize,
}

impl<T> TemporalWindow<T> {
    /// Create a window bounded by entry count only.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.min(1024)),
            horizon_ms: None,
            capacity,
        }
    }

    /// Create a window bounded by both a time horizon and an entry count.
    pub fn with_horizon(horizon_ms: i64, capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.min(1024)),
            horizon_ms: Some(horizon_ms.max(0)),
            capacity,
        }
    }

    /// Append a sample, then evict expired and overflowing entries from the
    /// front.
    pub fn push(&mut self, value: T, now_ms: i64) {
        // Clamp non-monotonic timestamps to the newest entry.
        let now_ms = match self.samples.back() {
            Some(back) => now_ms.max(back.timestamp_ms),
            None => now_ms,
        };

        self.samples.push_back(Timestamped {
            value,
            timestamp_ms: now_ms,
        });

        if let Some(horizon) = self.horizon_ms {
            while let Some(front) = self.samples.front() {
                if now_ms - front.timestamp_ms > horizon {
                    self.samples.pop_front();
                } else {
                    break;
                }
            }
        }

        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Number of surviving samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Oldest surviving sample.
    pub fn front(&self) -> Option<&Timestamped<T>> {
        self.samples.front()
    }

    /// Newest sample.
    pub fn back(&self) -> Option<&Timestamped<T>> {
        self.samples.back()
    }

    /// Iterate samples from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Timestamped<T>> {
        self.samples.iter()
    }

    /// Drop all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_eviction() {
        let mut window = TemporalWindow::new(3);
        for i in 0..10 {
            window.push(i, i as i64 * 10);
        }

        assert_eq!(window.len(), 3);
        assert_eq!(window.front().unwrap().value, 7);
        assert_eq!(window.back().unwrap().value, 9);
    }

    #[test]
    fn test_horizon_eviction() {
        let mut window = TemporalWindow::with_horizon(1000, 30);
        window.push(1, 0);
        window.push(2, 500);
        window.push(3, 1400);

        // Entry at t=0 is 1400 ms old and falls outside the horizon; the
        // entry at t=500 is only 900 ms old and survives.
        assert_eq!(window.len(), 2);
        assert_eq!(window.front().unwrap().value, 2);

        // Pushing far enough ahead evicts the t=500 entry as well.
        window.push(4, 1600);
        assert_eq!(window.len(), 2);
        assert_eq!(window.front().unwrap().value, 3);
    }

    #[test]
    fn test_horizon_boundary_is_inclusive() {
        let mut window = TemporalWindow::with_horizon(1000, 30);
        window.push(1, 0);
        window.push(2, 1000);

        // Exactly at the horizon is still retained.
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut window = TemporalWindow::new(5);
        for i in 0..5 {
            window.push(i, i as i64);
        }

        let values: Vec<i32> = window.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_non_monotonic_timestamp_clamped() {
        let mut window = TemporalWindow::with_horizon(1000, 30);
        window.push(1, 5000);
        // Clock skew: caller hands us an older timestamp.
        window.push(2, 100);

        assert_eq!(window.len(), 2);
        assert_eq!(window.back().unwrap().timestamp_ms, 5000);

        // A huge forward jump evicts everything older.
        window.push(3, 100_000);
        assert_eq!(window.len(), 1);
        assert_eq!(window.front().unwrap().value, 3);
    }

    #[test]
    fn test_clear() {
        let mut window = TemporalWindow::new(5);
        window.push(1, 0);
        window.clear();
        assert!(window.is_empty());
        assert!(window.front().is_none());
    }
}
