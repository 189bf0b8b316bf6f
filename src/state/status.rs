use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for one crawl run
///
/// Counters only ever go up. They are updated from concurrent workers, so each
/// is an atomic; readers take a `StatusSnapshot` for a consistent-enough view.
#[derive(Debug, Default)]
pub struct CrawlStatus {
    total_attempted: AtomicU64,
    new_elements_found: AtomicU64,
    new_discoveries: AtomicU64,
    new_recipes_found: AtomicU64,
    already_known: AtomicU64,
    unavailable: AtomicU64,
}

impl CrawlStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// The oracle answered for a pair (with an element or with nothing)
    pub fn record_attempt(&self) {
        self.total_attempted.fetch_add(1, Ordering::Relaxed);
    }

    /// The oracle flagged the result as globally new
    pub fn record_discovery(&self) {
        self.new_discoveries.fetch_add(1, Ordering::Relaxed);
    }

    /// An element was appended to the graph
    pub fn record_new_element(&self) {
        self.new_elements_found.fetch_add(1, Ordering::Relaxed);
    }

    /// A recipe edge was inserted
    pub fn record_new_recipe(&self) {
        self.new_recipes_found.fetch_add(1, Ordering::Relaxed);
    }

    /// A pair was skipped because its recipe is already known
    pub fn record_already_known(&self) {
        self.already_known.fetch_add(1, Ordering::Relaxed);
    }

    /// A pair was skipped because the oracle could not be reached
    pub fn record_unavailable(&self) {
        self.unavailable.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            total_attempted: self.total_attempted.load(Ordering::Relaxed),
            new_elements_found: self.new_elements_found.load(Ordering::Relaxed),
            new_discoveries: self.new_discoveries.load(Ordering::Relaxed),
            new_recipes_found: self.new_recipes_found.load(Ordering::Relaxed),
            already_known: self.already_known.load(Ordering::Relaxed),
            unavailable: self.unavailable.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the crawl counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub total_attempted: u64,
    pub new_elements_found: u64,
    pub new_discoveries: u64,
    pub new_recipes_found: u64,
    pub already_known: u64,
    pub unavailable: u64,
}

impl StatusSnapshot {
    /// Pairs handled in any way: answered, skipped as known, or given up on
    pub fn processed(&self) -> u64 {
        self.total_attempted + self.already_known + self.unavailable
    }
}

impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "F: {} D: {} R: {} T: {}",
            self.new_elements_found, self.new_discoveries, self.new_recipes_found, self.total_attempted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_new_status_is_zero() {
        assert_eq!(CrawlStatus::new().snapshot(), StatusSnapshot::default());
    }

    #[test]
    fn test_counters_are_independent() {
        let status = CrawlStatus::new();
        status.record_attempt();
        status.record_attempt();
        status.record_discovery();
        status.record_new_element();
        status.record_new_recipe();
        status.record_already_known();
        status.record_unavailable();

        let snap = status.snapshot();
        assert_eq!(snap.total_attempted, 2);
        assert_eq!(snap.new_discoveries, 1);
        assert_eq!(snap.new_elements_found, 1);
        assert_eq!(snap.new_recipes_found, 1);
        assert_eq!(snap.already_known, 1);
        assert_eq!(snap.unavailable, 1);
        assert_eq!(snap.processed(), 4);
    }

    #[test]
    fn test_display_format() {
        let snap = StatusSnapshot {
            total_attempted: 9,
            new_elements_found: 1,
            new_discoveries: 2,
            new_recipes_found: 3,
            ..StatusSnapshot::default()
        };
        assert_eq!(snap.to_string(), "F: 1 D: 2 R: 3 T: 9");
    }

    #[test]
    fn test_concurrent_updates() {
        let status = Arc::new(CrawlStatus::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let status = status.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        status.record_attempt();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(status.snapshot().total_attempted, 8000);
    }
}
