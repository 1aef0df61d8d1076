//! Deduplication and cycle filters guarding admission into the frontier.

mod cycle;
mod membership;
mod simple;

pub use cycle::CycleDetector;
pub use membership::MembershipStore;
pub use simple::SimpleFilter;

/// Chrome refuses to navigate to URLs longer than 2MB.
pub const MAX_CHROME_URL_LENGTH: usize = 2_097_152;
/// Occurrences of one window after which a URL is treated as a generated loop.
pub const MAX_SEQUENCE_COUNT: usize = 5;
/// Width in bytes of the windows compared by the repetition check.
pub const SEQUENCE_WINDOW: usize = 12;

/// Admission checks shared by every crawl worker.
///
/// `unique_*` are atomic test-and-set operations: for any key, exactly one caller
/// across all workers observes `true`.
pub trait Filter: Send + Sync {
    /// True the first time `url` is seen.
    fn unique_url(&self, url: &str) -> bool;
    /// True the first time a payload with this digest is seen.
    fn unique_content(&self, payload: &[u8]) -> bool;
    /// True if the URL looks like runaway link generation.
    fn is_cycle(&self, url: &str) -> bool;
    /// Releases the stores. Later `unique_*` calls return `false`.
    fn close(&self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    pub max_url_length: usize,
    pub max_sequence_count: usize,
    pub sequence_window: usize,
    /// Number of keys each store is sized for.
    pub expected_items: usize,
    /// Target false-positive rate at `expected_items`.
    pub false_positive_rate: f64,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            max_url_length: MAX_CHROME_URL_LENGTH,
            max_sequence_count: MAX_SEQUENCE_COUNT,
            sequence_window: SEQUENCE_WINDOW,
            expected_items: 1_000_000,
            false_positive_rate: 0.0001,
        }
    }
}

impl FilterOptions {
    pub fn with_max_url_length(mut self, max_url_length: usize) -> Self {
        self.max_url_length = max_url_length;
        self
    }

    pub fn with_max_sequence_count(mut self, max_sequence_count: usize) -> Self {
        self.max_sequence_count = max_sequence_count;
        self
    }

    pub fn with_sequence_window(mut self, sequence_window: usize) -> Self {
        self.sequence_window = sequence_window;
        self
    }

    pub fn with_capacity(mut self, expected_items: usize, false_positive_rate: f64) -> Self {
        self.expected_items = expected_items;
        self.false_positive_rate = false_positive_rate;
        self
    }
}
