use super::{CycleDetector, Filter, FilterOptions, MembershipStore};
use crate::error::Result;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_128;

/// Bloom-backed filter: one store for URLs, one for content digests.
pub struct SimpleFilter {
    urls: MembershipStore,
    contents: MembershipStore,
    cycles: CycleDetector,
}

impl SimpleFilter {
    pub fn new() -> Result<Self> {
        Self::with_options(&FilterOptions::default())
    }

    pub fn with_options(options: &FilterOptions) -> Result<Self> {
        let urls = MembershipStore::with_capacity(options.expected_items, options.false_positive_rate)?;
        let contents =
            MembershipStore::with_capacity(options.expected_items, options.false_positive_rate)?;
        debug!(
            "Filter ready: {} bits x {} hashes per store",
            urls.num_bits(),
            urls.num_hashes()
        );

        Ok(Self {
            urls,
            contents,
            cycles: CycleDetector::from(options),
        })
    }

    pub fn cycle_detector(&self) -> &CycleDetector {
        &self.cycles
    }
}

impl Filter for SimpleFilter {
    fn unique_url(&self, url: &str) -> bool {
        self.urls.insert(url.as_bytes())
    }

    fn unique_content(&self, payload: &[u8]) -> bool {
        let digest = xxh3_128(payload);
        self.contents.insert(&digest.to_le_bytes())
    }

    fn is_cycle(&self, url: &str) -> bool {
        self.cycles.is_cycle(url)
    }

    fn close(&self) {
        self.urls.close();
        self.contents.close();
        debug!("Filter closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use crate::filters::MAX_CHROME_URL_LENGTH;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_unique_url() {
        let filter = SimpleFilter::new().expect("could not create filter");

        assert!(filter.unique_url("https://example.com"));
        assert!(!filter.unique_url("https://example.com"));
        assert!(filter.unique_url("https://example.com/"));

        filter.close();
    }

    #[test]
    fn test_unique_content() {
        let filter = SimpleFilter::new().expect("could not create filter");
        let payload = b"<html>page</html>";

        assert!(filter.unique_content(payload), "expected new payload to be unique");
        assert!(
            !filter.unique_content(payload),
            "expected duplicate payload to be rejected"
        );
        assert!(filter.unique_content(b"<html>other</html>"));

        filter.close();
    }

    #[test]
    fn test_url_and_content_stores_are_independent() {
        let filter = SimpleFilter::new().unwrap();
        assert!(filter.unique_url("same"));
        assert!(filter.unique_content(b"same"));
    }

    #[test]
    fn test_is_cycle_uses_configured_detector() {
        let options = FilterOptions::default()
            .with_max_url_length(64)
            .with_max_sequence_count(3)
            .with_sequence_window(4);
        let filter = SimpleFilter::with_options(&options).unwrap();

        assert!(filter.is_cycle(&"x".repeat(65)));
        assert!(filter.is_cycle("https://e.com/abcd/abcd/abcd"));
        assert!(!filter.is_cycle("https://e.com/abcd/abcd"));

        let default = SimpleFilter::new().unwrap();
        assert!(default.is_cycle(&"a".repeat(MAX_CHROME_URL_LENGTH + 1)));
        assert!(!default.is_cycle("https://example.com"));
    }

    #[test]
    fn test_construction_failure_is_reported() {
        let options = FilterOptions::default().with_capacity(0, 0.01);
        assert!(matches!(
            SimpleFilter::with_options(&options),
            Err(ScanError::FilterInit(_))
        ));
    }

    #[test]
    fn test_closed_filter_stops_admitting() {
        let filter = SimpleFilter::new().unwrap();
        assert!(filter.unique_url("https://example.com/a"));
        filter.close();
        assert!(!filter.unique_url("https://example.com/b"));
        assert!(!filter.unique_content(b"fresh"));
        assert!(!filter.is_cycle("https://example.com"));
    }

    #[test]
    fn test_racing_workers_admit_url_once() {
        let filter: Arc<dyn Filter> = Arc::new(SimpleFilter::new().unwrap());
        let granted = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let filter = filter.clone();
                let granted = granted.clone();
                std::thread::spawn(move || {
                    if filter.unique_url("https://example.com/contended") {
                        granted.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(granted.load(Ordering::SeqCst), 1);
    }
}
