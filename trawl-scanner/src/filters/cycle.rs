use super::{FilterOptions, MAX_CHROME_URL_LENGTH, MAX_SEQUENCE_COUNT, SEQUENCE_WINDOW};
use std::collections::HashMap;

/// Stateless classifier for degenerate URLs.
///
/// A URL is a cycle when it is longer than `max_url_length`, or when any
/// `sequence_window`-byte window occurs `max_sequence_count` times or more.
/// Windows made of a single repeated byte are not counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleDetector {
    pub max_url_length: usize,
    pub max_sequence_count: usize,
    pub sequence_window: usize,
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self {
            max_url_length: MAX_CHROME_URL_LENGTH,
            max_sequence_count: MAX_SEQUENCE_COUNT,
            sequence_window: SEQUENCE_WINDOW,
        }
    }
}

impl From<&FilterOptions> for CycleDetector {
    fn from(options: &FilterOptions) -> Self {
        Self {
            max_url_length: options.max_url_length,
            max_sequence_count: options.max_sequence_count,
            sequence_window: options.sequence_window,
        }
    }
}

impl CycleDetector {
    pub fn is_cycle(&self, url: &str) -> bool {
        url.len() > self.max_url_length || self.has_repeating_sequence(url.as_bytes())
    }

    fn has_repeating_sequence(&self, url: &[u8]) -> bool {
        // a zero threshold or window would flag everything
        if self.sequence_window == 0 || self.max_sequence_count == 0 {
            return false;
        }

        let mut seen: HashMap<&[u8], usize> = HashMap::new();
        for window in url.windows(self.sequence_window) {
            // runs of one byte (zero padding, `====`) are data, not generated structure
            if window.iter().all(|b| *b == window[0]) {
                continue;
            }
            let count = seen.entry(window).or_insert(0);
            *count += 1;
            if *count >= self.max_sequence_count {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_url_is_cycle() {
        let detector = CycleDetector::default();
        let url = "a".repeat(MAX_CHROME_URL_LENGTH + 1);
        assert!(
            detector.is_cycle(&url),
            "expected overly long url to be considered a cycle"
        );
    }

    #[test]
    fn test_length_boundary() {
        let detector = CycleDetector {
            max_url_length: 40,
            ..CycleDetector::default()
        };
        let at_limit = "https://example.com/abcdefghijklmnopqrst";
        assert_eq!(at_limit.len(), 40);
        assert!(!detector.is_cycle(at_limit));
        assert!(detector.is_cycle(&format!("{}u", at_limit)));

        let default = CycleDetector::default();
        assert!(!default.is_cycle(&"a".repeat(MAX_CHROME_URL_LENGTH)));
        assert!(default.is_cycle(&"a".repeat(MAX_CHROME_URL_LENGTH + 1)));
    }

    #[test]
    fn test_single_character_runs_are_not_cycles() {
        let detector = CycleDetector::default();
        assert!(!detector.is_cycle("https://example.com/item?id=0000000000000000"));
        assert!(!detector.is_cycle(&format!(
            "https://example.com/token/abc{}",
            "=".repeat(64)
        )));
        assert!(detector.is_cycle(&format!("https://example.com{}", "/a".repeat(40))));
    }

    #[test]
    fn test_length_limit_is_configurable() {
        let detector = CycleDetector {
            max_url_length: 32,
            ..CycleDetector::default()
        };
        assert!(!detector.is_cycle("https://example.com/abc"));
        assert!(detector.is_cycle("https://example.com/abcdefghijklmnopq"));
    }

    #[test]
    fn test_repeating_sequence_is_cycle() {
        let detector = CycleDetector::default();
        let mut url = String::new();
        for i in 0..MAX_SEQUENCE_COUNT {
            url.push_str("abcdefghijkl");
            url.push_str(&format!("{:02}", i));
        }
        assert!(
            detector.is_cycle(&url),
            "expected highly repetitive sequence to be considered a cycle"
        );
    }

    #[test]
    fn test_repeated_path_segment_is_cycle() {
        let detector = CycleDetector::default();
        let url = format!("https://example.com{}", "/calendar/2024".repeat(6));
        assert!(detector.is_cycle(&url));
    }

    #[test]
    fn test_below_threshold_is_not_cycle() {
        let detector = CycleDetector::default();
        let url = format!(
            "https://example.com{}",
            "/calendar/2024".repeat(MAX_SEQUENCE_COUNT - 1)
        );
        assert!(!detector.is_cycle(&url));
    }

    #[test]
    fn test_ordinary_url_is_not_cycle() {
        let detector = CycleDetector::default();
        assert!(
            !detector.is_cycle("https://example.com"),
            "expected typical url to not be a cycle"
        );
        assert!(!detector.is_cycle(
            "https://example.com/blog/2024/05/an-article-about-crawlers?utm_source=feed"
        ));
    }

    #[test]
    fn test_zero_thresholds_disable_repetition_check() {
        let detector = CycleDetector {
            max_sequence_count: 0,
            ..CycleDetector::default()
        };
        assert!(!detector.is_cycle(&"/a".repeat(100)));
    }
}
