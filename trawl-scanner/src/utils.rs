use regex::Regex;
use std::sync::LazyLock;

static LINK_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([^>]*)>").expect("static regex is valid"));

static REFRESH_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\s*=\s*['"]?([^'"]*)"#).expect("static regex is valid")
});

/// Converts a 1-based index to a 0-based one clamped into the slice bounds.
/// Always 0 for an empty slice.
pub fn transform_index<T>(arr: &[T], index: i64) -> usize {
    if arr.is_empty() {
        return 0;
    }
    let max = (arr.len() - 1) as i64;
    index.saturating_sub(1).clamp(0, max) as usize
}

/// Targets of every `<...>` entry in a `Link` header value.
pub fn parse_link_header(value: &str) -> Vec<String> {
    LINK_TARGET
        .captures_iter(value)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|target| !target.is_empty())
        .collect()
}

/// Target of a `Refresh` header or `<meta http-equiv="refresh">` content value.
pub fn parse_refresh_header(value: &str) -> Option<String> {
    REFRESH_TARGET
        .captures(value)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|target| !target.is_empty())
}
