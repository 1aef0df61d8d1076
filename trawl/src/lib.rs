pub mod handlers;
pub mod report;

// Re-export commonly used helpers for convenience
pub use handlers::{expand_path, load_urls_from_file, load_urls_from_source, parse_url_line};
pub use report::{extract_url_path, generate_crawl_report, write_jsonl};
