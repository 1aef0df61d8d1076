use crate::error::Result;
use crate::navigation::{Headers, Request};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub timestamp: DateTime<Utc>,
    pub request: Request,
    pub status_code: u16,
    #[serde(default)]
    pub headers: Headers,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub response_time: Duration,
    pub links_found: Vec<String>,
    pub forms_found: usize,
    pub scripts_found: usize,
    pub error: Option<String>,
}

impl CrawlResult {
    pub fn new(request: Request) -> Self {
        Self {
            timestamp: Utc::now(),
            request,
            status_code: 0,
            headers: Headers::new(),
            content_type: None,
            content_length: None,
            response_time: Duration::from_secs(0),
            links_found: Vec::new(),
            forms_found: 0,
            scripts_found: 0,
            error: None,
        }
    }

    pub fn with_error(request: Request, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(request)
        }
    }

    pub fn url(&self) -> &str {
        &self.request.url
    }

    /// One JSON object, no trailing newline.
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    #[test]
    fn test_json_line_lowercases_headers() {
        let mut result = CrawlResult::new(Request::new(Method::GET, "https://example.com/"));
        result.status_code = 200;
        result.headers.insert("Content-Type", "text/html");

        let line = result.to_json_line().unwrap();
        assert!(!line.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["request"]["url"], "https://example.com/");
        assert_eq!(value["request"]["method"], "GET");
        assert_eq!(value["headers"]["content-type"], "text/html");
        assert_eq!(value["status_code"], 200);
    }

    #[test]
    fn test_with_error() {
        let result = CrawlResult::with_error(
            Request::new(Method::GET, "https://example.com/down"),
            "connection refused".to_string(),
        );
        assert_eq!(result.url(), "https://example.com/down");
        assert_eq!(result.error.as_deref(), Some("connection refused"));
        assert_eq!(result.status_code, 0);
    }
}
