use super::Headers;
use url::Url;

/// A navigation node: the page a request reached.
#[derive(Debug, Clone)]
pub struct Response {
    /// Final request URL after redirects; base for resolving links on the page.
    pub url: Url,
    pub status_code: u16,
    pub depth: usize,
    pub root_hostname: String,
    pub headers: Headers,
    pub body: String,
}

impl Response {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            status_code: 0,
            depth: 0,
            root_hostname: String::new(),
            headers: Headers::new(),
            body: String::new(),
        }
    }

    /// Resolves a link found on this page into an absolute URL without fragment.
    ///
    /// Returns an empty string for same-page anchors and for candidates that do not
    /// parse, including ones carrying malformed percent escapes.
    pub fn absolute_url(&self, candidate: &str) -> String {
        let candidate = candidate.trim();
        if candidate.split('#').next().is_none_or(str::is_empty) {
            return String::new();
        }
        if has_invalid_escape(candidate) {
            return String::new();
        }

        match self.url.join(candidate) {
            Ok(mut resolved) => {
                resolved.set_fragment(None);
                resolved.into()
            }
            Err(_) => String::new(),
        }
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status_code)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type")
    }

    pub fn is_html(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"))
    }
}

/// `%` must introduce exactly two hex digits.
fn has_invalid_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !(bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    })
}
