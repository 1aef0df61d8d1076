use super::{Headers, Response};
use crate::error::{Result, ScanError};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;

/// A navigation edge: one request the frontier may schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(with = "method_name")]
    pub method: Method,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Headers::is_empty")]
    pub headers: Headers,
    pub depth: usize,
    pub root_hostname: String,
    /// Free-form provenance, usually the page the link was found on.
    pub source: String,
    pub tag: String,
    pub attribute: String,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            headers: Headers::new(),
            depth: 0,
            root_hostname: String::new(),
            source: String::new(),
            tag: String::new(),
            attribute: String::new(),
        }
    }

    /// Seed request for a crawl tree. Depth 0, root hostname taken from the URL.
    pub fn root(url: &str) -> Result<Self> {
        let parsed =
            Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| ScanError::InvalidUrl(format!("{}: missing host", url)))?;

        let mut request = Self::new(Method::GET, parsed.as_str());
        request.root_hostname = host.to_string();
        Ok(request)
    }

    /// Builds the GET request for a link discovered on `parent`.
    ///
    /// The candidate is resolved with [`Response::absolute_url`], so the resulting URL
    /// may be empty when the link has no navigable target; check
    /// [`Request::is_navigable`] before scheduling it.
    pub fn from_response(
        candidate: &str,
        source: &str,
        tag: &str,
        attribute: &str,
        parent: &Response,
    ) -> Self {
        let mut request = Self::new(Method::GET, parent.absolute_url(candidate));
        request.depth = parent.depth + 1;
        request.root_hostname = parent.root_hostname.clone();
        request.source = source.to_string();
        request.tag = tag.to_string();
        request.attribute = attribute.to_string();
        request
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_navigable(&self) -> bool {
        !self.url.is_empty()
    }

    /// Identity string used for dedup and logging.
    ///
    /// GET and HEAD are identified by the URL alone, POST by the URL and body joined
    /// with `:`. Every other method yields an empty string.
    pub fn request_url(&self) -> String {
        match self.method {
            Method::GET | Method::HEAD => self.url.clone(),
            Method::POST => format!("{}:{}", self.url, self.body.as_deref().unwrap_or_default()),
            _ => String::new(),
        }
    }
}

mod method_name {
    use reqwest::Method;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(method.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Method, D::Error> {
        let name = String::deserialize(deserializer)?;
        Method::from_bytes(name.as_bytes()).map_err(D::Error::custom)
    }
}
