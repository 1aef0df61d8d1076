use crate::error::Result;
use crate::filters::{Filter, FilterOptions, SimpleFilter};
use crate::navigation::{Headers, Request, Response};
use crate::queue::{Frontier, Strategy};
use crate::result::CrawlResult;
use crate::utils::{parse_link_header, parse_refresh_header};
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;
pub type CrossDomainCallback = Arc<dyn Fn(String, String) -> bool + Send + Sync>;
pub type ResultCallback = Arc<dyn Fn(CrawlResult) + Send + Sync>;

/// Elements and attributes that carry navigable links.
static LINK_SELECTORS: LazyLock<Vec<(Selector, &'static str, &'static str)>> =
    LazyLock::new(|| {
        [
            ("a", "href"),
            ("area", "href"),
            ("link", "href"),
            ("script", "src"),
            ("img", "src"),
            ("iframe", "src"),
            ("form", "action"),
        ]
        .into_iter()
        .map(|(tag, attribute)| {
            let selector = Selector::parse(&format!("{}[{}]", tag, attribute))
                .expect("static selector is valid");
            (selector, tag, attribute)
        })
        .collect()
    });

static META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[http-equiv][content]").expect("static selector is valid"));
static FORM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("form").expect("static selector is valid"));
static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script[src]").expect("static selector is valid"));

/// Everything a fetched page contributes back to the crawl.
struct Discovery {
    requests: Vec<Request>,
    forms: usize,
    scripts: usize,
}

pub struct Crawler {
    client: Client,
    results: Arc<Mutex<Vec<CrawlResult>>>,
    max_depth: usize,
    strategy: Strategy,
    filter_options: FilterOptions,
    base_domain: Option<String>,
    progress_callback: Option<ProgressCallback>,
    cross_domain_callback: Option<CrossDomainCallback>,
    result_callback: Option<ResultCallback>,
    auto_follow: bool,
}

impl Crawler {
    pub fn new() -> Self {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        // Redirects are not followed by the client: the target goes through the
        // frontier like any other discovered link.
        let client = Client::builder()
            .user_agent("Trawl/0.1 (https://github.com/trapdoorsec/trawl)")
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_else(|e| {
                warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            results: Arc::new(Mutex::new(Vec::new())),
            max_depth: 3,
            strategy: Strategy::BreadthFirst,
            filter_options: FilterOptions::default(),
            base_domain: None,
            progress_callback: None,
            cross_domain_callback: None,
            result_callback: None,
            auto_follow: false,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_filter_options(mut self, options: FilterOptions) -> Self {
        self.filter_options = options;
        self
    }

    pub fn with_base_domain(mut self, domain: String) -> Self {
        self.base_domain = Some(domain);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_cross_domain_callback(mut self, callback: CrossDomainCallback) -> Self {
        self.cross_domain_callback = Some(callback);
        self
    }

    pub fn with_result_callback(mut self, callback: ResultCallback) -> Self {
        self.result_callback = Some(callback);
        self
    }

    pub fn with_auto_follow(mut self, auto_follow: bool) -> Self {
        self.auto_follow = auto_follow;
        self
    }

    /// Crawls outward from `start_url` and returns the results of this run.
    ///
    /// Every run gets its own filter and frontier, so repeated calls never share
    /// dedup state.
    pub async fn crawl(&self, start_url: &str, workers: usize) -> Result<Vec<CrawlResult>> {
        let workers = workers.max(1);
        info!(
            "Starting {} crawl of {} with {} workers",
            self.strategy, start_url, workers
        );

        let root = Request::root(start_url)?;
        let base_domain = self
            .base_domain
            .clone()
            .unwrap_or_else(|| root.root_hostname.clone());

        let filter: Arc<dyn Filter> = Arc::new(SimpleFilter::with_options(&self.filter_options)?);
        let frontier = Arc::new(Frontier::new(self.strategy)?);
        let in_flight = Arc::new(AtomicUsize::new(0));
        let run_results: Arc<Mutex<Vec<CrawlResult>>> = Arc::new(Mutex::new(Vec::new()));

        filter.unique_url(&root.request_url());
        frontier.push(root);

        let mut worker_handles = Vec::with_capacity(workers);

        for worker_id in 0..workers {
            let client = self.client.clone();
            let base_domain = base_domain.clone();
            let progress_cb = self.progress_callback.clone();
            let cross_domain_cb = self.cross_domain_callback.clone();
            let result_cb = self.result_callback.clone();
            let auto_follow = self.auto_follow;
            let max_depth = self.max_depth;
            let filter = filter.clone();
            let frontier = frontier.clone();
            let in_flight = in_flight.clone();
            let run_results = run_results.clone();

            let handle = tokio::spawn(async move {
                debug!("Worker {} started", worker_id);

                loop {
                    // Claim before popping so an empty frontier with zero in flight
                    // really means no more work can appear.
                    in_flight.fetch_add(1, Ordering::SeqCst);
                    let Some(request) = frontier.pop() else {
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        if in_flight.load(Ordering::SeqCst) == 0 && frontier.is_empty() {
                            break;
                        }
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        continue;
                    };

                    if request.depth > max_depth {
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        continue;
                    }

                    if let Some(ref callback) = progress_cb {
                        callback(worker_id, request.url.clone());
                    }

                    let result = match Self::fetch(&client, &request).await {
                        Ok((response, payload, mut result)) => {
                            let discovery = Self::discover(&response);
                            result.forms_found = discovery.forms;
                            result.scripts_found = discovery.scripts;

                            for discovered in discovery.requests {
                                if !Self::in_scope(
                                    &discovered.url,
                                    &base_domain,
                                    &cross_domain_cb,
                                    auto_follow,
                                ) {
                                    continue;
                                }
                                result.links_found.push(discovered.url.clone());
                                admit(filter.as_ref(), &frontier, discovered, max_depth);
                            }

                            // Redirects and empty bodies carry no content of their own.
                            if response.is_redirect()
                                || payload.is_empty()
                                || filter.unique_content(&payload)
                            {
                                Some(result)
                            } else {
                                debug!("[Worker {}] Duplicate content at {}", worker_id, request.url);
                                None
                            }
                        }
                        Err(e) => {
                            warn!("Crawl error for {}: {}", request.url, e);
                            Some(CrawlResult::with_error(request, e.to_string()))
                        }
                    };

                    if let Some(result) = result {
                        if let Some(ref callback) = result_cb {
                            callback(result.clone());
                        }
                        run_results.lock().await.push(result);
                    }

                    in_flight.fetch_sub(1, Ordering::SeqCst);
                }

                debug!("Worker {} finished", worker_id);
            });

            worker_handles.push(handle);
        }

        let joined = futures::future::join_all(worker_handles).await;
        filter.close();
        for outcome in joined {
            outcome?;
        }

        let run_results = std::mem::take(&mut *run_results.lock().await);
        self.results.lock().await.extend(run_results.iter().cloned());
        info!("Crawl complete. Visited {} pages", run_results.len());
        Ok(run_results)
    }

    /// Fetch one request. Returns the response, its raw payload and the result record.
    async fn fetch(client: &Client, request: &Request) -> Result<(Response, Vec<u8>, CrawlResult)> {
        debug!("Fetching {}", request.url);

        let mut builder = client.request(request.method.clone(), &request.url);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(ref body) = request.body {
            builder = builder.body(body.clone());
        }

        let start = Instant::now();
        let http_response = builder.send().await?;
        let response_time = start.elapsed();

        let mut response = Response::new(http_response.url().clone());
        response.status_code = http_response.status().as_u16();
        response.headers = Headers::from(http_response.headers());
        response.depth = request.depth;
        response.root_hostname = request.root_hostname.clone();

        let mut result = CrawlResult::new(request.clone());
        result.status_code = response.status_code;
        result.headers = response.headers.clone();
        result.content_type = response.content_type().map(str::to_string);
        result.content_length = http_response.content_length();
        result.response_time = response_time;

        let payload = http_response.bytes().await?.to_vec();
        response.body = String::from_utf8_lossy(&payload).into_owned();
        Ok((response, payload, result))
    }

    /// Candidate requests from redirect, `Link` and `Refresh` headers and, for
    /// HTML pages, from link-bearing elements.
    fn discover(response: &Response) -> Discovery {
        let source = response.url.as_str();
        let mut candidates: Vec<(String, &'static str, &'static str)> = Vec::new();

        if response.is_redirect()
            && let Some(location) = response.headers.get("location")
        {
            candidates.push((location.to_string(), "header", "location"));
        }
        if let Some(link) = response.headers.get("link") {
            for target in parse_link_header(link) {
                candidates.push((target, "header", "link"));
            }
        }
        if let Some(target) = response.headers.get("refresh").and_then(parse_refresh_header) {
            candidates.push((target, "header", "refresh"));
        }

        let (mut forms, mut scripts) = (0, 0);
        if response.is_html() {
            let document = Html::parse_document(&response.body);
            for (selector, tag, attribute) in LINK_SELECTORS.iter() {
                for element in document.select(selector) {
                    if let Some(value) = element.value().attr(attribute) {
                        candidates.push((value.to_string(), *tag, *attribute));
                    }
                }
            }
            for element in document.select(&META_SELECTOR) {
                let meta = element.value();
                if meta
                    .attr("http-equiv")
                    .is_some_and(|v| v.eq_ignore_ascii_case("refresh"))
                    && let Some(target) = meta.attr("content").and_then(parse_refresh_header)
                {
                    candidates.push((target, "meta", "content"));
                }
            }
            forms = document.select(&FORM_SELECTOR).count();
            scripts = document.select(&SCRIPT_SELECTOR).count();
        }

        let requests = candidates
            .into_iter()
            .map(|(candidate, tag, attribute)| {
                Request::from_response(&candidate, source, tag, attribute, response)
            })
            .filter(|request| request.is_navigable() && is_http(&request.url))
            .collect();

        Discovery {
            requests,
            forms,
            scripts,
        }
    }

    fn in_scope(
        url: &str,
        base_domain: &str,
        cross_domain_callback: &Option<CrossDomainCallback>,
        auto_follow: bool,
    ) -> bool {
        if Self::is_same_domain(url, base_domain) || auto_follow {
            return true;
        }
        match cross_domain_callback {
            Some(callback) => callback(url.to_string(), base_domain.to_string()),
            None => false,
        }
    }

    fn is_same_domain(url: &str, base_domain: &str) -> bool {
        if let Ok(parsed) = Url::parse(url)
            && let Some(host) = parsed.host_str()
        {
            return host == base_domain || host.ends_with(&format!(".{}", base_domain));
        }
        false
    }

    /// Results from every crawl run so far.
    pub async fn get_results(&self) -> Vec<CrawlResult> {
        self.results.lock().await.clone()
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}

/// Admission gate of the frontier.
///
/// A request is queued only if it is within `max_depth`, is not classified as a
/// cycle and its identity has not been seen before. Returns whether it was queued.
pub fn admit(filter: &dyn Filter, frontier: &Frontier, request: Request, max_depth: usize) -> bool {
    if request.depth > max_depth {
        return false;
    }
    if filter.is_cycle(&request.url) {
        debug!("Dropping cyclic URL {}", request.url);
        return false;
    }

    let identity = request.request_url();
    if identity.is_empty() {
        debug!("No identity for {} {}, skipping", request.method, request.url);
        return false;
    }
    if !filter.unique_url(&identity) {
        return false;
    }

    frontier.push(request);
    true
}

fn is_http(url: &str) -> bool {
    Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}
