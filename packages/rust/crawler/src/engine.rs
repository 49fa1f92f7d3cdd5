//! Breadth-first, domain-confined web crawler.
//!
//! The crawler starts from one or more seed URLs, walks same-host links in FIFO
//! order, and stops when the queue drains or the page budget is reached. Pages
//! are fetched one at a time with a fixed delay after each. Fetch failures are
//! logged and skipped; they never abort the crawl.

use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use scraper::Html;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use docmodules_shared::{CrawlConfig, DocModulesError, PageRecord, Result};

use crate::extract::{ExtractedContent, extract_content, extract_links, normalize_url};

// ---------------------------------------------------------------------------
// CrawlReport
// ---------------------------------------------------------------------------

/// Outcome of a crawl: the collected pages plus bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Pages with non-empty content, in fetch order.
    pub pages: Vec<PageRecord>,
    /// Queue entries dropped as duplicates or beyond the depth limit.
    pub pages_skipped: usize,
    /// Fetch failures (URL, error message).
    pub errors: Vec<(String, String)>,
    /// Wall-clock duration of the crawl.
    pub duration: Duration,
}

// ---------------------------------------------------------------------------
// Crawler
// ---------------------------------------------------------------------------

/// Sequential BFS crawler. Holds no state between calls.
pub struct Crawler {
    config: CrawlConfig,
    client: Client,
}

/// Mutable state owned by a single crawl invocation.
struct CrawlState {
    queue: VecDeque<(Url, u32)>,
    visited: HashSet<String>,
    report: CrawlReport,
}

impl Crawler {
    /// Create a new crawler with the given budget.
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(config.timeout)
            .build()
            .map_err(|e| DocModulesError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// The budget this crawler was built with.
    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawl from `seeds` and return the collected pages.
    pub async fn crawl(&self, seeds: &[String]) -> Vec<PageRecord> {
        self.crawl_report(seeds).await.pages
    }

    /// Crawl from `seeds` and return pages together with skip/error statistics.
    ///
    /// An empty seed list is a contract violation: it is logged and yields an
    /// empty report.
    #[instrument(skip_all, fields(seeds = seeds.len(), max_depth = self.config.max_depth, max_pages = self.config.max_pages))]
    pub async fn crawl_report(&self, seeds: &[String]) -> CrawlReport {
        let start_time = Instant::now();

        if seeds.is_empty() {
            error!("no seed URLs provided");
            return CrawlReport::default();
        }

        let mut state = CrawlState {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            report: CrawlReport::default(),
        };

        for seed in seeds {
            match Url::parse(seed.trim()) {
                Ok(url) => state.queue.push_back((url, 0)),
                Err(e) => {
                    warn!(%seed, error = %e, "invalid seed URL, skipping");
                    state.report.errors.push((seed.clone(), e.to_string()));
                }
            }
        }

        info!(
            delay_ms = self.config.delay.as_millis() as u64,
            "starting crawl"
        );

        while state.report.pages.len() < self.config.max_pages {
            let Some((url, depth)) = state.queue.pop_front() else {
                break;
            };

            let key = normalize_url(&url);
            if depth > self.config.max_depth || state.visited.contains(&key) {
                debug!(%url, depth, "already visited or too deep, skipping");
                state.report.pages_skipped += 1;
                continue;
            }
            state.visited.insert(key.clone());

            match self.fetch_html(&url).await {
                Ok(body) => {
                    let want_links = depth < self.config.max_depth;
                    let (content, links) = parse_page(&body, &url, want_links);

                    if content.content.is_empty() {
                        debug!(%url, "no content extracted");
                    } else {
                        state.report.pages.push(PageRecord {
                            url: key,
                            title: content.title,
                            content: content.content,
                            depth,
                        });
                    }

                    for link in links {
                        if !state.visited.contains(&normalize_url(&link)) {
                            state.queue.push_back((link, depth + 1));
                        }
                    }
                }
                Err(e) => {
                    warn!(%url, error = %e, "fetch failed, skipping page");
                    state.report.errors.push((url.to_string(), e.to_string()));
                }
            }

            if !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }
        }

        state.report.duration = start_time.elapsed();

        info!(
            pages = state.report.pages.len(),
            skipped = state.report.pages_skipped,
            errors = state.report.errors.len(),
            queued = state.queue.len(),
            duration_ms = state.report.duration.as_millis() as u64,
            "crawl completed"
        );

        state.report
    }

    /// Fetch and extract a single page without following links.
    ///
    /// Returns `None` for an invalid URL, a failed fetch, or a page with no content.
    #[instrument(skip(self))]
    pub async fn scrape_single(&self, url: &str) -> Option<PageRecord> {
        let parsed = match Url::parse(url.trim()) {
            Ok(u) if u.host_str().is_some() => u,
            _ => {
                error!("invalid URL");
                return None;
            }
        };

        let body = match self.fetch_html(&parsed).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "fetch failed");
                return None;
            }
        };

        let (content, _) = parse_page(&body, &parsed, false);
        if content.content.is_empty() {
            return None;
        }

        Some(PageRecord {
            url: normalize_url(&parsed),
            title: content.title,
            content: content.content,
            depth: 0,
        })
    }

    /// GET a URL and return its body if it is a successful HTML response.
    async fn fetch_html(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| DocModulesError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DocModulesError::Network(format!("{url}: HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !content_type.contains("text/html") {
            return Err(DocModulesError::parse(format!(
                "{url}: non-HTML content type '{content_type}'"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| DocModulesError::Network(format!("{url}: body read failed: {e}")))
    }
}

/// Parse a body into extracted content and (optionally) outbound links.
///
/// Kept synchronous so the parsed document never lives across an await.
fn parse_page(body: &str, url: &Url, want_links: bool) -> (ExtractedContent, Vec<Url>) {
    let doc = Html::parse_document(body);
    let content = extract_content(&doc);
    let links = if want_links {
        extract_links(&doc, url)
    } else {
        Vec::new()
    };
    (content, links)
}
