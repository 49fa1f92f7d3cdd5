//! End-to-end extraction pipeline: seeds → crawl → structure → describe.

use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use docmodules_crawler::Crawler;
use docmodules_shared::{CrawlConfig, ModuleRecord, Result, ServiceConfig, records_to_json};

use crate::describe::{Describer, extract_with, service_describer};
use crate::seeds::validate_urls;

/// Configuration for [`run_extraction`].
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Seed URLs; entries that do not look crawlable are skipped.
    pub urls: Vec<String>,
    /// Crawl budget.
    pub crawl: CrawlConfig,
    /// Service settings; `None` selects the heuristic describer.
    pub service: Option<ServiceConfig>,
}

/// How a run ended, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStatus {
    /// The crawl produced no pages.
    NoPagesScraped,
    /// Pages were scraped but no module records came out.
    NoModulesExtracted,
    /// At least one module record was produced.
    Complete,
}

/// Result of [`run_extraction`].
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    /// Pages returned by the crawler.
    pub pages_scraped: usize,
    /// Fetches that failed during the crawl.
    pub fetch_errors: usize,
    /// Modules found by the structurer.
    pub modules_detected: usize,
    /// Final validated records.
    pub records: Vec<ModuleRecord>,
    /// Describer that produced `records`.
    pub describer: &'static str,
    /// Total elapsed time.
    pub elapsed: Duration,
}

impl ExtractionReport {
    pub fn total_submodules(&self) -> usize {
        self.records.iter().map(|r| r.submodules.len()).sum()
    }

    pub fn status(&self) -> ExtractionStatus {
        if self.pages_scraped == 0 {
            ExtractionStatus::NoPagesScraped
        } else if self.records.is_empty() {
            ExtractionStatus::NoModulesExtracted
        } else {
            ExtractionStatus::Complete
        }
    }

    /// Records as JSON in the published output format.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        records_to_json(&self.records, pretty)
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once the crawl has finished.
    fn pages_scraped(&self, count: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &ExtractionReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn pages_scraped(&self, _count: usize) {}
    fn done(&self, _report: &ExtractionReport) {}
}

/// Run the full pipeline.
///
/// 1. Seed validation
/// 2. Crawl
/// 3. Structure pages into modules
/// 4. Describe modules (service first when configured, heuristics otherwise)
///
/// Only an invalid crawl budget or an HTTP client that cannot be built is an
/// error; everything downstream degrades to fewer (or zero) records.
#[instrument(skip_all, fields(seeds = config.urls.len(), service = config.service.is_some()))]
pub async fn run_extraction(
    config: &ExtractionConfig,
    progress: &dyn ProgressReporter,
) -> Result<ExtractionReport> {
    let start = Instant::now();
    config.crawl.validate()?;

    let seeds = validate_urls(&config.urls);
    let crawler = Crawler::new(config.crawl.clone())?;

    progress.phase("Crawling documentation");
    let crawl = crawler.crawl_report(&seeds).await;
    progress.pages_scraped(crawl.pages.len());
    if crawl.pages.is_empty() {
        warn!(errors = crawl.errors.len(), "no content could be extracted from the seed URLs");
    }

    progress.phase("Identifying modules");
    let structured = docmodules_structure::process(&crawl.pages);

    progress.phase("Describing modules");
    let primary = service_describer(config.service.as_ref());
    let extraction = extract_with(&structured, primary.as_ref().map(|d| d as &dyn Describer)).await;

    let report = ExtractionReport {
        pages_scraped: crawl.pages.len(),
        fetch_errors: crawl.errors.len(),
        modules_detected: structured.len(),
        records: extraction.records,
        describer: extraction.describer,
        elapsed: start.elapsed(),
    };

    info!(
        pages = report.pages_scraped,
        modules = report.records.len(),
        submodules = report.total_submodules(),
        describer = report.describer,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "extraction complete"
    );

    progress.done(&report);
    Ok(report)
}
