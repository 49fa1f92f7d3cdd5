//! Web crawler and page content extraction.
//!
//! This crate provides:
//! - [`engine`]: Sequential, domain-confined BFS crawler with depth/page/delay budgets
//! - [`extract`]: Main-content text, title, and link extraction from HTML

pub mod engine;
pub mod extract;

pub use engine::{CrawlReport, Crawler};
pub use extract::{ExtractedContent, extract_content, extract_links, is_same_domain, normalize_url};
