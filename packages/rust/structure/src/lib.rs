//! Heuristic content structuring: crawled pages → modules → submodules.
//!
//! This crate provides:
//! - [`cleanup`]: text cleaning and module-name normalization
//! - [`headings`]: heading detection over flattened page text
//! - [`rules`]: ordered pattern tables for sections, actions, and list items
//! - [`grouping`]: page-to-module assignment and submodule partitioning
//!
//! The entry point is [`process`].

pub mod cleanup;
pub mod grouping;
pub mod headings;
pub mod rules;

use tracing::{info, instrument};

use docmodules_shared::{PageRecord, StructuredModules};

pub use cleanup::{clean_text, clean_title, normalize_name};
pub use grouping::{
    candidate_modules, detect_modules, extract_submodules, group_related_content, page_modules,
};
pub use headings::{Heading, extract_headings};

/// Structure crawled pages into modules and submodules.
///
/// Pages are cleaned first; pages whose content cleans to nothing are
/// dropped. Titles lose disallowed characters but are never dropped.
/// An empty or fully-noise input yields an empty mapping.
#[instrument(skip_all, fields(pages = pages.len()))]
pub fn process(pages: &[PageRecord]) -> StructuredModules {
    let cleaned: Vec<PageRecord> = pages.iter().filter_map(clean_page).collect();

    let groups = detect_modules(&cleaned);
    let structured = group_related_content(&groups);

    info!(
        kept_pages = cleaned.len(),
        modules = structured.len(),
        submodules = structured.values().map(|m| m.submodules.len()).sum::<usize>(),
        "content structured"
    );

    structured
}

fn clean_page(page: &PageRecord) -> Option<PageRecord> {
    let content = clean_text(&page.content);
    if content.is_empty() {
        return None;
    }

    Some(PageRecord {
        url: page.url.clone(),
        title: clean_title(&page.title),
        content,
        depth: page.depth,
    })
}
