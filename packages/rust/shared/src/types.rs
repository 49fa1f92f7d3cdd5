//! Core domain types passed between the crawl, structure, and describe stages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DocModulesError, Result};

// ---------------------------------------------------------------------------
// PageRecord
// ---------------------------------------------------------------------------

/// A single crawled page. Content is whitespace-normalized plain text and is
/// never empty; the crawler discards pages that extract to nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// URL the page was fetched from (fragment stripped).
    pub url: String,
    /// Document title (`<title>`, else first `<h1>`), possibly empty.
    pub title: String,
    /// Visible text of the main content region.
    pub content: String,
    /// BFS depth at which the page was reached (seeds are depth 0).
    pub depth: u32,
}

// ---------------------------------------------------------------------------
// Module grouping
// ---------------------------------------------------------------------------

/// One page's contribution to a module during grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    pub title: String,
    /// Leading snippet of the page content.
    pub content: String,
    pub url: String,
}

/// Module name → pages contributing to it. A page may appear under several
/// modules.
pub type ModuleGroups = BTreeMap<String, Vec<ContentItem>>;

/// Content of one module, split into main content and named submodules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredModule {
    /// Snippets that matched no submodule.
    pub main_content: Vec<String>,
    /// Submodule name → snippets filed under it. Names are unique per module.
    pub submodules: BTreeMap<String, Vec<String>>,
}

/// Module name → structured content, as produced by the structurer.
pub type StructuredModules = BTreeMap<String, StructuredModule>;

// ---------------------------------------------------------------------------
// ModuleRecord
// ---------------------------------------------------------------------------

/// The externally visible output unit.
///
/// Field names serialize as `module`, `Description`, `Submodules`; consumers
/// depend on that exact casing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    #[serde(rename = "module")]
    pub module: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Submodules", default)]
    pub submodules: BTreeMap<String, String>,
}

/// Serialize records to the compatibility-contract JSON array.
pub fn records_to_json(records: &[ModuleRecord], pretty: bool) -> Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(records)
    } else {
        serde_json::to_string(records)
    };
    out.map_err(|e| DocModulesError::parse(format!("failed to serialize records: {e}")))
}
