//! Seed URL helpers for callers.

use std::path::Path;

use tracing::warn;

use docmodules_shared::{DocModulesError, Result};

/// Parse a URL list: one URL per line, blank lines and `#` comments skipped.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Read a URL list file (see [`parse_url_list`]).
pub fn read_url_file(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| DocModulesError::io(path, e))?;
    Ok(parse_url_list(&text))
}

/// Keep URLs that look crawlable: an `http://` or `https://` scheme and a dot.
pub fn validate_urls(urls: &[String]) -> Vec<String> {
    urls.iter()
        .filter(|url| {
            let ok = (url.starts_with("http://") || url.starts_with("https://")) && url.contains('.');
            if !ok {
                warn!(%url, "invalid URL skipped");
            }
            ok
        })
        .cloned()
        .collect()
}
