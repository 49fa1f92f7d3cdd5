//! Page-to-module assignment and submodule partitioning.

use std::collections::BTreeMap;

use tracing::debug;
use url::Url;

use docmodules_shared::{ContentItem, ModuleGroups, PageRecord, StructuredModule, StructuredModules};

use crate::cleanup::{normalize_name, truncate_chars};
use crate::headings::extract_headings;
use crate::rules::{ACTION_RULES, LIST_ITEM_RULE, SECTION_RULES, TITLE_CASE_RULE};

/// Characters of page content kept per module entry.
pub const SNIPPET_CHARS: usize = 500;
/// Submodule names kept per content item.
pub const MAX_SUBMODULES_PER_ITEM: usize = 5;

/// Module names must be longer than this.
const MIN_MODULE_NAME_CHARS: usize = 2;
/// Title-case phrases must be longer than this...
const MIN_TITLE_PHRASE_CHARS: usize = 3;
/// ...and shorter than this.
const MAX_TITLE_PHRASE_CHARS: usize = 50;
/// List-item submodule names must be longer than this.
const MIN_LIST_ITEM_NAME_CHARS: usize = 5;
/// URL path segments must be longer than this to name a module.
const MIN_PATH_SEGMENT_CHARS: usize = 2;
/// Leading sentences scanned when nothing else names a page.
const FALLBACK_SENTENCES: usize = 3;

/// Candidate module names found in a piece of text.
///
/// Section-indicator matches come first, then title-case phrases. Names are
/// normalized and deduplicated in order of discovery.
pub fn candidate_modules(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    if text.is_empty() {
        return names;
    }

    for rule in SECTION_RULES.iter() {
        for phrase in rule.phrases(text) {
            push_unique(&mut names, normalize_name(phrase));
        }
    }

    for phrase in TITLE_CASE_RULE.phrases(text) {
        let len = phrase.chars().count();
        if len > MIN_TITLE_PHRASE_CHARS && len < MAX_TITLE_PHRASE_CHARS {
            push_unique(&mut names, normalize_name(phrase));
        }
    }

    names
}

/// Module names for a single (cleaned) page.
///
/// Title and level-1 headings are consulted first; failing that, the last two
/// URL path segments, then title-case phrases in the first few sentences.
pub fn page_modules(page: &PageRecord) -> Vec<String> {
    let mut names = candidate_modules(&page.title);

    for heading in extract_headings(&page.content) {
        if heading.level == 1 {
            for name in candidate_modules(&heading.text) {
                push_unique(&mut names, name);
            }
        }
    }

    if names.is_empty() {
        let segments = path_segments(&page.url);
        if segments.is_empty() {
            for sentence in page.content.split('.').take(FALLBACK_SENTENCES) {
                for name in candidate_modules(sentence) {
                    push_unique(&mut names, name);
                }
            }
        } else {
            let tail = segments.len().saturating_sub(2);
            for segment in &segments[tail..] {
                push_unique(&mut names, normalize_name(segment));
            }
        }
    }

    names.retain(|n| n.chars().count() > MIN_MODULE_NAME_CHARS);
    names
}

/// Assign pages to modules. A page is filed under every module it names.
pub fn detect_modules(pages: &[PageRecord]) -> ModuleGroups {
    let mut groups = ModuleGroups::new();

    for page in pages {
        let names = page_modules(page);
        debug!(url = %page.url, modules = ?names, "page assigned to modules");

        let snippet = truncate_chars(&page.content, SNIPPET_CHARS);
        for name in names {
            groups.entry(name).or_default().push(ContentItem {
                title: page.title.clone(),
                content: snippet.clone(),
                url: page.url.clone(),
            });
        }
    }

    groups
}

/// Partition each module's content into submodules and main content.
pub fn group_related_content(groups: &ModuleGroups) -> StructuredModules {
    let mut structured = StructuredModules::new();

    for (module_name, items) in groups {
        let mut module = StructuredModule {
            main_content: Vec::new(),
            submodules: BTreeMap::new(),
        };

        for item in items {
            let text = format!("{} {}", item.title, item.content);
            let submodules = extract_submodules(text.trim_start(), module_name);

            if submodules.is_empty() {
                module.main_content.push(item.content.clone());
            } else {
                for submodule in submodules {
                    module
                        .submodules
                        .entry(submodule)
                        .or_default()
                        .push(item.content.clone());
                }
            }
        }

        structured.insert(module_name.clone(), module);
    }

    structured
}

/// Submodule names found in `content`, at most [`MAX_SUBMODULES_PER_ITEM`].
///
/// Action phrases come first, then list items. Names contained in the parent
/// module's name (case-insensitively) are rejected.
pub fn extract_submodules(content: &str, parent_module: &str) -> Vec<String> {
    let parent = parent_module.to_lowercase();
    let accept = |name: &str| !name.is_empty() && !parent.contains(&name.to_lowercase());

    let mut names = Vec::new();

    for rule in ACTION_RULES.iter() {
        for phrase in rule.phrases(content) {
            let name = normalize_name(phrase);
            if accept(&name) {
                push_unique(&mut names, name);
            }
        }
    }

    for phrase in LIST_ITEM_RULE.phrases(content) {
        let name = normalize_name(phrase);
        if name.chars().count() > MIN_LIST_ITEM_NAME_CHARS && accept(&name) {
            push_unique(&mut names, name);
        }
    }

    names.truncate(MAX_SUBMODULES_PER_ITEM);
    names
}

fn path_segments(url: &str) -> Vec<String> {
    let Ok(parsed) = Url::parse(url) else {
        return Vec::new();
    };

    parsed
        .path_segments()
        .map(|segments| {
            segments
                .filter(|s| s.chars().count() > MIN_PATH_SEGMENT_CHARS)
                .map(|s| s.replace(['-', '_'], " "))
                .collect()
        })
        .unwrap_or_default()
}

fn push_unique(names: &mut Vec<String>, name: String) {
    if !name.is_empty() && !names.contains(&name) {
        names.push(name);
    }
}
