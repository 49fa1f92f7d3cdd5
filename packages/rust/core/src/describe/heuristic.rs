//! Rule-based describer: canned templates, feature phrases, and generic text.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

use docmodules_shared::{
    DocModulesError, ModuleRecord, Result, StructuredModule, StructuredModules,
};
use docmodules_structure::cleanup::{capitalize, truncate_chars};
use docmodules_structure::extract_submodules;

use super::Describer;

/// Canned module descriptions keyed by a lowercase name fragment.
/// The first fragment contained in the module name wins.
pub const DESCRIPTION_TEMPLATES: &[(&str, &str)] = &[
    (
        "account",
        "Account Management - Features for managing user accounts, profiles, and personal settings",
    ),
    (
        "billing",
        "Billing and Payments - Payment processing, subscription management, and billing features",
    ),
    (
        "security",
        "Security and Privacy - Security settings, privacy controls, and account protection features",
    ),
    (
        "api",
        "API and Integration - API documentation, integration guides, and developer resources",
    ),
    (
        "setup",
        "Setup and Configuration - Initial setup, configuration options, and getting started guides",
    ),
    (
        "support",
        "Support and Help - Help resources, troubleshooting, and customer support features",
    ),
    (
        "dashboard",
        "Dashboard and Analytics - Main dashboard features and analytics tools",
    ),
    (
        "user",
        "User Management - User account features and management capabilities",
    ),
    (
        "settings",
        "Settings and Preferences - Application settings and user preferences",
    ),
    (
        "admin",
        "Administration - Administrative tools and management features",
    ),
];

/// Feature-indicating phrases: group 1 is the lead word, group 2 the object.
static FEATURE_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(manage|create|delete|configure|setup|add|remove|update|edit|view)\s+([^.]{5,30})",
        r"(?i)\b(features?|capabilities?|options?)\s+(?:include|for)\s+([^.]{10,50})",
        r"(?i)\b(allows?|enables?)\s+(?:you\s+to\s+)?([^.]{10,50})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Main-content snippets scanned for feature phrases.
const FEATURE_SNIPPETS: usize = 2;
/// Characters of joined snippet text scanned for feature phrases.
const FEATURE_SCAN_CHARS: usize = 500;
/// Feature phrases quoted in a description.
const MAX_FEATURES: usize = 3;
/// Characters of a submodule's first snippet considered for its description.
const SUBMODULE_SCAN_CHARS: usize = 200;
/// A leading sentence must be longer than this to serve as a description.
const MIN_SENTENCE_CHARS: usize = 20;

/// Describer that needs no external service.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicDescriber;

impl HeuristicDescriber {
    /// Describe every module, in key order.
    pub fn describe_modules(&self, structured: &StructuredModules) -> Vec<ModuleRecord> {
        structured
            .iter()
            .map(|(name, module)| describe_module(name, module))
            .collect()
    }
}

#[async_trait]
impl Describer for HeuristicDescriber {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn describe(&self, structured: &StructuredModules) -> Result<Vec<Value>> {
        self.describe_modules(structured)
            .iter()
            .map(|record| {
                serde_json::to_value(record)
                    .map_err(|e| DocModulesError::parse(format!("failed to encode record: {e}")))
            })
            .collect()
    }
}

fn describe_module(name: &str, module: &StructuredModule) -> ModuleRecord {
    let display = display_name(name);

    ModuleRecord {
        description: module_description(&display, module),
        submodules: submodule_descriptions(name, module),
        module: display,
    }
}

/// Punctuation stripped, each word capitalized.
fn display_name(name: &str) -> String {
    name.split_whitespace()
        .map(|word| word.chars().filter(|c| c.is_alphanumeric() || *c == '_').collect::<String>())
        .filter(|word| !word.is_empty())
        .map(|word| capitalize(&word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn module_description(name: &str, module: &StructuredModule) -> String {
    let lower = name.to_lowercase();

    if let Some((_, template)) = DESCRIPTION_TEMPLATES
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
    {
        return (*template).to_string();
    }

    let features = key_features(&module.main_content);
    if features.is_empty() {
        format!("{name} - Documentation and features related to {lower}")
    } else {
        format!("{name} - Features for {}", features.join(", "))
    }
}

fn key_features(main_content: &[String]) -> Vec<String> {
    let joined = main_content
        .iter()
        .take(FEATURE_SNIPPETS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    let text = truncate_chars(&joined, FEATURE_SCAN_CHARS);

    FEATURE_RULES
        .iter()
        .flat_map(|rule| {
            rule.captures_iter(&text)
                .map(|caps| format!("{} {}", &caps[1], caps[2].trim()))
                .collect::<Vec<_>>()
        })
        .take(MAX_FEATURES)
        .collect()
}

fn submodule_descriptions(name: &str, module: &StructuredModule) -> BTreeMap<String, String> {
    if !module.submodules.is_empty() {
        return module
            .submodules
            .iter()
            .map(|(sub, content)| (sub.clone(), submodule_description(sub, content)))
            .collect();
    }

    if module.main_content.is_empty() {
        return BTreeMap::new();
    }

    // Secondary pass so implied features still surface.
    extract_submodules(&module.main_content.join(" "), name)
        .into_iter()
        .map(|sub| {
            let description = format!(
                "Features and functionality related to {}",
                sub.to_lowercase()
            );
            (sub, description)
        })
        .collect()
}

fn submodule_description(name: &str, content: &[String]) -> String {
    let Some(first) = content.first() else {
        return format!("Features related to {}", name.to_lowercase());
    };

    let head = truncate_chars(first, SUBMODULE_SCAN_CHARS);
    let sentence = head.split('.').next().unwrap_or_default().trim();

    if sentence.chars().count() > MIN_SENTENCE_CHARS {
        format!("{sentence}.")
    } else {
        format!("Functionality for {} operations and management", name.to_lowercase())
    }
}
