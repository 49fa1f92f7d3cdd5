//! Pattern tables driving module and submodule detection.
//!
//! Each table is an ordered list of named rules evaluated in sequence, so the
//! priority of a rule is its position in the table.

use std::sync::LazyLock;

use regex::Regex;

/// A named pattern yielding one phrase per match.
///
/// The phrase is capture group 1 when the pattern has one, otherwise the
/// whole match.
#[derive(Debug)]
pub struct PhraseRule {
    pub name: &'static str,
    regex: Regex,
}

impl PhraseRule {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("valid regex"),
        }
    }

    /// All phrases this rule finds in `text`, in order of appearance.
    pub fn phrases<'t>(&self, text: &'t str) -> impl Iterator<Item = &'t str> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
            .map(|m| m.as_str())
    }
}

fn build(table: &[(&'static str, &str)]) -> Vec<PhraseRule> {
    table
        .iter()
        .map(|(name, pattern)| PhraseRule::new(name, pattern))
        .collect()
}

/// Canonical documentation section names.
pub static SECTION_RULES: LazyLock<Vec<PhraseRule>> = LazyLock::new(|| {
    build(&[
        ("getting_started", r"(?i)\bgetting\s+started"),
        ("quick_start", r"(?i)\bquick\s+start"),
        ("installation", r"(?i)\binstallation"),
        ("setup", r"(?i)\bsetup"),
        ("configuration", r"(?i)\bconfiguration"),
        ("api_reference", r"(?i)\bapi\s+reference"),
        ("user_guide", r"(?i)\buser\s+guide"),
        ("tutorial", r"(?i)\btutorial"),
        ("how_to", r"(?i)\bhow\s+to"),
        ("faq", r"(?i)\bfaq"),
        ("troubleshooting", r"(?i)\btroubleshooting"),
        ("account_management", r"(?i)\baccount\s+management"),
        ("billing", r"(?i)\bbilling"),
        ("security", r"(?i)\bsecurity"),
        ("integration", r"(?i)\bintegration"),
        ("features", r"(?i)\bfeatures"),
        ("settings", r"(?i)\bsettings"),
        ("admin", r"(?i)\badmin"),
        ("dashboard", r"(?i)\bdashboard"),
    ])
});

/// Runs of capitalized words, e.g. "Account Recovery Options".
pub static TITLE_CASE_RULE: LazyLock<PhraseRule> = LazyLock::new(|| {
    PhraseRule::new("title_case", r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)\b")
});

/// Verb-led phrases that usually name a task-level feature.
pub static ACTION_RULES: LazyLock<Vec<PhraseRule>> = LazyLock::new(|| {
    build(&[
        ("how_to", r"(?i)\bhow\s+to\s+([^.!?]{5,50})"),
        ("create", r"(?i)\bcreate\s+([^.!?]{5,30})"),
        ("delete", r"(?i)\bdelete\s+([^.!?]{5,30})"),
        ("manage", r"(?i)\bmanage\s+([^.!?]{5,30})"),
        ("configure", r"(?i)\bconfigure\s+([^.!?]{5,30})"),
        ("setup", r"(?i)\bsetup\s+([^.!?]{5,30})"),
        ("add", r"(?i)\badd\s+([^.!?]{5,30})"),
        ("remove", r"(?i)\bremove\s+([^.!?]{5,30})"),
        ("update", r"(?i)\bupdate\s+([^.!?]{5,30})"),
        ("edit", r"(?i)\bedit\s+([^.!?]{5,30})"),
    ])
});

/// Numbered or bulleted list items at the start of a line.
///
/// Cleaned page text is a single line, so in practice this only matches a
/// marker at the very start of an item's title and content.
pub static LIST_ITEM_RULE: LazyLock<PhraseRule> = LazyLock::new(|| {
    PhraseRule::new("list_item", r"(?m)(?:^\d+\.|^\*\s+|^-\s+)([^.!?\n]{10,60})")
});

/// Words dropped from normalized names unless they lead the name.
pub const STOP_WORDS: &[&str] = &[
    "The", "And", "Or", "But", "In", "On", "At", "To", "For", "Of", "With", "By",
];

/// Narrative openers that disqualify a sentence from being a heading.
pub const NARRATIVE_LEAD_INS: &[&str] = &["The ", "This ", "You can"];

/// Keywords marking a heading as finer-grained (level 2).
pub const FINE_GRAINED_KEYWORDS: &[&str] = &["how to", "step", "guide"];
