//! Text cleaning and name normalization.

use std::sync::LazyLock;

use regex::Regex;

use crate::rules::STOP_WORDS;

/// Lines with this many characters or fewer are treated as navigation noise.
pub const MIN_LINE_CHARS: usize = 10;

/// Clean raw page text.
///
/// Per line: strip characters outside word characters, whitespace and basic
/// punctuation, collapse whitespace, and drop the line if it is noise. The
/// surviving lines are joined by single spaces.
pub fn clean_text(text: &str) -> String {
    text.lines()
        .map(clean_line)
        .filter(|line| line.chars().count() > MIN_LINE_CHARS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clean a page title: same character filter as [`clean_text`], but short
/// titles are kept.
pub fn clean_title(title: &str) -> String {
    clean_line(title)
}

fn clean_line(line: &str) -> String {
    static DISALLOWED_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\w\s.,!?\-:;()]").expect("valid regex"));

    DISALLOWED_RE
        .replace_all(line, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize a phrase into a module or submodule name.
///
/// Non-word characters are removed, each word is capitalized, and stop words
/// are dropped unless they are the first word. Normalizing an already
/// normalized name returns it unchanged.
pub fn normalize_name(raw: &str) -> String {
    static NON_WORD_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

    NON_WORD_RE
        .replace_all(raw, "")
        .split_whitespace()
        .map(capitalize)
        .enumerate()
        .filter(|(i, word)| *i == 0 || !STOP_WORDS.contains(&word.as_str()))
        .map(|(_, word)| word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uppercase the first character and lowercase the rest.
///
/// A first character whose uppercase form is several characters (e.g. `ß`)
/// is kept as is, so the result is stable under repeated application.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let upper = first.to_uppercase();
    let mut out = String::with_capacity(word.len());
    if upper.len() == 1 {
        out.extend(upper);
    } else {
        out.push(first);
    }
    out.push_str(&chars.as_str().to_lowercase());
    out
}

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
