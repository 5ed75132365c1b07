//! Rule-based extraction of structured fields from model text
//!
//! Each field is produced by one rule: an ordered list of patterns plus a fixed default.
//! Patterns are tried in order, each against the whole text, and the first capture wins.
//! Rules never fail. When nothing matches, the default is returned.
//!
//! The rule tables for each endpoint live in the submodules as public statics, so the
//! patterns and defaults can be inspected or reused without touching the control flow.

use std::sync::LazyLock;

use regex::Regex;

pub mod analysis;
pub mod bot;
pub mod strategy;

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

fn compile(field: &str, patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).unwrap_or_else(|e| panic!("invalid pattern for `{}`: {}", field, e))
        })
        .collect()
}

/// Capture group 1 of the first pattern that matches
fn first_capture<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns
        .iter()
        .find_map(|re| re.captures(text).and_then(|c| c.get(1)))
        .map(|m| m.as_str())
}

/// Trim whitespace and markdown emphasis, collapse inner whitespace
pub fn clean_value(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('*').trim();
    WHITESPACE_RUN.replace_all(trimmed, " ").into_owned()
}

/// Parse the first run of digits in `raw`
pub fn first_number(raw: &str) -> Option<i64> {
    DIGIT_RUN
        .find(raw)
        .and_then(|m| m.as_str().parse().ok())
}

/// Split on commas and newlines, clean each entry, drop empties, keep at most `max`
pub fn split_list(raw: &str, max: usize) -> Vec<String> {
    raw.split([',', '\n'])
        .map(clean_value)
        .filter(|item| !item.is_empty())
        .take(max)
        .collect()
}

/// Scalar string field
pub struct TextRule {
    pub field: &'static str,
    pub default: &'static str,
    patterns: Vec<Regex>,
    lowercase: bool,
}

impl TextRule {
    pub fn new(field: &'static str, patterns: &[&str], default: &'static str) -> Self {
        Self {
            field,
            default,
            patterns: compile(field, patterns),
            lowercase: false,
        }
    }

    pub fn lowercased(mut self) -> Self {
        self.lowercase = true;
        self
    }

    pub fn apply(&self, text: &str) -> String {
        let value = first_capture(&self.patterns, text)
            .map(clean_value)
            .filter(|v| !v.is_empty());

        match value {
            Some(v) if self.lowercase => v.to_lowercase(),
            Some(v) => v,
            None => self.default.to_string(),
        }
    }
}

/// Integer field. No range check is applied to the parsed value.
pub struct NumberRule {
    pub field: &'static str,
    pub default: i64,
    patterns: Vec<Regex>,
}

impl NumberRule {
    pub fn new(field: &'static str, patterns: &[&str], default: i64) -> Self {
        Self {
            field,
            default,
            patterns: compile(field, patterns),
        }
    }

    pub fn apply(&self, text: &str) -> i64 {
        first_capture(&self.patterns, text)
            .and_then(first_number)
            .unwrap_or(self.default)
    }
}

/// List-of-strings field
pub struct ListRule {
    pub field: &'static str,
    pub max: usize,
    pub default: &'static [&'static str],
    patterns: Vec<Regex>,
}

impl ListRule {
    pub fn new(
        field: &'static str,
        patterns: &[&str],
        max: usize,
        default: &'static [&'static str],
    ) -> Self {
        Self {
            field,
            max,
            default,
            patterns: compile(field, patterns),
        }
    }

    pub fn apply(&self, text: &str) -> Vec<String> {
        let items = first_capture(&self.patterns, text)
            .map(|raw| split_list(raw, self.max))
            .unwrap_or_default();

        if items.is_empty() {
            self.default.iter().map(|s| s.to_string()).collect()
        } else {
            items
        }
    }
}

/// Collects every match of one pattern (capture `group`, 0 for the whole match)
pub struct MatchAllRule {
    pub field: &'static str,
    pub max: usize,
    pub default: &'static [&'static str],
    pattern: Regex,
    group: usize,
}

impl MatchAllRule {
    pub fn new(
        field: &'static str,
        pattern: &str,
        group: usize,
        max: usize,
        default: &'static [&'static str],
    ) -> Self {
        let mut compiled = compile(field, &[pattern]);
        Self {
            field,
            max,
            default,
            pattern: compiled.remove(0),
            group,
        }
    }

    pub fn apply(&self, text: &str) -> Vec<String> {
        let items: Vec<String> = self
            .pattern
            .captures_iter(text)
            .filter_map(|c| c.get(self.group))
            .map(|m| clean_value(m.as_str()))
            .filter(|item| !item.is_empty())
            .take(self.max)
            .collect();

        if items.is_empty() {
            self.default.iter().map(|s| s.to_string()).collect()
        } else {
            items
        }
    }
}

/// Boolean field: true when any marker occurs, case-insensitively
pub struct FlagRule {
    pub field: &'static str,
    pub markers: &'static [&'static str],
}

impl FlagRule {
    pub const fn new(field: &'static str, markers: &'static [&'static str]) -> Self {
        Self { field, markers }
    }

    pub fn apply(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        let hit = self
            .markers
            .iter()
            .find(|marker| lower.contains(&marker.to_lowercase()));
        tracing::trace!(field = self.field, marker = ?hit, "Flag rule applied");
        hit.is_some()
    }
}

/// `KEY: value` lookup used by the pixel-format bot prompt
pub struct KeyValueRule {
    pub key: &'static str,
    pattern: Regex,
}

impl KeyValueRule {
    pub const MISSING: &'static str = "Unknown";

    pub fn new(key: &'static str) -> Self {
        // Tolerates markdown bold around the key: "**KEY:** value" and "**KEY**: value"
        let pattern = format!(r"(?i){}\**:\s*(.+)", regex::escape(key));
        let mut compiled = compile(key, &[pattern.as_str()]);
        Self {
            key,
            pattern: compiled.remove(0),
        }
    }

    /// Raw value, if the key is present with a non-empty value
    pub fn find(&self, text: &str) -> Option<String> {
        let value = self
            .pattern
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| clean_value(m.as_str()))
            .filter(|v| !v.is_empty());
        if value.is_none() {
            tracing::trace!(key = self.key, "Key not present in bot reply");
        }
        value
    }

    /// Value or `"Unknown"`
    pub fn text(&self, text: &str) -> String {
        self.find(text)
            .unwrap_or_else(|| Self::MISSING.to_string())
    }

    /// First digit run of the value, or `default`
    pub fn number(&self, text: &str, default: i64) -> i64 {
        self.find(text)
            .as_deref()
            .and_then(first_number)
            .unwrap_or(default)
    }
}
