//! Manual match CSV lines: `source_node, title, title, ...  # comment`.

use crate::Title;
use regex::Regex;
use std::sync::LazyLock;

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#.*").expect("comment pattern is valid"));

static FIELD_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*,\s*").expect("separator pattern is valid"));

/// What a manual line says about its source node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualEntry {
    /// The node matches these titles (possibly none).
    Titles(Vec<Title>),
    /// The node has no article (first title `_` or `-`).
    NoArticle,
}

/// One parsed manual line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualLine {
    pub source_node: String,
    pub entry: ManualEntry,
}

/// Parse one CSV line. Blank and comment-only lines yield `None`.
#[must_use]
pub fn parse_manual_line(line: &str) -> Option<ManualLine> {
    let stripped = COMMENT.replace(line, "");
    let stripped = stripped.trim();
    if stripped.is_empty() {
        return None;
    }

    let mut fields = FIELD_SEPARATOR.split(stripped);
    let source_node = fields.next().unwrap_or_default().to_string();
    let titles: Vec<Title> = fields.map(str::to_string).collect();

    let entry = match titles.first().map(String::as_str) {
        Some("_" | "-") => ManualEntry::NoArticle,
        _ => ManualEntry::Titles(titles),
    };
    Some(ManualLine { source_node, entry })
}
