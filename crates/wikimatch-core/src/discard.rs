//! # Discard Categories
//!
//! Categories whose presence among a candidate page's ancestors rules the
//! candidate out (films, albums, people, companies, ...).
//!
//! The set is built once from a curated list, a keyword filter over every
//! known category name and a few fixed extras, then shared read-only.

use crate::Title;
use crate::error::Result;
use crate::wiki::WikiGraph;
use std::collections::BTreeSet;

/// Keywords that mark a category for discarding.
pub const DEFAULT_IGNORE_KEYWORDS: &[&str] = &[
    "film",
    "album",
    "games",
    "comics",
    "songs",
    "music genres",
    "magazines",
    "book series",
    "books",
    "novels",
    "science fiction",
    "literature",
    "fiction",
    "monsters",
    "creatures",
    "works",
    "people",
    "births",
    "deaths",
    "by manufacturer",
    "companies",
    "software",
    "viruses",
    "national parks",
];

/// Keywords that protect a category even when an ignore keyword matches.
pub const DEFAULT_KEEP_KEYWORDS: &[&str] = &["breeds", "animal", "plants"];

/// Always discarded regardless of the curated list.
pub const EXTRA_DISCARD_CATEGORIES: &[&str] = &["Category:Given names"];

// =============================================================================
// KEYWORD FILTER
// =============================================================================

/// Substring filter over lowercased category names. Keep beats ignore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryKeywordFilter {
    ignore: Vec<String>,
    keep: Vec<String>,
}

impl Default for CategoryKeywordFilter {
    fn default() -> Self {
        Self::new(
            DEFAULT_IGNORE_KEYWORDS.iter().copied(),
            DEFAULT_KEEP_KEYWORDS.iter().copied(),
        )
    }
}

impl CategoryKeywordFilter {
    /// Create a filter; keywords are matched case-insensitively.
    pub fn new<'a, I, K>(ignore: I, keep: K) -> Self
    where
        I: IntoIterator<Item = &'a str>,
        K: IntoIterator<Item = &'a str>,
    {
        Self {
            ignore: ignore.into_iter().map(str::to_lowercase).collect(),
            keep: keep.into_iter().map(str::to_lowercase).collect(),
        }
    }

    /// Whether `category` should be discarded.
    #[must_use]
    pub fn discards(&self, category: &str) -> bool {
        let lower = category.to_lowercase();
        if self.keep.iter().any(|k| lower.contains(k.as_str())) {
            return false;
        }
        self.ignore.iter().any(|k| lower.contains(k.as_str()))
    }
}

// =============================================================================
// DISCARD SET
// =============================================================================

/// The immutable set of discard categories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscardCategorySet {
    categories: BTreeSet<Title>,
}

impl DiscardCategorySet {
    /// Union of `curated`, every name in `all_categories` the filter
    /// discards, and [`EXTRA_DISCARD_CATEGORIES`].
    pub fn build<'a, C, A>(curated: C, all_categories: A, filter: &CategoryKeywordFilter) -> Self
    where
        C: IntoIterator<Item = Title>,
        A: IntoIterator<Item = &'a Title>,
    {
        let mut categories: BTreeSet<Title> = curated.into_iter().collect();
        let curated_len = categories.len();

        categories.extend(
            all_categories
                .into_iter()
                .filter(|c| filter.discards(c))
                .cloned(),
        );
        categories.extend(EXTRA_DISCARD_CATEGORIES.iter().map(|c| c.to_string()));

        tracing::info!(
            curated = curated_len,
            total = categories.len(),
            "built discard category set"
        );
        Self { categories }
    }

    /// A set holding exactly `categories`.
    #[must_use]
    pub fn from_categories<I: IntoIterator<Item = Title>>(categories: I) -> Self {
        Self {
            categories: categories.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    /// Members of `reached` that are discard categories.
    #[must_use]
    pub fn hits(&self, reached: &BTreeSet<Title>) -> BTreeSet<Title> {
        reached.intersection(&self.categories).cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Title> {
        self.categories.iter()
    }

    /// Candidates whose ancestors within `max_depth` avoid every discard
    /// category.
    pub fn filter_titles(
        &self,
        titles: &BTreeSet<Title>,
        wiki: &WikiGraph,
        max_depth: usize,
    ) -> Result<BTreeSet<Title>> {
        let mut kept = BTreeSet::new();
        for title in titles {
            let reached = wiki.reachable_ancestor_categories(title, max_depth)?;
            let hits = self.hits(&reached.reached);
            if hits.is_empty() {
                kept.insert(title.clone());
            } else {
                tracing::debug!(title = title.as_str(), hits = ?hits, "discarded candidate");
            }
        }
        Ok(kept)
    }
}
