//! # Title Matching
//!
//! Normalizes page titles and entity phrases to a common key and looks
//! phrases up in an index of every canonical title and redirect.
//!
//! Several original titles can share one normalized key ("Tree (graph
//! theory)" and "Tree (data structure)" both become "tree"). The index keeps
//! every one of them; callers decide what to do with the ambiguity.

use crate::Title;
use crate::redirect::{RedirectGraph, RedirectResolver};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// One trailing parenthetical, e.g. " (data structure)". The group may
/// itself hold one level of parentheses, as in " (album (2004))".
static TRAILING_PARENTHETICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\((?:[^()]|\([^()]*\))*\)\s*$")
        .expect("trailing parenthetical pattern is valid")
});

/// Lowercase `title` and drop one trailing disambiguation suffix.
///
/// Parentheticals in the middle of a title are kept.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    let lower = title.to_lowercase();
    TRAILING_PARENTHETICAL.replace(&lower, "").into_owned()
}

// =============================================================================
// PHRASES
// =============================================================================

/// The textual names of one entity: a single phrase or ordered alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Phrases {
    One(String),
    Many(Vec<String>),
}

impl Phrases {
    /// The phrases as a slice, whichever form was supplied.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::One(phrase) => std::slice::from_ref(phrase),
            Self::Many(phrases) => phrases,
        }
    }

    /// Whether there is no phrase at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl From<&str> for Phrases {
    fn from(phrase: &str) -> Self {
        Self::One(phrase.to_string())
    }
}

impl From<Vec<&str>> for Phrases {
    fn from(phrases: Vec<&str>) -> Self {
        Self::Many(phrases.into_iter().map(str::to_string).collect())
    }
}

// =============================================================================
// PROCESSED TITLE INDEX
// =============================================================================

/// Normalized title -> every original title that normalizes to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProcessedTitleIndex {
    buckets: BTreeMap<String, BTreeSet<Title>>,
}

impl ProcessedTitleIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every canonical title, plus every redirect source pointing at
    /// its resolved target.
    #[must_use]
    pub fn build(canonical: &BTreeSet<Title>, redirects: &RedirectGraph) -> Self {
        let mut index = Self::new();

        for title in canonical {
            index.insert(title, title.clone());
        }
        tracing::info!(titles = canonical.len(), "indexed canonical titles");

        let resolver = RedirectResolver::new(canonical, redirects);
        for from_title in redirects.keys() {
            index.insert(from_title, resolver.resolve(from_title));
        }
        tracing::info!(redirects = redirects.len(), keys = index.len(), "indexed redirects");

        index
    }

    /// Build directly from normalized buckets.
    #[must_use]
    pub fn from_buckets(buckets: BTreeMap<String, BTreeSet<Title>>) -> Self {
        Self { buckets }
    }

    /// File `original` under the normalized form of `key`.
    pub fn insert(&mut self, key: &str, original: Title) {
        self.buckets
            .entry(normalize_title(key))
            .or_default()
            .insert(original);
    }

    /// Original titles for `phrase`, normalizing it first.
    #[must_use]
    pub fn get(&self, phrase: &str) -> Option<&BTreeSet<Title>> {
        self.buckets.get(&normalize_title(phrase))
    }

    /// Number of normalized keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<Title>)> {
        self.buckets.iter()
    }
}

/// Candidate titles for an entity: the union of the buckets of every phrase
/// that has one.
///
/// An empty result is always logged as "no match"; `label` identifies the
/// entity in that message.
#[must_use]
pub fn match_titles(label: &str, phrases: &Phrases, index: &ProcessedTitleIndex) -> BTreeSet<Title> {
    let mut matched = BTreeSet::new();
    for phrase in phrases.as_slice() {
        if let Some(bucket) = index.get(phrase) {
            matched.extend(bucket.iter().cloned());
        }
    }

    if matched.is_empty() {
        tracing::warn!(entity = label, phrases = ?phrases.as_slice(), "no match found");
    }
    matched
}

// =============================================================================
// TESTS
// =============================================================================
