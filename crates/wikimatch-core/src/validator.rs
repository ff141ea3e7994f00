//! # Category Validation
//!
//! Checks a candidate page against the semantic class its entity is
//! expected to belong to.
//!
//! The entity's ancestors in the source taxonomy are projected into
//! Wikipedia categories through a curated cross-graph map. Categories the
//! candidate reaches that are in the projection support the match; reached
//! categories that belong to any *other* mapped class contradict it.

use crate::Title;
use crate::error::Result;
use crate::wiki::WikiGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Target of one cross-graph map entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryTargets {
    One(Title),
    Many(Vec<Title>),
}

impl CategoryTargets {
    #[must_use]
    pub fn as_slice(&self) -> &[Title] {
        match self {
            Self::One(category) => std::slice::from_ref(category),
            Self::Many(categories) => categories,
        }
    }
}

/// Evidence for one candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryValidation {
    pub supporting: BTreeSet<Title>,
    pub contradicting: BTreeSet<Title>,
    /// The reachability bound cut the search short.
    pub truncated: bool,
}

impl CategoryValidation {
    #[must_use]
    pub fn is_supported(&self) -> bool {
        !self.supporting.is_empty()
    }

    #[must_use]
    pub fn is_contradicted(&self) -> bool {
        !self.contradicting.is_empty()
    }
}

/// Validator over one cross-graph map.
#[derive(Debug, Clone, Default)]
pub struct CategoryValidator {
    map: BTreeMap<String, CategoryTargets>,
    all_targets: BTreeSet<Title>,
}

impl CategoryValidator {
    /// Wrap a source-node -> category map and precompute its full range.
    #[must_use]
    pub fn new(map: BTreeMap<String, CategoryTargets>) -> Self {
        let all_targets = map
            .values()
            .flat_map(|targets| targets.as_slice().iter().cloned())
            .collect();
        Self { map, all_targets }
    }

    /// Every category the map can produce.
    #[must_use]
    pub fn all_targets(&self) -> &BTreeSet<Title> {
        &self.all_targets
    }

    /// Project source-taxonomy ancestors into Wikipedia categories.
    /// Ancestors without a map entry contribute nothing.
    #[must_use]
    pub fn expected_categories(&self, ancestors: &BTreeSet<String>) -> BTreeSet<Title> {
        ancestors
            .iter()
            .filter_map(|node| self.map.get(node))
            .flat_map(|targets| targets.as_slice().iter().cloned())
            .collect()
    }

    /// Supporting and contradicting categories reached from `candidate`.
    ///
    /// `expected` is the entity's projection from
    /// [`expected_categories`](Self::expected_categories), computed once per
    /// entity. With an empty projection nothing can support the candidate.
    pub fn validate(
        &self,
        candidate: &str,
        expected: &BTreeSet<Title>,
        wiki: &WikiGraph,
        max_depth: usize,
    ) -> Result<CategoryValidation> {
        let reached = wiki.reachable_ancestor_categories(candidate, max_depth)?;

        let supporting = reached.reached.intersection(expected).cloned().collect();
        let contradicting = reached
            .reached
            .iter()
            .filter(|c| self.all_targets.contains(*c) && !expected.contains(*c))
            .cloned()
            .collect();

        Ok(CategoryValidation {
            supporting,
            contradicting,
            truncated: reached.truncated,
        })
    }
}
