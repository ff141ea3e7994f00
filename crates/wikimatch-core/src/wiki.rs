//! # Wikipedia Graph
//!
//! Pages point at their categories; categories point at their parent
//! categories. Reachability from a page starts at its own categories (hop 1)
//! and continues through the category graph.

use crate::Title;
use crate::error::{MatchError, Result};
use crate::graph::{DirectedGraph, DuplicatePolicy, NodeRecord, ParentGraph};
use crate::reach::{self, ReachabilityResult};
use std::collections::BTreeSet;

/// The page and category graphs of one Wikipedia dump.
#[derive(Debug, Clone, Default)]
pub struct WikiGraph {
    page_categories: DirectedGraph<Title>,
    category_parents: DirectedGraph<Title>,
}

impl WikiGraph {
    #[must_use]
    pub fn new(
        page_categories: DirectedGraph<Title>,
        category_parents: DirectedGraph<Title>,
    ) -> Self {
        Self {
            page_categories,
            category_parents,
        }
    }

    /// Build both graphs from loader records.
    ///
    /// Page titles are canonical, so any repeated page is an error. A
    /// category may be repeated only with identical content.
    pub fn from_records(
        pages: Vec<NodeRecord<Title>>,
        categories: Vec<NodeRecord<Title>>,
    ) -> Result<Self> {
        let page_categories = DirectedGraph::from_records(pages, DuplicatePolicy::Reject)?;
        let category_parents =
            DirectedGraph::from_records(categories, DuplicatePolicy::AllowIdentical)?;

        tracing::info!(
            pages = page_categories.node_count(),
            categories = category_parents.node_count(),
            "built wiki graph"
        );
        Ok(Self::new(page_categories, category_parents))
    }

    /// Every page title; the canonical title set.
    #[must_use]
    pub fn canonical_titles(&self) -> BTreeSet<Title> {
        self.page_categories.keys().cloned().collect()
    }

    /// Names of every category that has a definition.
    pub fn category_names(&self) -> impl Iterator<Item = &Title> {
        self.category_parents.keys()
    }

    /// The page graph.
    #[must_use]
    pub fn pages(&self) -> &DirectedGraph<Title> {
        &self.page_categories
    }

    /// The category graph.
    #[must_use]
    pub fn categories(&self) -> &DirectedGraph<Title> {
        &self.category_parents
    }

    /// Page id from the dump.
    #[must_use]
    pub fn page_id(&self, title: &str) -> Option<u64> {
        self.page_categories.node_id(&title.to_string())
    }

    /// Direct categories of a page. A missing page is logged and treated
    /// as having none.
    #[must_use]
    pub fn page_categories(&self, title: &str) -> BTreeSet<Title> {
        match self.page_categories.parents(&title.to_string()) {
            Some(categories) => categories.clone(),
            None => {
                tracing::error!(title, "page not in page categories, returning none");
                BTreeSet::new()
            }
        }
    }

    /// Categories within `max_depth` hops of a page.
    ///
    /// Hop 1 is the page's own categories; the page title itself is not
    /// part of the result.
    pub fn reachable_ancestor_categories(
        &self,
        title: &str,
        max_depth: usize,
    ) -> Result<ReachabilityResult<Title>> {
        if max_depth == 0 {
            return Err(MatchError::InvalidDepth { depth: max_depth });
        }
        let direct = self.page_categories(title);
        Ok(reach::walk(
            &self.category_parents,
            direct,
            max_depth.saturating_sub(1),
        ))
    }
}
