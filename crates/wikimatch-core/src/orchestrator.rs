//! # Match Orchestrator
//!
//! Runs one entity through the pipeline:
//!
//! ```text
//! CandidatesGathered -> Filtered -> Validated -> Decided
//! ```
//!
//! 1. Gather candidate titles from the entity's phrases.
//! 2. Drop candidates whose nearby categories hit a discard category.
//! 3. Validate each survivor against the entity's expected class.
//! 4. Match only when exactly one survivor has supporting evidence.
//!
//! All inputs are shared read-only. A batch never aborts on a single
//! entity: failures are logged and the entity is reported unmatched with
//! the candidates it had.

use crate::closure::AncestorSet;
use crate::discard::DiscardCategorySet;
use crate::error::Result;
use crate::titles::{Phrases, ProcessedTitleIndex, match_titles};
use crate::validator::{CategoryValidation, CategoryValidator};
use crate::wiki::WikiGraph;
use crate::{EntityId, Title};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Default reachability bound for the discard check.
pub const DEFAULT_DISCARD_MAX_DEPTH: usize = 3;

/// Default reachability bound for category validation.
pub const DEFAULT_MATCH_MAX_DEPTH: usize = 10;

/// One entity to match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityQuery {
    pub entity: EntityId,
    /// The entity's node in the source taxonomy.
    pub source_node: String,
    pub phrases: Phrases,
}

/// Final decision for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchDecision {
    Matched { titles: BTreeSet<Title> },
    Unmatched { candidate_titles: BTreeSet<Title> },
}

impl MatchDecision {
    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

/// Decision plus the evidence it was made from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityOutcome {
    pub entity: EntityId,
    /// Every title the phrases matched.
    pub candidates: BTreeSet<Title>,
    /// Candidates removed by the discard filter.
    pub discarded: BTreeSet<Title>,
    /// Validation evidence per surviving candidate.
    pub validations: BTreeMap<Title, CategoryValidation>,
    pub decision: MatchDecision,
}

/// Result of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    pub matched: BTreeMap<EntityId, BTreeSet<Title>>,
    pub unmatched: BTreeMap<EntityId, BTreeSet<Title>>,
}

impl MatchReport {
    /// Store one decision. An entity is kept in exactly one of the two maps;
    /// when it is decided again the later decision replaces the earlier one.
    fn record(&mut self, entity: EntityId, decision: MatchDecision) {
        let replaced = match decision {
            MatchDecision::Matched { titles } => {
                let was_unmatched = self.unmatched.remove(&entity).is_some();
                self.matched.insert(entity, titles).is_some() || was_unmatched
            }
            MatchDecision::Unmatched { candidate_titles } => {
                let was_matched = self.matched.remove(&entity).is_some();
                self.unmatched.insert(entity, candidate_titles).is_some() || was_matched
            }
        };
        if replaced {
            tracing::warn!(%entity, "entity queried more than once, keeping the last decision");
        }
    }

    /// Total number of entities decided.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty() && self.unmatched.is_empty()
    }
}

/// The matching pipeline over one fixed set of inputs.
#[derive(Debug)]
pub struct MatchOrchestrator<'a> {
    index: &'a ProcessedTitleIndex,
    wiki: &'a WikiGraph,
    discard: &'a DiscardCategorySet,
    validator: &'a CategoryValidator,
    source_ancestors: &'a AncestorSet<String>,
    discard_max_depth: usize,
    match_max_depth: usize,
}

impl<'a> MatchOrchestrator<'a> {
    /// Create an orchestrator with the default depths.
    #[must_use]
    pub fn new(
        index: &'a ProcessedTitleIndex,
        wiki: &'a WikiGraph,
        discard: &'a DiscardCategorySet,
        validator: &'a CategoryValidator,
        source_ancestors: &'a AncestorSet<String>,
    ) -> Self {
        Self {
            index,
            wiki,
            discard,
            validator,
            source_ancestors,
            discard_max_depth: DEFAULT_DISCARD_MAX_DEPTH,
            match_max_depth: DEFAULT_MATCH_MAX_DEPTH,
        }
    }

    /// Override both reachability bounds.
    #[must_use]
    pub fn with_depths(mut self, discard_max_depth: usize, match_max_depth: usize) -> Self {
        self.discard_max_depth = discard_max_depth;
        self.match_max_depth = match_max_depth;
        self
    }

    /// Run the pipeline for one entity and return the full evidence.
    pub fn decide(&self, query: &EntityQuery) -> Result<EntityOutcome> {
        let candidates = self.gather(query);
        self.decide_candidates(query, &candidates)
    }

    fn gather(&self, query: &EntityQuery) -> BTreeSet<Title> {
        let candidates = match_titles(&query.entity.to_string(), &query.phrases, self.index);
        tracing::debug!(entity = %query.entity, count = candidates.len(), "candidates gathered");
        candidates
    }

    /// Wikipedia categories the entity's source ancestors map to. Computed
    /// once per entity so a gap in the map is reported once, candidates or
    /// not.
    fn expected_categories(&self, query: &EntityQuery) -> BTreeSet<Title> {
        let Some(ancestors) = self.source_ancestors.get(&query.source_node) else {
            tracing::warn!(
                entity = %query.entity,
                source_node = query.source_node.as_str(),
                "source node has no ancestor entry"
            );
            return BTreeSet::new();
        };

        let expected = self.validator.expected_categories(ancestors);
        if expected.is_empty() {
            tracing::warn!(
                entity = %query.entity,
                ancestors = ?ancestors,
                "no wiki categories for entity ancestors"
            );
        }
        expected
    }

    fn decide_candidates(
        &self,
        query: &EntityQuery,
        candidates: &BTreeSet<Title>,
    ) -> Result<EntityOutcome> {
        let expected = self.expected_categories(query);

        let survivors =
            self.discard
                .filter_titles(candidates, self.wiki, self.discard_max_depth)?;
        let discarded: BTreeSet<Title> = candidates.difference(&survivors).cloned().collect();
        tracing::debug!(
            entity = %query.entity,
            kept = survivors.len(),
            discarded = discarded.len(),
            "candidates filtered"
        );

        let mut validations = BTreeMap::new();
        for title in &survivors {
            let validation =
                self.validator
                    .validate(title, &expected, self.wiki, self.match_max_depth)?;
            tracing::debug!(
                entity = %query.entity,
                title = title.as_str(),
                supporting = ?validation.supporting,
                contradicting = ?validation.contradicting,
                "candidate validated"
            );
            validations.insert(title.clone(), validation);
        }

        let supported: BTreeSet<Title> = validations
            .iter()
            .filter(|(_, v)| v.is_supported())
            .map(|(title, _)| title.clone())
            .collect();

        let decision = if supported.len() == 1 {
            MatchDecision::Matched { titles: supported }
        } else {
            if !survivors.is_empty() {
                tracing::info!(
                    entity = %query.entity,
                    supported = supported.len(),
                    candidates = ?survivors,
                    "no unique supported candidate"
                );
            }
            MatchDecision::Unmatched {
                candidate_titles: survivors,
            }
        };
        tracing::debug!(entity = %query.entity, matched = decision.is_matched(), "decided");

        Ok(EntityOutcome {
            entity: query.entity,
            candidates: candidates.clone(),
            discarded,
            validations,
            decision,
        })
    }

    /// Decision for one entity. On an error the entity is reported
    /// unmatched with every candidate gathered before the failure.
    fn decide_or_unmatched(&self, query: &EntityQuery) -> MatchDecision {
        let candidates = self.gather(query);
        match self.decide_candidates(query, &candidates) {
            Ok(outcome) => outcome.decision,
            Err(e) => {
                tracing::error!(
                    entity = %query.entity,
                    error = %e,
                    candidates = ?candidates,
                    "matching failed"
                );
                MatchDecision::Unmatched {
                    candidate_titles: candidates,
                }
            }
        }
    }

    /// Decide every query. The report is keyed by entity, so its content
    /// does not depend on evaluation order.
    #[must_use]
    pub fn run(&self, queries: &[EntityQuery]) -> MatchReport {
        let decisions = self.decide_all(queries);

        let mut report = MatchReport::default();
        for (entity, decision) in decisions {
            report.record(entity, decision);
        }
        tracing::info!(
            total = queries.len(),
            matched = report.matched.len(),
            unmatched = report.unmatched.len(),
            "matching finished"
        );
        report
    }

    #[cfg(not(feature = "parallel"))]
    fn decide_all(&self, queries: &[EntityQuery]) -> Vec<(EntityId, MatchDecision)> {
        queries
            .iter()
            .map(|q| (q.entity, self.decide_or_unmatched(q)))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn decide_all(&self, queries: &[EntityQuery]) -> Vec<(EntityId, MatchDecision)> {
        use rayon::prelude::*;

        queries
            .par_iter()
            .map(|q| (q.entity, self.decide_or_unmatched(q)))
            .collect()
    }
}
