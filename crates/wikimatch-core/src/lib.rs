//! # wikimatch-core
//!
//! Category-graph reachability and the Wikipedia entity-matching pipeline
//! that uses it.
//!
//! Two reachability strategies live here:
//! - [`closure::AncestorClosure`]: unbounded ancestor sets for a whole graph,
//!   computed once (SCC condensation) and kept as a lookup table.
//! - [`reach`]: depth-bounded reachability from one source, computed per
//!   query against a graph too large to close completely.
//!
//! The matching pipeline ([`orchestrator::MatchOrchestrator`]) combines them
//! with title normalization ([`titles`]), a discard filter ([`discard`]) and
//! cross-graph category validation ([`validator`]).
//!
//! Everything in this crate is synchronous and deterministic. All maps and
//! sets are `BTreeMap`/`BTreeSet`, and nothing is mutated once built.

pub mod closure;
pub mod discard;
pub mod error;
pub mod evaluator;
pub mod formats;
pub mod graph;
pub mod manual;
pub mod orchestrator;
pub mod reach;
pub mod redirect;
pub mod titles;
pub mod validator;
pub mod wiki;

#[cfg(test)]
mod log_capture;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use closure::{AncestorClosure, AncestorSet};
pub use discard::{CategoryKeywordFilter, DiscardCategorySet};
pub use error::{MatchError, Result};
pub use evaluator::{EvaluationReport, GroundTruth, evaluate};
pub use graph::{DirectedGraph, DuplicatePolicy, NodeRecord, ParentGraph, ParentRecord};
pub use manual::{
    EntityCatalog, EntityRecord, ManualMatches, MatchComparison, MatchSet, MergedMatches,
    compare_matches, merge_manual_files, merge_matches,
};
pub use orchestrator::{EntityOutcome, EntityQuery, MatchDecision, MatchOrchestrator, MatchReport};
pub use reach::{ReachabilityResult, reach, reach_from};
pub use redirect::{RedirectEntry, RedirectGraph, RedirectResolver, resolve_redirect};
pub use titles::{Phrases, ProcessedTitleIndex, match_titles, normalize_title};
pub use validator::{CategoryTargets, CategoryValidation, CategoryValidator};
pub use wiki::WikiGraph;

/// A Wikipedia page title or category name.
pub type Title = String;

/// Identifier of a queried entity (an ImageNet class id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
