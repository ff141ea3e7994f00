//! # Manual Matches and Match Sets
//!
//! The entity catalog, hand-curated match files, and operations over whole
//! match sets: merging automatic with manual results, diffing two sets and
//! concatenating manual files.

use crate::error::{MatchError, Result};
use crate::evaluator::GroundTruth;
use crate::formats::{ManualEntry, parse_manual_line};
use crate::orchestrator::EntityQuery;
use crate::titles::Phrases;
use crate::{EntityId, Title};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Entity -> matched titles.
pub type MatchSet = BTreeMap<EntityId, BTreeSet<Title>>;

// =============================================================================
// ENTITY CATALOG
// =============================================================================

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: EntityId,
    pub source_node: String,
    pub phrases: Phrases,
}

/// Every known entity, indexed both ways.
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    by_id: BTreeMap<EntityId, EntityRecord>,
    by_source_node: BTreeMap<String, EntityId>,
}

impl EntityCatalog {
    /// Build the catalog. Ids and source nodes must both be unique.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = EntityRecord>,
    {
        let mut catalog = Self::default();
        for record in records {
            if catalog.by_id.contains_key(&record.id) {
                return Err(MatchError::data_integrity(format!(
                    "entity {} listed twice",
                    record.id
                )));
            }
            if let Some(other) = catalog.by_source_node.get(&record.source_node) {
                return Err(MatchError::data_integrity(format!(
                    "source node {} belongs to entities {} and {}",
                    record.source_node, other, record.id
                )));
            }
            catalog
                .by_source_node
                .insert(record.source_node.clone(), record.id);
            catalog.by_id.insert(record.id, record);
        }
        Ok(catalog)
    }

    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.by_id.get(&id)
    }

    /// Entity owning `source_node`.
    #[must_use]
    pub fn entity_for(&self, source_node: &str) -> Option<EntityId> {
        self.by_source_node.get(source_node).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.by_id.keys().copied()
    }

    /// Matching queries for the given entities, or for all when `only` is
    /// `None`. Unknown ids are an integrity error.
    pub fn queries(&self, only: Option<&BTreeSet<EntityId>>) -> Result<Vec<EntityQuery>> {
        let ids: Vec<EntityId> = match only {
            Some(ids) => ids.iter().copied().collect(),
            None => self.ids().collect(),
        };
        ids.into_iter()
            .map(|id| {
                let record = self
                    .get(id)
                    .ok_or_else(|| MatchError::data_integrity(format!("unknown entity {id}")))?;
                Ok(EntityQuery {
                    entity: id,
                    source_node: record.source_node.clone(),
                    phrases: record.phrases.clone(),
                })
            })
            .collect()
    }
}

// =============================================================================
// MANUAL MATCH FILES
// =============================================================================

/// Hand-curated matches, keyed by entity.
pub type ManualMatches = GroundTruth;

impl GroundTruth {
    /// Parse a manual match file, resolving source nodes through `catalog`.
    ///
    /// A source node missing from the catalog, or listed twice, is an
    /// integrity error.
    pub fn parse(text: &str, catalog: &EntityCatalog) -> Result<Self> {
        let mut manual = Self::default();

        for (i, raw) in text.lines().enumerate() {
            let Some(line) = parse_manual_line(raw) else {
                continue;
            };
            let line_no = i + 1;
            if line.source_node.is_empty() {
                return Err(MatchError::parse(line_no, "missing source node"));
            }

            let entity = catalog.entity_for(&line.source_node).ok_or_else(|| {
                MatchError::data_integrity(format!(
                    "line {line_no}: unknown source node {}",
                    line.source_node
                ))
            })?;
            if manual.matches.contains_key(&entity) || manual.without_matches.contains(&entity) {
                return Err(MatchError::data_integrity(format!(
                    "line {line_no}: {} present multiple times in manual matches",
                    line.source_node
                )));
            }

            match line.entry {
                ManualEntry::NoArticle => {
                    manual.without_matches.insert(entity);
                }
                ManualEntry::Titles(titles) => {
                    manual.matches.insert(entity, titles);
                }
            }
        }

        tracing::info!(
            matches = manual.matches.len(),
            without = manual.without_matches.len(),
            "parsed manual matches"
        );
        Ok(manual)
    }
}

/// Outcome of [`merge_matches`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergedMatches {
    pub matches: MatchSet,
    /// Expected entities with neither a match nor a "no article" mark.
    pub missing: BTreeSet<EntityId>,
}

/// Overlay manual matches on automatic ones.
///
/// Manual titles replace automatic ones and a manual "no article" removes
/// the automatic match. When `expected` is given, every expected entity
/// must end up matched, marked "no article" or counted as missing, and the
/// three counts must add up to the expected total.
pub fn merge_matches(
    automatic: MatchSet,
    manual: &ManualMatches,
    catalog: &EntityCatalog,
    expected: Option<&BTreeSet<EntityId>>,
) -> Result<MergedMatches> {
    let mut matches = automatic;

    for (entity, titles) in &manual.matches {
        let titles: BTreeSet<Title> = titles.iter().cloned().collect();
        if let Some(previous) = matches.get(entity)
            && *previous != titles
        {
            tracing::warn!(
                entity = %entity,
                from = ?previous,
                to = ?titles,
                "overwriting automatic match"
            );
        }
        matches.insert(*entity, titles);
    }

    for entity in &manual.without_matches {
        if let Some(previous) = matches.remove(entity) {
            tracing::warn!(entity = %entity, from = ?previous, "removing match marked as no article");
        }
    }

    tracing::info!(matches = matches.len(), "merged matches");

    let mut missing = BTreeSet::new();
    if let Some(expected) = expected {
        for entity in expected {
            if !matches.contains_key(entity) && !manual.without_matches.contains(entity) {
                let source_node = catalog.get(*entity).map(|r| r.source_node.as_str());
                tracing::warn!(
                    entity = %entity,
                    source_node = ?source_node,
                    "no match and not marked as having no article"
                );
                missing.insert(*entity);
            }
        }

        let accounted = matches.len() + missing.len() + manual.without_matches.len();
        if expected.len() != accounted {
            return Err(MatchError::data_integrity(format!(
                "expected {} entities, got {} matched + {} missing + {} without article",
                expected.len(),
                matches.len(),
                missing.len(),
                manual.without_matches.len()
            )));
        }
    }

    Ok(MergedMatches { matches, missing })
}

// =============================================================================
// MATCH SET COMPARISON
// =============================================================================

/// Difference between two match sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchComparison {
    /// Entities in both with different titles, as `(a, b)`.
    pub different: BTreeMap<EntityId, (BTreeSet<Title>, BTreeSet<Title>)>,
    pub only_a: MatchSet,
    pub only_b: MatchSet,
}

impl MatchComparison {
    /// Whether both sets are identical.
    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.different.is_empty() && self.only_a.is_empty() && self.only_b.is_empty()
    }
}

/// Compare two match sets entity by entity.
#[must_use]
pub fn compare_matches(a: &MatchSet, b: &MatchSet) -> MatchComparison {
    let mut comparison = MatchComparison::default();

    for (entity, a_titles) in a {
        match b.get(entity) {
            Some(b_titles) if b_titles != a_titles => {
                comparison
                    .different
                    .insert(*entity, (a_titles.clone(), b_titles.clone()));
            }
            Some(_) => {}
            None => {
                comparison.only_a.insert(*entity, a_titles.clone());
            }
        }
    }
    for (entity, b_titles) in b {
        if !a.contains_key(entity) {
            comparison.only_b.insert(*entity, b_titles.clone());
        }
    }

    comparison
}

/// Concatenate manual match files.
///
/// Content lines are kept verbatim, comments included; blank and
/// comment-only lines are dropped. A source node appearing on more than
/// one line, in any file, is an integrity error.
pub fn merge_manual_files<'a, I>(files: I) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = BTreeSet::new();
    let mut out = String::new();

    for text in files {
        for raw in text.lines() {
            let Some(line) = parse_manual_line(raw) else {
                continue;
            };
            if !seen.insert(line.source_node.clone()) {
                return Err(MatchError::data_integrity(format!(
                    "{} present multiple times",
                    line.source_node
                )));
            }
            out.push_str(raw);
            out.push('\n');
        }
    }

    tracing::info!(lines = seen.len(), "merged manual match files");
    Ok(out)
}
