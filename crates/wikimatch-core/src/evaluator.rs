//! # Match Evaluation
//!
//! Scores produced matches against manually curated ground truth.

use crate::{EntityId, Title};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Manually curated reference matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundTruth {
    /// Acceptable titles per entity.
    pub matches: BTreeMap<EntityId, Vec<Title>>,
    /// Entities that have no Wikipedia article.
    pub without_matches: BTreeSet<EntityId>,
}

/// Precision summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationReport {
    pub true_positives: usize,
    /// Entities that were both produced and covered by the ground truth.
    pub positives: usize,
    /// Unexpected titles per wrongly matched entity.
    pub false_positives: BTreeMap<EntityId, BTreeSet<Title>>,
}

impl EvaluationReport {
    /// Precision as a whole percentage, rounded down. `None` when nothing
    /// was evaluated.
    #[must_use]
    pub fn precision_percent(&self) -> Option<u8> {
        if self.positives == 0 {
            return None;
        }
        let percent = self.true_positives.saturating_mul(100) / self.positives;
        Some(percent.min(100) as u8)
    }
}

/// Compare `produced` against `truth`.
///
/// An entity counts only when it was produced and the ground truth knows
/// it. It is a true positive when every produced title is acceptable. An
/// entity marked as having no article is always a false positive.
#[must_use]
pub fn evaluate(
    produced: &BTreeMap<EntityId, BTreeSet<Title>>,
    truth: &GroundTruth,
) -> EvaluationReport {
    let mut report = EvaluationReport::default();

    for (entity, titles) in produced {
        if let Some(acceptable) = truth.matches.get(entity) {
            report.positives += 1;
            let unexpected: BTreeSet<Title> = titles
                .iter()
                .filter(|t| !acceptable.contains(*t))
                .cloned()
                .collect();
            if unexpected.is_empty() {
                report.true_positives += 1;
            } else {
                report.false_positives.insert(*entity, unexpected);
            }
        } else if truth.without_matches.contains(entity) {
            report.positives += 1;
            report.false_positives.insert(*entity, titles.clone());
        }
    }

    tracing::info!(
        true_positives = report.true_positives,
        positives = report.positives,
        false_positives = report.false_positives.len(),
        "evaluated matches"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(items: &[&str]) -> BTreeSet<Title> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn truth() -> GroundTruth {
        GroundTruth {
            matches: BTreeMap::from([
                (EntityId(1), vec!["A".to_string(), "B".to_string()]),
                (EntityId(2), vec!["Dog".to_string()]),
            ]),
            without_matches: BTreeSet::from([EntityId(3)]),
        }
    }

    #[test]
    fn extra_title_is_a_false_positive() {
        let produced = BTreeMap::from([(EntityId(1), titles(&["A", "B", "C"]))]);

        let report = evaluate(&produced, &truth());

        assert_eq!(report.true_positives, 0);
        assert_eq!(report.positives, 1);
        assert_eq!(report.false_positives[&EntityId(1)], titles(&["C"]));
    }

    #[test]
    fn subset_of_acceptable_titles_is_correct() {
        let produced = BTreeMap::from([
            (EntityId(1), titles(&["B"])),
            (EntityId(2), titles(&["Dog"])),
        ]);

        let report = evaluate(&produced, &truth());

        assert_eq!(report.true_positives, 2);
        assert!(report.false_positives.is_empty());
        assert_eq!(report.precision_percent(), Some(100));
    }

    #[test]
    fn no_article_entity_is_wrong_whatever_was_produced() {
        let produced = BTreeMap::from([
            (EntityId(2), titles(&["Dog"])),
            (EntityId(3), titles(&["Cat", "Kitten"])),
        ]);

        let report = evaluate(&produced, &truth());

        assert_eq!(report.positives, 2);
        assert_eq!(report.false_positives[&EntityId(3)], titles(&["Cat", "Kitten"]));
        assert_eq!(report.precision_percent(), Some(50));
    }

    #[test]
    fn entities_outside_the_truth_are_skipped() {
        let produced = BTreeMap::from([(EntityId(99), titles(&["Anything"]))]);

        let report = evaluate(&produced, &truth());

        assert_eq!(report.positives, 0);
        assert_eq!(report.precision_percent(), None);
    }

    #[test]
    fn precision_rounds_down() {
        let report = EvaluationReport {
            true_positives: 2,
            positives: 3,
            false_positives: BTreeMap::new(),
        };
        assert_eq!(report.precision_percent(), Some(66));
    }
}
