//! # Redirect Resolution
//!
//! Follows redirect chains to the page they finally land on.

use crate::Title;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One redirect as extracted from the dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectEntry {
    #[serde(default)]
    pub from_id: Option<u64>,
    pub redirect_to_title: Title,
}

impl RedirectEntry {
    /// Create a redirect to `target` with no page id.
    pub fn to(target: impl Into<Title>) -> Self {
        Self {
            from_id: None,
            redirect_to_title: target.into(),
        }
    }
}

/// Redirect source title -> entry.
pub type RedirectGraph = BTreeMap<Title, RedirectEntry>;

/// Resolves redirect titles against a fixed canonical title set.
#[derive(Debug, Clone, Copy)]
pub struct RedirectResolver<'a> {
    canonical: &'a BTreeSet<Title>,
    redirects: &'a RedirectGraph,
}

impl<'a> RedirectResolver<'a> {
    #[must_use]
    pub fn new(canonical: &'a BTreeSet<Title>, redirects: &'a RedirectGraph) -> Self {
        Self {
            canonical,
            redirects,
        }
    }

    /// Final target of `from_title`.
    ///
    /// Hops while the current title is not canonical and has a redirect
    /// entry. A canonical title stops the chain even if it also redirects.
    /// The result may be a dangling title that is neither canonical nor a
    /// redirect (special pages). On a loop the input title is returned.
    #[must_use]
    pub fn resolve(&self, from_title: &str) -> Title {
        let mut visited: BTreeSet<&str> = BTreeSet::from([from_title]);
        let mut current = from_title;

        while !self.canonical.contains(current) {
            let Some(entry) = self.redirects.get(current) else {
                break;
            };
            let next = entry.redirect_to_title.as_str();
            if !visited.insert(next) {
                tracing::warn!(from = from_title, at = next, "found a redirect loop");
                return from_title.to_string();
            }
            current = next;
        }

        current.to_string()
    }
}

/// Free-function form of [`RedirectResolver::resolve`].
#[must_use]
pub fn resolve_redirect(
    from_title: &str,
    canonical: &BTreeSet<Title>,
    redirects: &RedirectGraph,
) -> Title {
    RedirectResolver::new(canonical, redirects).resolve(from_title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_capture::capture_warnings;

    fn canonical(titles: &[&str]) -> BTreeSet<Title> {
        titles.iter().map(|s| s.to_string()).collect()
    }

    fn redirects(pairs: &[(&str, &str)]) -> RedirectGraph {
        pairs
            .iter()
            .map(|(from, to)| (from.to_string(), RedirectEntry::to(*to)))
            .collect()
    }

    #[test]
    fn single_hop_to_canonical() {
        let pages = canonical(&["Dog"]);
        let r = redirects(&[("Doggy", "Dog")]);
        assert_eq!(resolve_redirect("Doggy", &pages, &r), "Dog");
    }

    #[test]
    fn follows_chain_of_redirects() {
        let pages = canonical(&["Dog"]);
        let r = redirects(&[("Pupper", "Doggy"), ("Doggy", "Dog")]);
        assert_eq!(resolve_redirect("Pupper", &pages, &r), "Dog");
    }

    #[test]
    fn canonical_membership_wins() {
        let pages = canonical(&["Dog", "Hound"]);
        let r = redirects(&[("Doggy", "Hound"), ("Hound", "Dog")]);
        assert_eq!(resolve_redirect("Doggy", &pages, &r), "Hound");
    }

    #[test]
    fn canonical_input_is_returned_unchanged() {
        let pages = canonical(&["Dog"]);
        let r = redirects(&[("Dog", "Wolf")]);
        assert_eq!(resolve_redirect("Dog", &pages, &r), "Dog");
    }

    #[test]
    fn dangling_target_is_valid() {
        let pages = canonical(&["Dog"]);
        let r = redirects(&[("Help:Dog", "Special:Dog")]);
        assert_eq!(resolve_redirect("Help:Dog", &pages, &r), "Special:Dog");
    }

    #[test]
    fn two_cycle_falls_back_to_input() {
        let pages = canonical(&[]);
        let r = redirects(&[("A", "B"), ("B", "A")]);
        assert_eq!(resolve_redirect("A", &pages, &r), "A");
        assert_eq!(resolve_redirect("B", &pages, &r), "B");
    }

    #[test]
    fn two_cycle_logs_a_loop_warning() {
        let pages = canonical(&[]);
        let r = redirects(&[("A", "B"), ("B", "A")]);

        let (resolved, logs) = capture_warnings(|| resolve_redirect("A", &pages, &r));

        assert_eq!(resolved, "A");
        assert!(logs.contains("found a redirect loop"), "logs: {logs}");
    }

    #[test]
    fn acyclic_chain_logs_nothing() {
        let pages = canonical(&["C"]);
        let r = redirects(&[("A", "B"), ("B", "C")]);

        let (resolved, logs) = capture_warnings(|| resolve_redirect("A", &pages, &r));

        assert_eq!(resolved, "C");
        assert!(logs.is_empty(), "logs: {logs}");
    }

    #[test]
    fn loop_further_down_the_chain_falls_back_to_input() {
        let pages = canonical(&[]);
        let r = redirects(&[("Start", "X"), ("X", "Y"), ("Y", "Z"), ("Z", "X")]);
        assert_eq!(resolve_redirect("Start", &pages, &r), "Start");
    }

    #[test]
    fn self_redirect_falls_back_to_input() {
        let pages = canonical(&[]);
        let r = redirects(&[("Loop", "Loop")]);
        assert_eq!(resolve_redirect("Loop", &pages, &r), "Loop");
    }
}
