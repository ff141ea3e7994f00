//! Integration tests for wikimatch CLI commands.
//!
//! Uses tempfile for testing file-based operations.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wikimatch::cli::{
    CliError, MatchInputs, cmd_ancestors, cmd_compare, cmd_evaluate, cmd_match, cmd_merge_csv,
    load_source_ancestors,
};
use wikimatch::config::MatchingConfig;
use wikimatch_core::{EntityId, MatchSet};

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Create a temporary directory for tests.
fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// WordNet-style edges: beagle -> hound -> dog -> animal, oak -> tree -> plant.
fn create_is_a(dir: &TempDir) -> PathBuf {
    write(
        dir,
        "is_a.txt",
        "n_hound n_beagle\nn_dog n_hound\nn_animal n_dog\nn_tree n_oak\nn_plant n_tree\n",
    )
}

fn create_pages(dir: &TempDir) -> PathBuf {
    let content = r#"{
        "redirects": {
            "Beagles": {"from_id": 90, "redirect_to_title": "Beagle"}
        },
        "page_categories": [
            {"node": "Beagle", "id": 1, "categories": ["Scent hounds"]},
            {"node": "Beagle (film)", "id": 2, "categories": ["2003 films", "Scent hounds"]},
            {"node": "Oak", "id": 3, "categories": ["Quercus"]},
            {"node": "Oak (ship)", "id": 4, "categories": ["Quercus"]},
            {"node": "Goldfish", "id": 5, "categories": ["Carassius"]}
        ],
        "category_parents": [
            {"node": "Scent hounds", "categories": ["Dogs"]},
            {"node": "Quercus", "categories": ["Trees"]},
            {"node": "2003 films", "categories": ["Films"]}
        ]
    }"#;
    write(dir, "pages.json", content)
}

fn create_catalog(dir: &TempDir) -> PathBuf {
    let content = r#"[
        {"id": 1, "source_node": "n_beagle", "phrases": "beagle"},
        {"id": 2, "source_node": "n_oak", "phrases": ["oak", "oak tree"]},
        {"id": 3, "source_node": "n_unicorn", "phrases": "unicorn"}
    ]"#;
    write(dir, "catalog.json", content)
}

fn create_inputs(dir: &TempDir) -> MatchInputs {
    MatchInputs {
        pages: create_pages(dir),
        catalog: create_catalog(dir),
        is_a: create_is_a(dir),
        category_map: write(
            dir,
            "category_map.json",
            r#"{"n_dog": "Dogs", "n_plant": ["Trees", "Plants"]}"#,
        ),
        discard: write(dir, "discard.json", r#"{"DISCARD": ["Films"]}"#),
        split: None,
    }
}

fn read_matches(path: &Path) -> MatchSet {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn titles(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// ANCESTORS COMMAND TESTS
// =============================================================================

#[test]
fn test_ancestors_json_output() {
    let temp = create_temp_dir();
    let is_a = create_is_a(&temp);
    let output = temp.path().join("ancestors.json");

    cmd_ancestors(&is_a, &output, "json").unwrap();

    let table: BTreeMap<String, BTreeSet<String>> =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(
        table["n_beagle"],
        titles(&["n_beagle", "n_hound", "n_dog", "n_animal"])
    );
    assert_eq!(table["n_animal"], titles(&["n_animal"]));
}

#[test]
fn test_ancestors_snapshot_loads_back() {
    let temp = create_temp_dir();
    let is_a = create_is_a(&temp);
    let output = temp.path().join("ancestors.bin");

    cmd_ancestors(&is_a, &output, "snapshot").unwrap();

    let from_snapshot = load_source_ancestors(&output).unwrap();
    let from_edges = load_source_ancestors(&is_a).unwrap();
    assert_eq!(from_snapshot.to_map(), from_edges.to_map());
}

#[test]
fn test_ancestors_unknown_format() {
    let temp = create_temp_dir();
    let is_a = create_is_a(&temp);

    let result = cmd_ancestors(&is_a, &temp.path().join("out"), "yaml");
    assert!(matches!(result, Err(CliError::Config { .. })));
}

#[test]
fn test_ancestors_malformed_edge_list() {
    let temp = create_temp_dir();
    let is_a = write(&temp, "bad.txt", "n_a n_b\nonly_one\n");

    let result = cmd_ancestors(&is_a, &temp.path().join("out"), "json");
    assert!(matches!(result, Err(CliError::Core(_))));
}

// =============================================================================
// MATCH COMMAND TESTS
// =============================================================================

#[test]
fn test_match_writes_both_outputs() {
    let temp = create_temp_dir();
    let inputs = create_inputs(&temp);
    let out = temp.path().join("out");

    cmd_match(&inputs, &MatchingConfig::default(), &out, "test").unwrap();

    let matched = read_matches(&out.join("matches_test.json"));
    let unmatched = read_matches(&out.join("unmatched_test.json"));

    assert_eq!(matched[&EntityId(1)], titles(&["Beagle"]));
    assert_eq!(unmatched[&EntityId(2)], titles(&["Oak", "Oak (ship)"]));
    assert!(unmatched[&EntityId(3)].is_empty());
    assert_eq!(matched.len() + unmatched.len(), 3);
}

#[test]
fn test_match_respects_split() {
    let temp = create_temp_dir();
    let mut inputs = create_inputs(&temp);
    inputs.split = Some(write(&temp, "split.json", "[1]"));
    let out = temp.path().join("out");

    cmd_match(&inputs, &MatchingConfig::default(), &out, "split").unwrap();

    let matched = read_matches(&out.join("matches_split.json"));
    let unmatched = read_matches(&out.join("unmatched_split.json"));
    assert_eq!(matched.keys().copied().collect::<Vec<_>>(), vec![EntityId(1)]);
    assert!(unmatched.is_empty());
}

#[test]
fn test_match_shallow_depth_loses_evidence() {
    let temp = create_temp_dir();
    let inputs = create_inputs(&temp);
    let out = temp.path().join("out");
    let config = MatchingConfig {
        discard_max_depth: 1,
        match_max_depth: 1,
    };

    cmd_match(&inputs, &config, &out, "shallow").unwrap();

    let matched = read_matches(&out.join("matches_shallow.json"));
    assert!(matched.is_empty());
}

#[test]
fn test_match_rejects_duplicate_page() {
    let temp = create_temp_dir();
    let mut inputs = create_inputs(&temp);
    inputs.pages = write(
        &temp,
        "dup_pages.json",
        r#"{
            "page_categories": [
                {"node": "Beagle", "categories": ["Dogs"]},
                {"node": "Beagle", "categories": ["Dogs"]}
            ],
            "category_parents": []
        }"#,
    );

    let result = cmd_match(
        &inputs,
        &MatchingConfig::default(),
        &temp.path().join("out"),
        "dup",
    );
    assert!(matches!(result, Err(CliError::Core(e)) if e.is_integrity()));
}

#[test]
fn test_match_invalid_json() {
    let temp = create_temp_dir();
    let mut inputs = create_inputs(&temp);
    inputs.catalog = write(&temp, "bad.json", "not valid json");

    let result = cmd_match(
        &inputs,
        &MatchingConfig::default(),
        &temp.path().join("out"),
        "bad",
    );
    assert!(matches!(result, Err(CliError::Json(_))));
}

#[test]
fn test_match_rejects_zero_depth_config() {
    let temp = create_temp_dir();
    let inputs = create_inputs(&temp);
    let config = MatchingConfig {
        discard_max_depth: 0,
        match_max_depth: 10,
    };

    let result = cmd_match(&inputs, &config, &temp.path().join("out"), "zero");
    assert!(matches!(result, Err(CliError::Config { .. })));
}

// =============================================================================
// CONFIG LOADING TESTS
// =============================================================================

#[test]
fn test_config_file_and_overrides() {
    let temp = create_temp_dir();
    let path = write(&temp, "config.json", r#"{"match_max_depth": 5}"#);

    let config = MatchingConfig::load(Some(&path), &["discard_max_depth=2".to_string()]).unwrap();
    assert_eq!(config.match_max_depth, 5);
    assert_eq!(config.discard_max_depth, 2);
}

#[test]
fn test_config_file_unknown_key() {
    let temp = create_temp_dir();
    let path = write(&temp, "config.json", r#"{"depth": 5}"#);

    let result = MatchingConfig::load(Some(&path), &[]);
    assert!(matches!(result, Err(CliError::Config { .. })));
}

// =============================================================================
// EVALUATE COMMAND TESTS
// =============================================================================

#[test]
fn test_evaluate_text_and_json_modes() {
    let temp = create_temp_dir();
    let catalog = create_catalog(&temp);
    let matches = write(&temp, "matches.json", r#"{"1": ["Beagle"], "2": ["Oak (ship)"]}"#);
    let manual = write(
        &temp,
        "manual.csv",
        "# curated\nn_beagle, Beagle\nn_oak, Oak\nn_unicorn, _\n",
    );

    // Entity 3 was never produced, so only 1 and 2 are scored.
    let report = cmd_evaluate(&matches, &manual, &catalog, false).unwrap();
    assert_eq!(report.true_positives, 1);
    assert_eq!(report.positives, 2);
    assert_eq!(report.precision_percent(), Some(50));
    assert_eq!(report.false_positives[&EntityId(2)], titles(&["Oak (ship)"]));

    let json_report = cmd_evaluate(&matches, &manual, &catalog, true).unwrap();
    assert_eq!(json_report, report);
}

#[test]
fn test_evaluate_no_article_entity_is_false_positive() {
    let temp = create_temp_dir();
    let catalog = create_catalog(&temp);
    let matches = write(&temp, "matches.json", r#"{"1": ["Beagle"], "3": ["Unicorn (film)"]}"#);
    let manual = write(&temp, "manual.csv", "n_beagle, Beagle\nn_unicorn, _\n");

    let report = cmd_evaluate(&matches, &manual, &catalog, true).unwrap();
    assert_eq!(report.precision_percent(), Some(50));
    assert_eq!(
        report.false_positives.keys().copied().collect::<Vec<_>>(),
        vec![EntityId(3)]
    );
}

#[test]
fn test_evaluate_duplicate_manual_entry() {
    let temp = create_temp_dir();
    let catalog = create_catalog(&temp);
    let matches = write(&temp, "matches.json", "{}");
    let manual = write(&temp, "manual.csv", "n_beagle, Beagle\nn_beagle, -\n");

    let result = cmd_evaluate(&matches, &manual, &catalog, false);
    assert!(matches!(result, Err(CliError::Core(e)) if e.is_integrity()));
}

// =============================================================================
// COMPARE COMMAND TESTS
// =============================================================================

#[test]
fn test_compare_match_files() {
    let temp = create_temp_dir();
    let a = write(&temp, "a.json", r#"{"1": ["Beagle"], "2": ["Oak"]}"#);
    let b = write(&temp, "b.json", r#"{"1": ["Beagle"], "3": ["Unicorn"]}"#);

    let comparison = cmd_compare(&a, &b).unwrap();
    assert!(comparison.different.is_empty());
    assert_eq!(comparison.only_a.keys().copied().collect::<Vec<_>>(), vec![EntityId(2)]);
    assert_eq!(comparison.only_b.keys().copied().collect::<Vec<_>>(), vec![EntityId(3)]);
    assert!(!comparison.is_identical());
}

#[test]
fn test_compare_missing_file() {
    let temp = create_temp_dir();
    let a = write(&temp, "a.json", "{}");

    let result = cmd_compare(&a, &temp.path().join("missing.json"));
    assert!(matches!(result, Err(CliError::Io(_))));
}

// =============================================================================
// MERGE-CSV COMMAND TESTS
// =============================================================================

#[test]
fn test_merge_csv_concatenates() {
    let temp = create_temp_dir();
    let first = write(&temp, "a.csv", "# part one\nn_beagle, Beagle\n");
    let second = write(&temp, "b.csv", "n_oak, Oak  # checked\n");
    let output = temp.path().join("merged.csv");

    cmd_merge_csv(&[first, second], &output).unwrap();

    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "n_beagle, Beagle\nn_oak, Oak  # checked\n"
    );
}

#[test]
fn test_merge_csv_rejects_duplicates() {
    let temp = create_temp_dir();
    let first = write(&temp, "a.csv", "n_beagle, Beagle\n");
    let second = write(&temp, "b.csv", "n_beagle, Beagle (dog)\n");
    let output = temp.path().join("merged.csv");

    let result = cmd_merge_csv(&[first, second], &output);
    assert!(result.is_err());
    assert!(!output.exists());
}
