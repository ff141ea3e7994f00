//! # CLI Commands
//!
//! One `cmd_*` function per subcommand. Each reads its inputs from disk,
//! hands them to wikimatch-core and writes or prints the result.

use crate::config::MatchingConfig;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use wikimatch_core::formats::{
    SNAPSHOT_MAGIC, decode_ancestor_snapshot, encode_ancestor_snapshot, parse_is_a,
};
use wikimatch_core::{
    AncestorClosure, AncestorSet, CategoryKeywordFilter, CategoryTargets, CategoryValidator,
    DiscardCategorySet, EntityCatalog, EntityId, EntityRecord, EvaluationReport, ManualMatches,
    MatchComparison, MatchError, MatchOrchestrator, MatchSet, NodeRecord, ProcessedTitleIndex, RedirectGraph, Title, WikiGraph,
    compare_matches, evaluate, merge_manual_files,
};

// =============================================================================
// ERRORS
// =============================================================================

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] MatchError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CliError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

// =============================================================================
// INPUT FILES
// =============================================================================

/// Extracted page structure of a Wikipedia dump.
#[derive(Debug, Deserialize)]
pub struct PagesFile {
    #[serde(default)]
    pub redirects: RedirectGraph,
    pub page_categories: Vec<NodeRecord<Title>>,
    pub category_parents: Vec<NodeRecord<Title>>,
}

/// Curated discard categories.
#[derive(Debug, Deserialize)]
pub struct DiscardFile {
    #[serde(rename = "DISCARD")]
    pub discard: Vec<Title>,
}

/// Input paths of a matching run.
#[derive(Debug, Clone)]
pub struct MatchInputs {
    pub pages: PathBuf,
    pub catalog: PathBuf,
    pub is_a: PathBuf,
    pub category_map: PathBuf,
    pub discard: PathBuf,
    pub split: Option<PathBuf>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text)?;
    tracing::info!(path = %path.display(), "wrote output");
    Ok(())
}

/// Load the entity catalog.
pub fn load_catalog(path: &Path) -> Result<EntityCatalog, CliError> {
    let records: Vec<EntityRecord> = read_json(path)?;
    Ok(EntityCatalog::from_records(records)?)
}

/// Load a source-taxonomy ancestor table.
///
/// Accepts a binary snapshot, a JSON table, or a raw `parent child` edge
/// list whose closure is computed on the spot.
pub fn load_source_ancestors(path: &Path) -> Result<AncestorSet<String>, CliError> {
    let bytes = std::fs::read(path)?;
    if bytes.starts_with(&SNAPSHOT_MAGIC) {
        return Ok(decode_ancestor_snapshot(&bytes)?);
    }

    let text = String::from_utf8(bytes).map_err(|e| {
        CliError::config(format!("{}: not a snapshot and not UTF-8: {e}", path.display()))
    })?;
    if text.trim_start().starts_with('{') {
        let map: BTreeMap<String, BTreeSet<String>> = serde_json::from_str(&text)?;
        return Ok(AncestorSet::from_map(map));
    }

    let graph = parse_is_a(&text)?;
    Ok(AncestorClosure::compute(&graph))
}

// =============================================================================
// ANCESTORS COMMAND
// =============================================================================

/// Compute the ancestor table of an is-a edge list.
///
/// `format` is `json` (plain map) or `snapshot` (binary).
pub fn cmd_ancestors(is_a: &Path, output: &Path, format: &str) -> Result<(), CliError> {
    let text = std::fs::read_to_string(is_a)?;
    let graph = parse_is_a(&text)?;
    let table = AncestorClosure::compute(&graph);

    match format {
        "json" => write_json(output, &table)?,
        "snapshot" => {
            let bytes = encode_ancestor_snapshot(&table)?;
            std::fs::write(output, bytes)?;
            tracing::info!(path = %output.display(), "wrote snapshot");
        }
        other => {
            return Err(CliError::config(format!(
                "unknown output format {other:?}, expected json or snapshot"
            )));
        }
    }

    println!(
        "Ancestors: {} nodes, {} components",
        table.len(),
        table.set_count()
    );
    Ok(())
}

// =============================================================================
// MATCH COMMAND
// =============================================================================

/// Run the matching pipeline and write `matches_<name>.json` and
/// `unmatched_<name>.json` into `output_dir`.
pub fn cmd_match(
    inputs: &MatchInputs,
    config: &MatchingConfig,
    output_dir: &Path,
    name: &str,
) -> Result<(), CliError> {
    config.validate()?;

    let pages: PagesFile = read_json(&inputs.pages)?;
    let wiki = WikiGraph::from_records(pages.page_categories, pages.category_parents)?;
    let index = ProcessedTitleIndex::build(&wiki.canonical_titles(), &pages.redirects);

    let discard_file: DiscardFile = read_json(&inputs.discard)?;
    let discard = DiscardCategorySet::build(
        discard_file.discard,
        wiki.category_names(),
        &CategoryKeywordFilter::default(),
    );

    let category_map: BTreeMap<String, CategoryTargets> = read_json(&inputs.category_map)?;
    let validator = CategoryValidator::new(category_map);

    let source_ancestors = load_source_ancestors(&inputs.is_a)?;

    let catalog = load_catalog(&inputs.catalog)?;
    let split: Option<BTreeSet<EntityId>> = match &inputs.split {
        Some(path) => Some(read_json(path)?),
        None => None,
    };
    let queries = catalog.queries(split.as_ref())?;
    tracing::info!(entities = queries.len(), "loaded queries");

    let orchestrator =
        MatchOrchestrator::new(&index, &wiki, &discard, &validator, &source_ancestors)
            .with_depths(config.discard_max_depth, config.match_max_depth);
    let report = orchestrator.run(&queries);

    std::fs::create_dir_all(output_dir)?;
    write_json(&output_dir.join(format!("matches_{name}.json")), &report.matched)?;
    write_json(
        &output_dir.join(format!("unmatched_{name}.json")),
        &report.unmatched,
    )?;

    println!(
        "Matched: {}, unmatched: {}",
        report.matched.len(),
        report.unmatched.len()
    );
    Ok(())
}

// =============================================================================
// EVALUATE COMMAND
// =============================================================================

/// Score a match file against manual ground truth, print the result and
/// return it.
pub fn cmd_evaluate(
    matches: &Path,
    manual: &Path,
    catalog: &Path,
    json_mode: bool,
) -> Result<EvaluationReport, CliError> {
    let produced: MatchSet = read_json(matches)?;
    let catalog = load_catalog(catalog)?;
    let truth = ManualMatches::parse(&std::fs::read_to_string(manual)?, &catalog)?;

    let report = evaluate(&produced, &truth);

    if json_mode {
        let output = serde_json::json!({
            "true_positives": report.true_positives,
            "positives": report.positives,
            "precision_percent": report.precision_percent(),
            "false_positives": report.false_positives,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match report.precision_percent() {
            Some(percent) => println!(
                "Precision: {}% ({}/{})",
                percent, report.true_positives, report.positives
            ),
            None => println!("Precision: n/a (no evaluated entities)"),
        }
        for (entity, titles) in &report.false_positives {
            let record = catalog.get(*entity);
            println!(
                "  {} {:?}: {:?}",
                entity,
                record.map(|r| r.phrases.as_slice()),
                titles
            );
        }
    }
    Ok(report)
}

// =============================================================================
// COMPARE COMMAND
// =============================================================================

/// Diff two match files.
pub fn cmd_compare(a: &Path, b: &Path) -> Result<MatchComparison, CliError> {
    let a_matches: MatchSet = read_json(a)?;
    let b_matches: MatchSet = read_json(b)?;

    let comparison = compare_matches(&a_matches, &b_matches);
    println!(
        "Different: {}, only in a: {}, only in b: {}",
        comparison.different.len(),
        comparison.only_a.len(),
        comparison.only_b.len()
    );
    println!("{}", serde_json::to_string_pretty(&comparison)?);
    Ok(comparison)
}

// =============================================================================
// MERGE-CSV COMMAND
// =============================================================================

/// Concatenate manual match files, rejecting repeated source nodes.
pub fn cmd_merge_csv(inputs: &[PathBuf], output: &Path) -> Result<(), CliError> {
    let texts = inputs
        .iter()
        .map(std::fs::read_to_string)
        .collect::<Result<Vec<_>, _>>()?;

    let merged = merge_manual_files(texts.iter().map(String::as_str))?;
    std::fs::write(output, merged)?;
    println!("Saved the output to: {}", output.display());
    Ok(())
}
