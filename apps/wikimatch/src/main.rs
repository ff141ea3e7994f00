//! # wikimatch
//!
//! Matches taxonomy entities to Wikipedia articles.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use wikimatch::cli::{
    MatchInputs, cmd_ancestors, cmd_compare, cmd_evaluate, cmd_match, cmd_merge_csv,
};
use wikimatch::config::MatchingConfig;

#[derive(Parser)]
#[command(name = "wikimatch")]
#[command(about = "Match taxonomy entities to Wikipedia articles", version)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the ancestor table of a WordNet is-a edge list
    Ancestors {
        /// `parent child` edge list
        #[arg(long)]
        is_a: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// json or snapshot
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Match catalog entities to Wikipedia pages
    Match {
        /// Page structure JSON (redirects, page_categories, category_parents)
        #[arg(long)]
        pages: PathBuf,
        /// Entity catalog JSON
        #[arg(long)]
        catalog: PathBuf,
        /// Source ancestor table (snapshot or JSON) or raw is-a edge list
        #[arg(long)]
        is_a: PathBuf,
        /// Source node -> Wikipedia category map
        #[arg(long)]
        category_map: PathBuf,
        /// Curated discard categories
        #[arg(long)]
        discard: PathBuf,
        /// Restrict to the entity ids in this JSON list
        #[arg(long)]
        split: Option<PathBuf>,
        /// Matching config JSON
        #[arg(long)]
        config: Option<PathBuf>,
        /// Config override, `key=value` (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
        #[arg(long)]
        output_dir: PathBuf,
        /// Output file suffix
        #[arg(long, default_value = "all")]
        name: String,
    },

    /// Score a match file against manual matches
    Evaluate {
        #[arg(long)]
        matches: PathBuf,
        /// Manual match CSV
        #[arg(long)]
        manual: PathBuf,
        #[arg(long)]
        catalog: PathBuf,
        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Diff two match files
    Compare {
        #[arg(long)]
        a: PathBuf,
        #[arg(long)]
        b: PathBuf,
    },

    /// Concatenate manual match CSV files
    MergeCsv {
        #[arg(long, num_args = 1.., required = true)]
        inputs: Vec<PathBuf>,
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Ancestors {
            is_a,
            output,
            format,
        } => cmd_ancestors(&is_a, &output, &format),
        Command::Match {
            pages,
            catalog,
            is_a,
            category_map,
            discard,
            split,
            config,
            overrides,
            output_dir,
            name,
        } => MatchingConfig::load(config.as_deref(), &overrides).and_then(|config| {
            let inputs = MatchInputs {
                pages,
                catalog,
                is_a,
                category_map,
                discard,
                split,
            };
            cmd_match(&inputs, &config, &output_dir, &name)
        }),
        Command::Evaluate {
            matches,
            manual,
            catalog,
            json,
        } => cmd_evaluate(&matches, &manual, &catalog, json).map(|_| ()),
        Command::Compare { a, b } => cmd_compare(&a, &b).map(|_| ()),
        Command::MergeCsv { inputs, output } => cmd_merge_csv(&inputs, &output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
