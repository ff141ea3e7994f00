//! Matching configuration: optional JSON file plus `--set key=value`
//! overrides.

use crate::cli::CliError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use wikimatch_core::orchestrator::{DEFAULT_DISCARD_MAX_DEPTH, DEFAULT_MATCH_MAX_DEPTH};

/// Reachability bounds for one matching run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchingConfig {
    /// Bound for the discard-category check.
    pub discard_max_depth: usize,
    /// Bound for category validation.
    pub match_max_depth: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            discard_max_depth: DEFAULT_DISCARD_MAX_DEPTH,
            match_max_depth: DEFAULT_MATCH_MAX_DEPTH,
        }
    }
}

impl MatchingConfig {
    /// Load from `path` (defaults when `None`), apply every override in
    /// order, then validate.
    pub fn load(path: Option<&Path>, overrides: &[String]) -> Result<Self, CliError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                serde_json::from_str(&text).map_err(|e| CliError::Config {
                    message: format!("{}: {e}", path.display()),
                })?
            }
            None => Self::default(),
        };

        for item in overrides {
            config.apply_override(item)?;
        }
        config.validate()?;

        tracing::debug!(
            discard_max_depth = config.discard_max_depth,
            match_max_depth = config.match_max_depth,
            "matching config"
        );
        Ok(config)
    }

    /// Apply one `key=value` override.
    pub fn apply_override(&mut self, item: &str) -> Result<(), CliError> {
        let Some((key, value)) = item.split_once('=') else {
            return Err(CliError::config(format!(
                "override {item:?} is not of the form key=value"
            )));
        };
        let key = key.trim();
        let slot = match key {
            "discard_max_depth" => &mut self.discard_max_depth,
            "match_max_depth" => &mut self.match_max_depth,
            _ => return Err(CliError::config(format!("unknown config key {key:?}"))),
        };
        *slot = value
            .trim()
            .parse()
            .map_err(|_| CliError::config(format!("{key} must be a positive integer, got {value:?}")))?;
        Ok(())
    }

    /// Both depths must be at least 1.
    pub fn validate(&self) -> Result<(), CliError> {
        for (key, depth) in [
            ("discard_max_depth", self.discard_max_depth),
            ("match_max_depth", self.match_max_depth),
        ] {
            if depth == 0 {
                return Err(CliError::config(format!("{key} must be at least 1")));
            }
        }
        Ok(())
    }
}
