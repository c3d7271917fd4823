//! League file loading: scoring rules and the starting-slot catalog.
//!
//! A league file is TOML by default and JSON when its extension says so:
//!
//! ```toml
//! name = "Sunday League"
//!
//! [scoring]
//! pass_yds = 0.04
//! pass_td = 4.0
//!
//! [[slots]]
//! code = "W/R/T"
//! count = 1
//! accepts = ["WR", "RB", "TE"]
//! ```
//!
//! Everything is validated on load, so a run either starts with a usable
//! configuration or fails before touching the database.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cli::types::PositionTag;
use crate::engine::eligibility::{SlotCatalog, SlotCategory};
use crate::engine::scoring::ScoringRules;
use crate::error::{MetricsError, Result};

#[cfg(test)]
mod tests;

/// Default league file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "league.toml";

/// Raw league file as written on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueFile {
    #[serde(default)]
    pub name: Option<String>,
    pub scoring: BTreeMap<String, f64>,
    pub slots: Vec<SlotSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSpec {
    pub code: String,
    #[serde(default = "default_count")]
    pub count: usize,
    pub accepts: Vec<String>,
}

fn default_count() -> usize {
    1
}

/// Validated, immutable league configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LeagueConfig {
    pub name: Option<String>,
    pub scoring: ScoringRules,
    pub catalog: SlotCatalog,
}

impl LeagueConfig {
    /// Half-PPR scoring with a superflex starting lineup.
    pub fn standard() -> Self {
        Self {
            name: None,
            scoring: ScoringRules::standard(),
            catalog: SlotCatalog::standard(),
        }
    }

    /// Validate a parsed league file.
    pub fn from_file(file: LeagueFile) -> Result<Self> {
        let scoring = ScoringRules::new(file.scoring)?;

        let mut slots = Vec::with_capacity(file.slots.len());
        for spec in file.slots {
            if spec.code.trim().is_empty() {
                return Err(MetricsError::config("slot with an empty code"));
            }
            if spec.accepts.iter().any(|tag| tag.trim().is_empty()) {
                return Err(MetricsError::config(format!(
                    "slot {} accepts an empty position tag",
                    spec.code
                )));
            }
            slots.push(SlotCategory {
                code: PositionTag::new(&spec.code),
                capacity: spec.count,
                accepts: spec.accepts.iter().map(|t| PositionTag::new(t)).collect(),
            });
        }
        let catalog = SlotCatalog::new(slots)?;

        Ok(Self {
            name: file.name,
            scoring,
            catalog,
        })
    }

    /// Parse league file text. `json` selects the JSON reader.
    pub fn parse(text: &str, json: bool) -> Result<Self> {
        let file: LeagueFile = if json {
            serde_json::from_str(text)?
        } else {
            toml::from_str(text)?
        };
        Self::from_file(file)
    }

    /// Load and validate a league file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            MetricsError::config(format!("cannot read league file {}: {}", path.display(), e))
        })?;
        let json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let config = Self::parse(&text, json)?;
        tracing::info!(
            path = %path.display(),
            scoring_rules = config.scoring.len(),
            slots = config.catalog.total_capacity(),
            "league file loaded"
        );
        Ok(config)
    }

    /// Back to the on-disk shape, e.g. for printing the effective config.
    pub fn to_file(&self) -> LeagueFile {
        LeagueFile {
            name: self.name.clone(),
            scoring: self
                .scoring
                .iter()
                .map(|(stat, points)| (stat.to_string(), points))
                .collect(),
            slots: self
                .catalog
                .slots()
                .iter()
                .map(|slot| SlotSpec {
                    code: slot.code.to_string(),
                    count: slot.capacity,
                    accepts: slot.accepts.iter().map(|t| t.to_string()).collect(),
                })
                .collect(),
        }
    }
}
