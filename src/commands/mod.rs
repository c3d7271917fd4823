//! Command implementations for the league metrics CLI

pub mod check_config;
pub mod compute_metrics;
pub mod import_data;
pub mod init_db;
pub mod report;
pub mod score_week;
pub mod verify;


use std::path::{Path, PathBuf};

use crate::config::{LeagueConfig, DEFAULT_CONFIG_FILE};
use crate::storage::MetricsDatabase;
use crate::{Result, CONFIG_PATH_ENV_VAR, DB_PATH_ENV_VAR};

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var(var)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
}

/// Database path from the flag, then the environment, then the cache dir.
pub fn resolve_db_path(db: Option<PathBuf>) -> Result<PathBuf> {
    match db.or_else(|| env_path(DB_PATH_ENV_VAR)) {
        Some(path) => Ok(path),
        None => MetricsDatabase::default_path(),
    }
}

/// Open the database at the resolved path.
pub fn open_database(db: Option<PathBuf>, verbose: bool) -> Result<MetricsDatabase> {
    let path = resolve_db_path(db)?;
    if verbose {
        println!("Connecting to database at {}...", path.display());
    }
    MetricsDatabase::open(&path)
}

/// League file from the flag, then the environment, then `./league.toml`.
///
/// Returns `None` when nothing was named and the default file is absent.
pub fn resolve_config_path(config: Option<PathBuf>) -> Option<PathBuf> {
    config
        .or_else(|| env_path(CONFIG_PATH_ENV_VAR))
        .or_else(|| {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            default.exists().then(|| default.to_path_buf())
        })
}

/// Load the league file, or the built-in standard league when none exists.
///
/// A file that was named explicitly must load; only the implicit default
/// falls back.
pub fn load_league_config(config: Option<PathBuf>, verbose: bool) -> Result<LeagueConfig> {
    match resolve_config_path(config) {
        Some(path) => {
            let league = LeagueConfig::load(&path)?;
            if verbose {
                println!("✓ League file loaded from {}", path.display());
            }
            Ok(league)
        }
        None => {
            tracing::info!("no league file found; using the standard league");
            if verbose {
                println!("No league file found, using standard half-PPR scoring");
            }
            Ok(LeagueConfig::standard())
        }
    }
}
