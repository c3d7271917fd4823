//! Database schema and connection management

use crate::error::{MetricsError, Result};
use crate::storage::models::STAT_COLUMNS;
use crate::DB_PATH_ENV_VAR;
use dirs::cache_dir;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Connection to the league store.
///
/// Input tables (`managers`, `players`, `player_stats`, `rosters`,
/// `matchups`, `schedule`) are filled by imports; the metrics tables
/// (`lineup_efficiency`, `expected_wins`) are written only by the batch.
pub struct MetricsDatabase {
    pub(crate) conn: Connection,
}

impl MetricsDatabase {
    /// Open (or create) the database at `path` and ensure tables exist
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let mut db = Self { conn };
        db.initialize_schema()?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Open the database in the user cache directory
    pub fn open_default() -> Result<Self> {
        Self::open(&Self::default_path()?)
    }

    /// In-memory database, used by tests and dry runs
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// `<cache_dir>/ffl-metrics/league.db`
    pub fn default_path() -> Result<PathBuf> {
        let cache_dir = cache_dir().ok_or_else(|| MetricsError::MissingPath {
            what: "Database path".to_string(),
            env_var: DB_PATH_ENV_VAR.to_string(),
        })?;
        Ok(cache_dir.join("ffl-metrics").join("league.db"))
    }

    /// Initialize the database schema
    pub(crate) fn initialize_schema(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS managers (
                manager_id TEXT PRIMARY KEY,
                manager_name TEXT NOT NULL,
                team_name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS players (
                player_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                pos_type TEXT NOT NULL,
                eligible_positions TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS matchups (
                week INTEGER NOT NULL,
                matchup_id TEXT NOT NULL,
                team_a TEXT NOT NULL,
                team_b TEXT NOT NULL,
                score_a REAL,
                score_b REAL,
                PRIMARY KEY (week, matchup_id)
            );

            CREATE TABLE IF NOT EXISTS rosters (
                week INTEGER NOT NULL,
                manager_id TEXT NOT NULL,
                player_id TEXT NOT NULL,
                slot TEXT NOT NULL,
                started INTEGER NOT NULL,
                PRIMARY KEY (week, manager_id, player_id)
            );

            CREATE TABLE IF NOT EXISTS lineup_efficiency (
                week INTEGER NOT NULL,
                manager_id TEXT NOT NULL,
                actual_pts REAL NOT NULL,
                optimal_pts REAL NOT NULL,
                regret REAL NOT NULL,
                efficiency REAL NOT NULL,
                PRIMARY KEY (week, manager_id)
            );

            CREATE TABLE IF NOT EXISTS expected_wins (
                week INTEGER NOT NULL,
                manager_id TEXT NOT NULL,
                p_win REAL NOT NULL,
                cum_xw REAL NOT NULL,
                PRIMARY KEY (week, manager_id)
            );

            CREATE TABLE IF NOT EXISTS schedule (
                week INTEGER NOT NULL,
                team_a TEXT NOT NULL,
                team_b TEXT NOT NULL,
                PRIMARY KEY (week, team_a, team_b)
            );

            CREATE INDEX IF NOT EXISTS idx_rosters_week_manager
             ON rosters(week, manager_id);

            CREATE INDEX IF NOT EXISTS idx_expected_wins_manager_week
             ON expected_wins(manager_id, week);",
        )?;

        // One REAL column per tracked statistic.
        let stat_columns: Vec<String> = STAT_COLUMNS
            .iter()
            .map(|c| format!("{} REAL NOT NULL DEFAULT 0", c))
            .collect();
        self.conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS player_stats (
                    week INTEGER NOT NULL,
                    player_id TEXT NOT NULL,
                    {},
                    PRIMARY KEY (week, player_id)
                )",
                stat_columns.join(",\n                    ")
            ),
            [],
        )?;

        Ok(())
    }
}
