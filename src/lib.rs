//! Fantasy Football League Metrics Library
//!
//! Derived metrics for a head-to-head fantasy football league, computed from
//! a local SQLite copy of the league's rosters, stat lines and matchups.
//!
//! ## Features
//!
//! - **Scoring**: Turn raw stat lines into fantasy points with league rules
//! - **Lineup Efficiency**: Best legal lineup vs the one actually started
//! - **Expected Wins**: All-play win probability and its running total
//! - **Luck Index**: Actual wins against expected wins
//! - **Batch Computation**: Parallel, idempotent recomputation of any week range
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ffl_metrics::{
//!     commands::compute_metrics::run_batch, config::LeagueConfig, engine::WeekWindow,
//!     storage::MetricsDatabase, Week,
//! };
//!
//! # fn example() -> ffl_metrics::Result<()> {
//! let mut db = MetricsDatabase::open_default()?;
//! let league = LeagueConfig::standard();
//! let through = db.most_recent_completed_week()?;
//!
//! let report = run_batch(&mut db, &league, WeekWindow::new(Week::new(1), through))?;
//! println!("{} lineups written", report.written());
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! Paths can be set once instead of on every command:
//! ```bash
//! export FFL_METRICS_DB=~/league/league.db
//! export FFL_METRICS_CONFIG=~/league/league.toml
//! export FFL_METRICS_THREADS=4
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod storage;

// Re-export commonly used types
pub use cli::types::{ManagerId, MatchupId, PlayerId, PositionTag, Week};
pub use config::LeagueConfig;
pub use error::{MetricsError, Result};

pub const DB_PATH_ENV_VAR: &str = "FFL_METRICS_DB";
pub const CONFIG_PATH_ENV_VAR: &str = "FFL_METRICS_CONFIG";
pub const THREADS_ENV_VAR: &str = "FFL_METRICS_THREADS";
