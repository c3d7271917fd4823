//! CLI argument definitions and parsing.

pub mod types;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use types::Week;

/// Store location shared by every command touching the database
#[derive(Debug, Args)]
pub struct DbArgs {
    /// SQLite database path (or set `FFL_METRICS_DB` env var).
    #[clap(long)]
    pub db: Option<PathBuf>,
}

/// League file location shared by commands that score or optimize
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// League file, TOML or JSON (or set `FFL_METRICS_CONFIG` env var).
    #[clap(long, short)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum ReportCmd {
    /// Lineup efficiency: one week, or season totals when no week is given
    Efficiency {
        #[clap(flatten)]
        db: DbArgs,

        /// Single week.
        #[clap(long, short)]
        week: Option<Week>,

        /// Output results as JSON instead of a table.
        #[clap(long)]
        json: bool,
    },

    /// Actual wins against expected wins
    Luck {
        #[clap(flatten)]
        db: DbArgs,

        /// Last week to include (defaults to the most recent completed week).
        #[clap(long, short)]
        through_week: Option<Week>,

        /// Output results as JSON instead of a table.
        #[clap(long)]
        json: bool,
    },
}

#[derive(Debug, Parser)]
#[clap(
    name = "ffl-metrics",
    about = "Derived fantasy football metrics: lineup efficiency, expected wins and luck"
)]
pub struct FflMetrics {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the database schema
    InitDb {
        #[clap(flatten)]
        db: DbArgs,
    },

    /// Upsert a JSON league snapshot into the database
    Import {
        /// Snapshot file with managers, players, stats, rosters and matchups.
        #[clap(long, short)]
        file: PathBuf,

        #[clap(flatten)]
        db: DbArgs,

        /// Print per-table row counts.
        #[clap(long)]
        verbose: bool,
    },

    /// Load and validate the league file
    CheckConfig {
        #[clap(flatten)]
        config: ConfigArgs,

        /// Print the effective league file as JSON.
        #[clap(long)]
        json: bool,
    },

    /// Compute lineup efficiency and expected wins
    Compute {
        #[clap(flatten)]
        db: DbArgs,

        #[clap(flatten)]
        config: ConfigArgs,

        /// First week to recompute (defaults to 1).
        #[clap(long)]
        from_week: Option<Week>,

        /// Last week to compute (defaults to the most recent completed week).
        #[clap(long)]
        through_week: Option<Week>,

        /// Print per-unit details for partial and empty units.
        #[clap(long)]
        verbose: bool,
    },

    /// Score a week's stat lines with the league rules
    Score {
        #[clap(flatten)]
        db: DbArgs,

        #[clap(flatten)]
        config: ConfigArgs,

        /// Single week.
        #[clap(long, short)]
        week: Week,

        /// Filter by player name (substring match).
        #[clap(long, short = 'n')]
        player_name: Option<String>,

        /// Output results as JSON instead of text lines.
        #[clap(long)]
        json: bool,
    },

    /// Check that stored expected-wins totals match their weekly values
    Verify {
        #[clap(flatten)]
        db: DbArgs,
    },

    /// Print stored metrics
    Report {
        #[clap(subcommand)]
        cmd: ReportCmd,
    },
}
