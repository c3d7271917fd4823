//! League snapshot import command implementation

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::storage::{
    InputBatch, Manager, Matchup, MetricsDatabase, Player, RosterSlotAssignment, ScheduleEntry,
    StatLine,
};
use crate::Result;

use super::open_database;

/// Everything an upstream sync hands over, in one JSON document.
///
/// Every array is optional so partial refreshes (e.g. only this week's
/// stats and scores) can be imported on their own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    #[serde(default)]
    pub managers: Vec<Manager>,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub player_stats: Vec<StatLine>,
    #[serde(default)]
    pub rosters: Vec<RosterSlotAssignment>,
    #[serde(default)]
    pub matchups: Vec<Matchup>,
    #[serde(default)]
    pub schedule: Vec<ScheduleEntry>,
}

/// Row counts written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub managers: usize,
    pub players: usize,
    pub player_stats: usize,
    pub rosters: usize,
    pub matchups: usize,
    pub schedule: usize,
}

/// Read and parse a snapshot file.
pub fn load_snapshot(path: &Path) -> Result<LeagueSnapshot> {
    let read = || -> anyhow::Result<LeagueSnapshot> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let snapshot = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
        Ok(snapshot)
    };
    Ok(read()?)
}

/// Upsert every row of the snapshot in one transaction. Importing the same
/// snapshot twice leaves the store unchanged; a failed import writes nothing.
pub fn import_snapshot(
    db: &mut MetricsDatabase,
    snapshot: &LeagueSnapshot,
) -> Result<ImportSummary> {
    db.upsert_inputs(&InputBatch {
        managers: &snapshot.managers,
        players: &snapshot.players,
        player_stats: &snapshot.player_stats,
        rosters: &snapshot.rosters,
        matchups: &snapshot.matchups,
        schedule: &snapshot.schedule,
    })?;

    let summary = ImportSummary {
        managers: snapshot.managers.len(),
        players: snapshot.players.len(),
        player_stats: snapshot.player_stats.len(),
        rosters: snapshot.rosters.len(),
        matchups: snapshot.matchups.len(),
        schedule: snapshot.schedule.len(),
    };
    tracing::info!(?summary, "snapshot imported");
    Ok(summary)
}

/// Handle the import command
pub fn handle_import(file: PathBuf, db: Option<PathBuf>, verbose: bool) -> Result<()> {
    let snapshot = load_snapshot(&file)?;
    let mut db = open_database(db, verbose)?;

    println!("Importing {}...", file.display());
    let summary = import_snapshot(&mut db, &snapshot)?;

    println!("✓ Snapshot imported successfully");
    if verbose {
        println!("  Managers:     {}", summary.managers);
        println!("  Players:      {}", summary.players);
        println!("  Stat lines:   {}", summary.player_stats);
        println!("  Roster rows:  {}", summary.rosters);
        println!("  Matchups:     {}", summary.matchups);
        println!("  Schedule:     {}", summary.schedule);
    }
    Ok(())
}
