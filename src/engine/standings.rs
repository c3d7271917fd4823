//! Standings helpers: head-to-head records and the luck index.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cli::types::{ManagerId, Week};
use crate::storage::models::{ExpectedWinRow, Matchup};

/// Season-to-date head-to-head record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamRecord {
    pub manager_id: ManagerId,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
    pub points_against: f64,
}

impl TeamRecord {
    pub fn new(manager_id: ManagerId) -> Self {
        Self {
            manager_id,
            wins: 0,
            losses: 0,
            ties: 0,
            points_for: 0.0,
            points_against: 0.0,
        }
    }
}

/// Records through `through_week`, keyed by manager.
///
/// Only matchups with both scores count. A tie is recorded as a tie and
/// credits no win to either side, while the expected-wins engine splits the
/// same tie 0.5/0.5.
pub fn records(matchups: &[Matchup], through_week: Week) -> BTreeMap<ManagerId, TeamRecord> {
    let mut table: BTreeMap<ManagerId, TeamRecord> = BTreeMap::new();

    for m in matchups.iter().filter(|m| m.week <= through_week) {
        if m.score_a.is_none() || m.score_b.is_none() {
            continue;
        }
        for result in m.team_results() {
            let record = table
                .entry(result.manager_id.clone())
                .or_insert_with(|| TeamRecord::new(result.manager_id.clone()));
            record.points_for += result.points_for;
            record.points_against += result.points_against;
            if result.won {
                record.wins += 1;
            } else if result.points_for == result.points_against {
                record.ties += 1;
            } else {
                record.losses += 1;
            }
        }
    }
    table
}

/// Actual wins minus expected wins for one manager.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LuckRow {
    pub manager_id: ManagerId,
    pub actual_wins: u32,
    pub expected_wins: f64,
    pub luck: f64,
}

/// Luck index through `through_week`.
///
/// Expected wins are the manager's latest `cum_xw` at or before the cutoff.
/// Rows are sorted by luck, luckiest first, with the manager id breaking
/// ties.
pub fn luck_index(
    matchups: &[Matchup],
    expected: &[ExpectedWinRow],
    through_week: Week,
) -> Vec<LuckRow> {
    let table = records(matchups, through_week);

    let mut latest: BTreeMap<&ManagerId, &ExpectedWinRow> = BTreeMap::new();
    for row in expected.iter().filter(|r| r.week <= through_week) {
        match latest.get(&row.manager_id) {
            Some(seen) if seen.week >= row.week => {}
            _ => {
                latest.insert(&row.manager_id, row);
            }
        }
    }

    let mut managers: Vec<&ManagerId> = table.keys().chain(latest.keys().copied()).collect();
    managers.sort();
    managers.dedup();

    let mut rows: Vec<LuckRow> = managers
        .into_iter()
        .map(|manager_id| {
            let actual_wins = table.get(manager_id).map(|r| r.wins).unwrap_or(0);
            let expected_wins = latest.get(manager_id).map(|r| r.cum_xw).unwrap_or(0.0);
            LuckRow {
                manager_id: manager_id.clone(),
                actual_wins,
                expected_wins,
                luck: actual_wins as f64 - expected_wins,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.luck
            .total_cmp(&a.luck)
            .then_with(|| a.manager_id.cmp(&b.manager_id))
    });
    rows
}
