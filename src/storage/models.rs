//! Data models for the storage layer

use crate::cli::types::{ManagerId, MatchupId, PlayerId, PositionTag, Week};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Raw statistic columns carried by `player_stats`.
///
/// Kicking and points-allowed categories are exclusive brackets: a single
/// field goal or game lands in exactly one of them.
pub const STAT_COLUMNS: &[&str] = &[
    "pass_yds",
    "pass_td",
    "pass_int",
    "rush_yds",
    "rush_td",
    "rec",
    "rec_yds",
    "rec_td",
    "return_td",
    "two_pt",
    "fum_lost",
    "fum_ret_td",
    "fg_0_19",
    "fg_20_29",
    "fg_30_39",
    "fg_40_49",
    "fg_50_plus",
    "pat_made",
    "dst_sacks",
    "dst_int",
    "dst_fum_rec",
    "dst_td",
    "safeties",
    "blk_kick",
    "dst_ret_td",
    "pts_allow_0",
    "pts_allow_1_6",
    "pts_allow_7_13",
    "pts_allow_14_20",
    "pts_allow_21_27",
    "pts_allow_28_34",
    "pts_allow_35_plus",
    "xpr",
];

/// A fantasy manager and their team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manager {
    pub manager_id: ManagerId,
    pub manager_name: String,
    pub team_name: String,
}

/// Player information stored in the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: PlayerId,
    pub name: String,
    /// Platform position type (`O`, `K`, `DT`).
    pub pos_type: String,
    pub eligible_positions: BTreeSet<PositionTag>,
}

/// Raw statistics for one player in one week.
///
/// Stats are keyed by category name. Categories the scoring rules don't
/// know about are carried along and ignored at scoring time. Non-numeric
/// fields in an incoming line (e.g. `"team": "KC"`) are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawStatLine")]
pub struct StatLine {
    pub week: Week,
    pub player_id: PlayerId,
    #[serde(flatten)]
    pub stats: BTreeMap<String, f64>,
}

#[derive(Deserialize)]
struct RawStatLine {
    week: Week,
    player_id: PlayerId,
    #[serde(flatten)]
    stats: BTreeMap<String, serde_json::Value>,
}

impl From<RawStatLine> for StatLine {
    fn from(raw: RawStatLine) -> Self {
        let mut stats = BTreeMap::new();
        for (stat, value) in raw.stats {
            match value.as_f64() {
                Some(v) => {
                    stats.insert(stat, v);
                }
                None => tracing::warn!(
                    player_id = %raw.player_id,
                    week = %raw.week,
                    stat = %stat,
                    value = %value,
                    "non-numeric stat skipped"
                ),
            }
        }
        Self {
            week: raw.week,
            player_id: raw.player_id,
            stats,
        }
    }
}

impl StatLine {
    pub fn new(week: Week, player_id: PlayerId) -> Self {
        Self {
            week,
            player_id,
            stats: BTreeMap::new(),
        }
    }

    /// Builder-style setter used by importers and tests.
    pub fn with(mut self, stat: &str, value: f64) -> Self {
        self.stats.insert(stat.to_string(), value);
        self
    }

    pub fn get(&self, stat: &str) -> f64 {
        self.stats.get(stat).copied().unwrap_or(0.0)
    }

    /// Field-wise addition of another line's stats into this one.
    pub fn accumulate(&mut self, other: &StatLine) {
        for (stat, value) in &other.stats {
            *self.stats.entry(stat.clone()).or_insert(0.0) += value;
        }
    }
}

/// Where a player sat on a manager's roster for a week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterSlotAssignment {
    pub week: Week,
    pub manager_id: ManagerId,
    pub player_id: PlayerId,
    pub slot: PositionTag,
    pub started: bool,
}

/// A head-to-head pairing with realized scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub week: Week,
    pub matchup_id: MatchupId,
    pub team_a: ManagerId,
    pub team_b: ManagerId,
    pub score_a: Option<f64>,
    pub score_b: Option<f64>,
}

/// One side of a matchup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamWeekResult {
    pub week: Week,
    pub manager_id: ManagerId,
    pub points_for: f64,
    pub points_against: f64,
    /// Strict comparison: a tie credits nobody.
    pub won: bool,
}

impl Matchup {
    /// Split the matchup into its two team-week results.
    pub fn team_results(&self) -> [TeamWeekResult; 2] {
        let a = self.score_a.unwrap_or(0.0);
        let b = self.score_b.unwrap_or(0.0);
        [
            TeamWeekResult {
                week: self.week,
                manager_id: self.team_a.clone(),
                points_for: a,
                points_against: b,
                won: a > b,
            },
            TeamWeekResult {
                week: self.week,
                manager_id: self.team_b.clone(),
                points_for: b,
                points_against: a,
                won: b > a,
            },
        ]
    }
}

/// Forward fixture, read by downstream playoff-odds consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub week: Week,
    pub team_a: ManagerId,
    pub team_b: ManagerId,
}

/// Input rows written together by [`MetricsDatabase::upsert_inputs`].
///
/// [`MetricsDatabase::upsert_inputs`]: crate::storage::MetricsDatabase::upsert_inputs
#[derive(Debug, Clone, Copy, Default)]
pub struct InputBatch<'a> {
    pub managers: &'a [Manager],
    pub players: &'a [Player],
    pub player_stats: &'a [StatLine],
    pub rosters: &'a [RosterSlotAssignment],
    pub matchups: &'a [Matchup],
    pub schedule: &'a [ScheduleEntry],
}

/// Engine-owned lineup efficiency row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupEfficiencyRow {
    pub week: Week,
    pub manager_id: ManagerId,
    pub actual_pts: f64,
    pub optimal_pts: f64,
    pub regret: f64,
    pub efficiency: f64,
}

/// Engine-owned expected wins row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedWinRow {
    pub week: Week,
    pub manager_id: ManagerId,
    pub p_win: f64,
    pub cum_xw: f64,
}

/// One week's lineup efficiency joined with the team name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyReportRow {
    pub week: Week,
    pub manager_id: ManagerId,
    pub team_name: Option<String>,
    pub actual_pts: f64,
    pub optimal_pts: f64,
    pub regret: f64,
    pub efficiency: f64,
}

/// Season-to-date lineup efficiency for one manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonEfficiency {
    pub manager_id: ManagerId,
    pub team_name: Option<String>,
    pub weeks: u32,
    pub actual_pts: f64,
    pub optimal_pts: f64,
    pub regret: f64,
    /// Season actual over season optimal, 1 when nothing could be scored.
    pub efficiency: f64,
}
