//! Lineup optimizer: best legal starting lineup vs the one actually started.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::cli::types::{ManagerId, PlayerId, PositionTag, Week};
use crate::engine::assignment::{max_cardinality, max_weight_assignment};
use crate::engine::eligibility::{validate_started_lineup, PlacementError, SlotCatalog};
use crate::error::MetricsError;
use crate::storage::models::{LineupEfficiencyRow, Player, RosterSlotAssignment};

#[cfg(test)]
mod tests;

/// A rostered player competing for starting slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub player_id: PlayerId,
    pub tags: BTreeSet<PositionTag>,
    pub points: f64,
}

/// One slot instance of the optimal lineup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotFill {
    pub slot: PositionTag,
    pub player_id: Option<PlayerId>,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimalLineup {
    pub total: f64,
    pub fills: Vec<SlotFill>,
    /// Slot instances no eligible player could fill at all.
    pub shortfall: usize,
}

/// Maximum-points legal assignment of `candidates` to the catalog's slots.
///
/// Slot instances are matched against players with Kuhn-Munkres; a
/// greedy per-slot fill can strand a flex-eligible scorer in a narrow slot.
/// Empty slots score zero. A slot is left empty rather than filled with a
/// negative scorer, so the result always dominates any legal started lineup.
pub fn optimize(candidates: &[Candidate], catalog: &SlotCatalog) -> OptimalLineup {
    let instances = catalog.instances();
    let weights: Vec<Vec<Option<f64>>> = instances
        .iter()
        .map(|slot| {
            candidates
                .iter()
                .map(|c| slot.admits(&c.tags).then_some(c.points))
                .collect()
        })
        .collect();

    let assignment = max_weight_assignment(&weights, candidates.len());
    let reachable = max_cardinality(&weights, candidates.len());

    let mut total = 0.0;
    let fills = instances
        .iter()
        .zip(assignment)
        .map(|(slot, col)| match col {
            Some(c) => {
                total += candidates[c].points;
                SlotFill {
                    slot: slot.code.clone(),
                    player_id: Some(candidates[c].player_id.clone()),
                    points: candidates[c].points,
                }
            }
            None => SlotFill {
                slot: slot.code.clone(),
                player_id: None,
                points: 0.0,
            },
        })
        .collect();

    OptimalLineup {
        total,
        fills,
        shortfall: instances.len() - reachable,
    }
}

/// Result of evaluating one (week, manager).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineupReport {
    pub row: LineupEfficiencyRow,
    pub optimal: OptimalLineup,
    #[serde(skip)]
    pub problems: Vec<PlacementError>,
}

impl LineupReport {
    /// Fewer eligible players than starting slots.
    pub fn is_partial(&self) -> bool {
        self.optimal.shortfall > 0
    }

    /// The recovered infeasibility, for batch reporting.
    pub fn infeasibility(&self) -> Option<MetricsError> {
        self.is_partial().then(|| MetricsError::InfeasibleAssignment {
            manager_id: self.row.manager_id.clone(),
            week: self.row.week,
            unfilled: self.optimal.shortfall,
            slots: self.optimal.fills.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineupOutcome {
    /// No roster rows at all, e.g. a bye or withdrawn team.
    NoData { week: Week, manager_id: ManagerId },
    Computed(LineupReport),
}

/// Build a lineup efficiency row from actual and optimal totals.
///
/// Regret is clamped at zero and efficiency into `[0, 1]`; both bounds only
/// bite when the recorded lineup was itself illegal or started negative
/// scorers.
pub fn efficiency_row(
    week: Week,
    manager_id: ManagerId,
    actual_pts: f64,
    optimal_pts: f64,
) -> LineupEfficiencyRow {
    let regret = (optimal_pts - actual_pts).max(0.0);
    let efficiency = if optimal_pts > 0.0 {
        (actual_pts / optimal_pts).clamp(0.0, 1.0)
    } else {
        1.0
    };
    LineupEfficiencyRow {
        week,
        manager_id,
        actual_pts,
        optimal_pts,
        regret,
        efficiency,
    }
}

/// Evaluate a manager's week: optimal lineup, actual lineup, regret.
///
/// Every rostered player competes, bench and IR included; a player without
/// a stat line scores zero. Roster rows for unknown players compete with no
/// position tags and so never start.
pub fn evaluate_lineup(
    week: Week,
    manager_id: &ManagerId,
    roster: &[RosterSlotAssignment],
    players: &HashMap<PlayerId, Player>,
    points: &BTreeMap<PlayerId, f64>,
    catalog: &SlotCatalog,
) -> LineupOutcome {
    if roster.is_empty() {
        return LineupOutcome::NoData {
            week,
            manager_id: manager_id.clone(),
        };
    }

    let candidates: Vec<Candidate> = roster
        .iter()
        .map(|r| Candidate {
            player_id: r.player_id.clone(),
            tags: players
                .get(&r.player_id)
                .map(|p| p.eligible_positions.clone())
                .unwrap_or_default(),
            points: points.get(&r.player_id).copied().unwrap_or(0.0),
        })
        .collect();

    let actual: f64 = roster
        .iter()
        .filter(|r| r.started)
        .map(|r| points.get(&r.player_id).copied().unwrap_or(0.0))
        .sum();

    let optimal = optimize(&candidates, catalog);
    let problems = validate_started_lineup(roster, players, catalog);

    LineupOutcome::Computed(LineupReport {
        row: efficiency_row(week, manager_id.clone(), actual, optimal.total),
        optimal,
        problems,
    })
}
