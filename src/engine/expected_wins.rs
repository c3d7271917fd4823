//! Expected-wins engine: all-play win probability and its running total.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;

use crate::cli::types::{ManagerId, Week};
use crate::engine::WeekWindow;
use crate::error::{MetricsError, Result};
use crate::storage::models::{ExpectedWinRow, Matchup};

#[cfg(test)]
mod tests;

/// Tolerance for comparing stored and recomputed running totals.
pub const PREFIX_TOLERANCE: f64 = 1e-9;

/// All-play win probability for every team in one week.
///
/// Each team's score is compared against every *other* team's realized
/// score: a higher score counts 1, an equal one 0.5. The result is divided
/// by the number of opponents, so the week's probabilities sum to N/2. A
/// lone team gets 0.5.
///
/// Output order follows input order.
pub fn all_play(scores: &[(ManagerId, f64)]) -> Vec<(ManagerId, f64)> {
    let opponents = scores.len().saturating_sub(1);
    scores
        .iter()
        .enumerate()
        .map(|(i, (manager_id, mine))| {
            if opponents == 0 {
                return (manager_id.clone(), 0.5);
            }
            let mut beaten = 0usize;
            let mut tied = 0usize;
            for (j, (_, theirs)) in scores.iter().enumerate() {
                if i == j {
                    continue;
                }
                if mine > theirs {
                    beaten += 1;
                } else if mine == theirs {
                    tied += 1;
                }
            }
            let p = (beaten as f64 + 0.5 * tied as f64) / opponents as f64;
            (manager_id.clone(), p)
        })
        .collect()
}

/// Team weekly totals from realized matchup scores.
///
/// Matchups missing either score are skipped, which leaves both managers out
/// of that week. A manager seen twice in one week keeps the first score.
pub fn team_scores_by_week(
    matchups: &[Matchup],
    window: WeekWindow,
) -> BTreeMap<Week, Vec<(ManagerId, f64)>> {
    let mut by_week: BTreeMap<Week, Vec<(ManagerId, f64)>> = BTreeMap::new();
    let mut seen: BTreeSet<(Week, ManagerId)> = BTreeSet::new();

    for m in matchups.iter().filter(|m| window.contains(m.week)) {
        if m.score_a.is_none() || m.score_b.is_none() {
            tracing::debug!(matchup = %m.matchup_id, week = %m.week, "matchup without final scores skipped");
            continue;
        }
        for result in m.team_results() {
            if !seen.insert((result.week, result.manager_id.clone())) {
                tracing::warn!(
                    manager_id = %result.manager_id,
                    week = %result.week,
                    "manager appears in more than one matchup; keeping the first"
                );
                continue;
            }
            by_week
                .entry(result.week)
                .or_default()
                .push((result.manager_id, result.points_for));
        }
    }
    by_week
}

/// All-play probabilities for every week, computed in parallel across weeks.
pub fn weekly_p_wins(
    by_week: &BTreeMap<Week, Vec<(ManagerId, f64)>>,
) -> BTreeMap<Week, Vec<(ManagerId, f64)>> {
    by_week
        .par_iter()
        .map(|(week, scores)| (*week, all_play(scores)))
        .collect()
}

/// Turn weekly probabilities into rows with a running `cum_xw` per manager.
///
/// Rows come back ordered by manager, then week.
pub fn accumulate(p_wins: &BTreeMap<Week, Vec<(ManagerId, f64)>>) -> Vec<ExpectedWinRow> {
    let mut per_manager: BTreeMap<ManagerId, BTreeMap<Week, f64>> = BTreeMap::new();
    for (week, entries) in p_wins {
        for (manager_id, p) in entries {
            per_manager
                .entry(manager_id.clone())
                .or_default()
                .insert(*week, *p);
        }
    }

    per_manager
        .into_iter()
        .flat_map(|(manager_id, weeks)| prefix_rows(&manager_id, &weeks))
        .collect()
}

fn prefix_rows(manager_id: &ManagerId, weeks: &BTreeMap<Week, f64>) -> Vec<ExpectedWinRow> {
    let mut cum = 0.0;
    weeks
        .iter()
        .map(|(week, p)| {
            cum += p;
            ExpectedWinRow {
                week: *week,
                manager_id: manager_id.clone(),
                p_win: *p,
                cum_xw: cum,
            }
        })
        .collect()
}

/// Merge a partial recomputation into stored rows and rebuild every total.
///
/// Stored rows outside `window` keep their `p_win`. Inside the window the
/// fresh rows replace whatever was stored; a stored week with no fresh row
/// is dropped. `cum_xw` is then derived again from scratch for each
/// manager, so every week after the window picks up the change.
pub fn recompute_window(
    stored: &[ExpectedWinRow],
    fresh: &[ExpectedWinRow],
    window: WeekWindow,
) -> Vec<ExpectedWinRow> {
    let mut per_manager: BTreeMap<ManagerId, BTreeMap<Week, f64>> = BTreeMap::new();

    for row in stored.iter().filter(|r| !window.contains(r.week)) {
        per_manager
            .entry(row.manager_id.clone())
            .or_default()
            .insert(row.week, row.p_win);
    }
    for row in fresh.iter().filter(|r| window.contains(r.week)) {
        per_manager
            .entry(row.manager_id.clone())
            .or_default()
            .insert(row.week, row.p_win);
    }

    per_manager
        .into_iter()
        .flat_map(|(manager_id, weeks)| prefix_rows(&manager_id, &weeks))
        .collect()
}

/// Replace every week from `from_week` on and regenerate the totals.
pub fn recompute_from(
    stored: &[ExpectedWinRow],
    fresh: &[ExpectedWinRow],
    from_week: Week,
) -> Vec<ExpectedWinRow> {
    recompute_window(stored, fresh, WeekWindow::starting_at(from_week))
}

/// Check that every `cum_xw` equals the prefix sum of `p_win` by week.
///
/// Reports the earliest offending week of the first offending manager.
pub fn verify_prefix(rows: &[ExpectedWinRow]) -> Result<()> {
    let mut per_manager: BTreeMap<&ManagerId, Vec<&ExpectedWinRow>> = BTreeMap::new();
    for row in rows {
        per_manager.entry(&row.manager_id).or_default().push(row);
    }

    for (manager_id, mut manager_rows) in per_manager {
        manager_rows.sort_by_key(|r| r.week);
        let mut expected = 0.0;
        for row in manager_rows {
            expected += row.p_win;
            if (row.cum_xw - expected).abs() > PREFIX_TOLERANCE {
                return Err(MetricsError::InvariantViolation {
                    manager_id: manager_id.clone(),
                    week: row.week,
                    stored: row.cum_xw,
                    expected,
                });
            }
        }
    }
    Ok(())
}
