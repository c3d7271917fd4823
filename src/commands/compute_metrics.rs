//! Metrics batch: lineup efficiency and expected wins for a range of weeks.
//!
//! The batch reads every input it needs up front, checks the league
//! configuration against the stored rosters, computes all units in parallel
//! and writes the results in one transaction. A configuration problem stops
//! the run before anything is written; a problem with one (week, manager)
//! unit is reported and its siblings carry on.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;

use rayon::prelude::*;
use serde::Serialize;

use crate::cli::types::{ManagerId, PlayerId, Week};
use crate::config::LeagueConfig;
use crate::engine::expected_wins::{
    accumulate, recompute_window, team_scores_by_week, verify_prefix, weekly_p_wins,
};
use crate::engine::lineup::{evaluate_lineup, LineupOutcome};
use crate::engine::scoring::score_week;
use crate::engine::WeekWindow;
use crate::error::{MetricsError, Result};
use crate::storage::{LineupEfficiencyRow, MetricsDatabase, Player, RosterSlotAssignment};
use crate::THREADS_ENV_VAR;

use super::{load_league_config, open_database};

/// Parameters for the compute command
#[derive(Debug, Clone, Default)]
pub struct ComputeParams {
    pub db: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub from_week: Option<Week>,
    pub through_week: Option<Week>,
    pub verbose: bool,
}

/// What happened to one (week, manager) unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UnitStatus {
    Written,
    /// Written, but some starting slots had no eligible player.
    Partial { unfilled: usize },
    /// Nothing to evaluate; any earlier row for the unit is removed.
    NoData,
    /// Not written; the reason is kept for the report.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitReport {
    pub week: Week,
    pub manager_id: ManagerId,
    #[serde(flatten)]
    pub status: UnitStatus,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub from_week: Week,
    pub through_week: Week,
    pub units: Vec<UnitReport>,
    pub expected_win_rows: usize,
}

impl BatchReport {
    fn count(&self, pred: impl Fn(&UnitStatus) -> bool) -> usize {
        self.units.iter().filter(|u| pred(&u.status)).count()
    }

    pub fn written(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Written | UnitStatus::Partial { .. }))
    }

    pub fn partial(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Partial { .. }))
    }

    pub fn no_data(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::NoData))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, UnitStatus::Failed { .. }))
    }
}

/// Everything the lineup step needs for one week.
struct WeekInputs {
    rosters: BTreeMap<ManagerId, Vec<RosterSlotAssignment>>,
    rostered: BTreeSet<ManagerId>,
    points: BTreeMap<PlayerId, f64>,
    scheduled: BTreeSet<ManagerId>,
}

fn thread_count() -> Option<usize> {
    std::env::var(THREADS_ENV_VAR)
        .ok()
        .and_then(|val| val.trim().parse::<usize>().ok())
        .map(|n| n.clamp(1, 32))
}

/// Run `action` on a pool sized by the threads variable, or on rayon's
/// global pool when the variable is unset or the pool cannot be built.
pub fn with_pool<T>(action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    let Some(threads) = thread_count() else {
        return action();
    };
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(e) => {
            tracing::warn!(error = %e, "could not build worker pool; using the global pool");
            action()
        }
    }
}

/// Reject rosters that start players in slots the league doesn't have.
///
/// Unknown codes on benched rows (e.g. a platform's not-active slot) pass.
fn check_roster_slots(
    window: WeekWindow,
    inputs: &BTreeMap<Week, WeekInputs>,
    config: &LeagueConfig,
) -> Result<()> {
    for (week, week_inputs) in inputs.iter().filter(|(w, _)| window.contains(**w)) {
        for (manager_id, rows) in &week_inputs.rosters {
            if let Some(row) = rows
                .iter()
                .find(|r| r.started && !config.catalog.recognizes(&r.slot))
            {
                return Err(MetricsError::config(format!(
                    "roster slot {} (manager {}, week {}) is not in the league catalog",
                    row.slot, manager_id, week
                )));
            }
        }
    }
    Ok(())
}

fn load_week_inputs(
    db: &MetricsDatabase,
    config: &LeagueConfig,
    week: Week,
    scheduled: BTreeSet<ManagerId>,
) -> Result<WeekInputs> {
    let mut rosters: BTreeMap<ManagerId, Vec<RosterSlotAssignment>> = BTreeMap::new();
    for row in db.get_rosters(week)? {
        rosters.entry(row.manager_id.clone()).or_default().push(row);
    }
    let rostered = db.get_rostered_managers(week)?;
    let points = score_week(&db.get_stat_lines(week)?, &config.scoring);

    Ok(WeekInputs {
        rosters,
        rostered,
        points,
        scheduled,
    })
}

fn evaluate_unit(
    week: Week,
    manager_id: &ManagerId,
    inputs: &WeekInputs,
    players: &HashMap<PlayerId, Player>,
    config: &LeagueConfig,
) -> Result<(UnitReport, Option<LineupEfficiencyRow>)> {
    let roster = inputs
        .rosters
        .get(manager_id)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    if roster.is_empty() && inputs.scheduled.contains(manager_id) {
        return Err(MetricsError::MissingInput {
            what: format!("roster for manager {}", manager_id),
            week,
        });
    }

    for row in roster {
        if !players.contains_key(&row.player_id) {
            tracing::warn!(player_id = %row.player_id, %manager_id, %week, "rostered player is unknown; treated as ineligible");
        }
    }

    let outcome = evaluate_lineup(
        week,
        manager_id,
        roster,
        players,
        &inputs.points,
        &config.catalog,
    );
    match outcome {
        LineupOutcome::NoData { week, manager_id } => {
            tracing::debug!(%manager_id, %week, "no roster data");
            Ok((
                UnitReport {
                    week,
                    manager_id,
                    status: UnitStatus::NoData,
                },
                None,
            ))
        }
        LineupOutcome::Computed(report) => {
            for problem in &report.problems {
                tracing::warn!(%manager_id, %week, problem = %problem, "recorded lineup is not legal");
            }
            let status = match report.infeasibility() {
                Some(err) => {
                    tracing::warn!(error = %err, "partial optimal lineup");
                    UnitStatus::Partial {
                        unfilled: report.optimal.shortfall,
                    }
                }
                None => UnitStatus::Written,
            };
            tracing::debug!(
                %manager_id,
                %week,
                actual = report.row.actual_pts,
                optimal = report.row.optimal_pts,
                "lineup evaluated"
            );
            Ok((
                UnitReport {
                    week,
                    manager_id: manager_id.clone(),
                    status,
                },
                Some(report.row),
            ))
        }
    }
}

/// Compute and persist metrics for `window`.
///
/// Reruns over the same inputs write identical rows. Expected wins are
/// regenerated for every manager so later weeks pick up any change inside
/// the window.
pub fn run_batch(
    db: &mut MetricsDatabase,
    config: &LeagueConfig,
    window: WeekWindow,
) -> Result<BatchReport> {
    if window.is_empty() {
        return Err(MetricsError::config(format!(
            "from-week {} is after through-week {}",
            window.from, window.through
        )));
    }
    tracing::info!(from = %window.from, through = %window.through, "metrics batch started");

    // Inputs
    let players = db.get_players()?;
    let managers: BTreeSet<ManagerId> = db
        .get_managers()?
        .into_iter()
        .map(|m| m.manager_id)
        .collect();
    let matchups = db.get_matchups(window.from, window.through)?;

    let mut inputs: BTreeMap<Week, WeekInputs> = BTreeMap::new();
    for week in window.weeks() {
        let scheduled: BTreeSet<ManagerId> = matchups
            .iter()
            .filter(|m| m.week == week)
            .flat_map(|m| [m.team_a.clone(), m.team_b.clone()])
            .collect();
        inputs.insert(week, load_week_inputs(db, config, week, scheduled)?);
    }
    check_roster_slots(window, &inputs, config)?;

    let stored = db.get_expected_wins()?;
    if window.from > Week::new(1) {
        verify_prefix(&stored)?;
    }

    // Lineups
    let units: Vec<(Week, ManagerId)> = inputs
        .iter()
        .flat_map(|(week, week_inputs)| {
            let mut expected: BTreeSet<ManagerId> = managers.clone();
            expected.extend(week_inputs.rostered.iter().cloned());
            expected.extend(week_inputs.scheduled.iter().cloned());
            expected.into_iter().map(move |m| (*week, m))
        })
        .collect();
    tracing::info!(units = units.len(), "evaluating lineups");

    let evaluated: Vec<Result<(UnitReport, Option<LineupEfficiencyRow>)>> = units
        .par_iter()
        .map(|(week, manager_id)| match inputs.get(week) {
            Some(week_inputs) => evaluate_unit(*week, manager_id, week_inputs, &players, config),
            None => Ok((
                UnitReport {
                    week: *week,
                    manager_id: manager_id.clone(),
                    status: UnitStatus::NoData,
                },
                None,
            )),
        })
        .collect();

    let mut reports = Vec::with_capacity(evaluated.len());
    let mut lineup_rows = Vec::new();
    let mut cleared = Vec::new();
    for ((week, manager_id), result) in units.iter().zip(evaluated) {
        let (report, row) = match result {
            Ok(unit) => unit,
            Err(err) if err.is_unit_local() => {
                tracing::warn!(%manager_id, %week, error = %err, "unit skipped");
                let report = UnitReport {
                    week: *week,
                    manager_id: manager_id.clone(),
                    status: UnitStatus::Failed {
                        reason: err.to_string(),
                    },
                };
                (report, None)
            }
            Err(err) => return Err(err),
        };
        if report.status == UnitStatus::NoData {
            cleared.push((report.week, report.manager_id.clone()));
        }
        if let Some(row) = row {
            lineup_rows.push(row);
        }
        reports.push(report);
    }

    // Expected wins
    tracing::info!("computing expected wins");
    let fresh = accumulate(&weekly_p_wins(&team_scores_by_week(&matchups, window)));
    let expected = recompute_window(&stored, &fresh, window);

    db.write_metrics(&lineup_rows, &cleared, &expected)?;

    let report = BatchReport {
        from_week: window.from,
        through_week: window.through,
        units: reports,
        expected_win_rows: expected.len(),
    };
    tracing::info!(
        written = report.written(),
        partial = report.partial(),
        no_data = report.no_data(),
        failed = report.failed(),
        "metrics batch finished"
    );
    Ok(report)
}

/// Handle the compute command
pub fn handle_compute(params: ComputeParams) -> Result<()> {
    let config = load_league_config(params.config, params.verbose)?;
    let mut db = open_database(params.db, params.verbose)?;

    let through = match params.through_week {
        Some(week) => week,
        None => db.most_recent_completed_week()?,
    };
    let from = params.from_week.unwrap_or_default();
    println!("Computing metrics for weeks {} through {}...", from, through);

    let report = with_pool(|| run_batch(&mut db, &config, WeekWindow::new(from, through)))?;

    println!(
        "✓ Lineup efficiency: {} written ({} partial), {} without data, {} failed",
        report.written(),
        report.partial(),
        report.no_data(),
        report.failed()
    );
    println!("✓ Expected wins: {} rows", report.expected_win_rows);

    for unit in &report.units {
        match &unit.status {
            UnitStatus::Failed { reason } => {
                println!("⚠ Week {} {}: {}", unit.week, unit.manager_id, reason);
            }
            UnitStatus::Partial { unfilled } if params.verbose => {
                println!(
                    "  Week {} {}: {} starting slot(s) could not be filled",
                    unit.week, unit.manager_id, unfilled
                );
            }
            UnitStatus::NoData if params.verbose => {
                println!("  Week {} {}: no roster data", unit.week, unit.manager_id);
            }
            _ => {}
        }
    }

    Ok(())
}
