//! Report commands: lineup efficiency and luck

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::cli::types::{ManagerId, Week};
use crate::engine::standings::{luck_index, LuckRow};
use crate::storage::MetricsDatabase;
use crate::Result;

use super::open_database;

/// Luck row with the team name attached for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LuckReportRow {
    pub team_name: Option<String>,
    #[serde(flatten)]
    pub luck: LuckRow,
}

fn team_names(db: &MetricsDatabase) -> Result<HashMap<ManagerId, String>> {
    Ok(db
        .get_managers()?
        .into_iter()
        .map(|m| (m.manager_id, m.team_name))
        .collect())
}

fn display_name(team_name: Option<&str>, manager_id: &ManagerId) -> String {
    team_name
        .unwrap_or(manager_id.as_str())
        .chars()
        .take(24)
        .collect()
}

/// Luck index through `through_week` with team names.
pub fn luck_report(db: &MetricsDatabase, through_week: Week) -> Result<Vec<LuckReportRow>> {
    let matchups = db.get_matchups(Week::new(1), through_week)?;
    let expected = db.get_expected_wins()?;
    let names = team_names(db)?;

    Ok(luck_index(&matchups, &expected, through_week)
        .into_iter()
        .map(|luck| LuckReportRow {
            team_name: names.get(&luck.manager_id).cloned(),
            luck,
        })
        .collect())
}

/// Handle `report efficiency`
///
/// With a week, prints that week's table ordered by regret; without one,
/// prints season totals through the most recent completed week.
pub fn handle_efficiency_report(
    db: Option<PathBuf>,
    week: Option<Week>,
    as_json: bool,
) -> Result<()> {
    let db = open_database(db, false)?;

    match week {
        Some(week) => {
            let report = db.get_efficiency_report(week)?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            println!("Lineup Efficiency for Week {}", week.as_u16());
            println!();
            println!(
                "{:<24} {:<8} {:<8} {:<8} {:<8}",
                "Team", "Actual", "Optimal", "Regret", "Eff%"
            );
            println!(
                "{:<24} {:<8} {:<8} {:<8} {:<8}",
                "----", "------", "-------", "------", "----"
            );
            for row in report {
                println!(
                    "{:<24} {:<8.2} {:<8.2} {:<8.2} {:<8.1}",
                    display_name(row.team_name.as_deref(), &row.manager_id),
                    row.actual_pts,
                    row.optimal_pts,
                    row.regret,
                    row.efficiency * 100.0
                );
            }
            if let Some(leader) = db.get_regret_leader(week)? {
                println!();
                println!(
                    "Most points left on the bench: {} ({:.2})",
                    display_name(leader.team_name.as_deref(), &leader.manager_id),
                    leader.regret
                );
            }
        }
        None => {
            let through = db.most_recent_completed_week()?;
            let summary = db.get_season_efficiency(through)?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            println!("Season Lineup Efficiency through Week {}", through.as_u16());
            println!();
            println!(
                "{:<24} {:<6} {:<9} {:<9} {:<8} {:<8}",
                "Team", "Weeks", "Actual", "Optimal", "Regret", "Eff%"
            );
            println!(
                "{:<24} {:<6} {:<9} {:<9} {:<8} {:<8}",
                "----", "-----", "------", "-------", "------", "----"
            );
            for row in summary {
                println!(
                    "{:<24} {:<6} {:<9.2} {:<9.2} {:<8.2} {:<8.1}",
                    display_name(row.team_name.as_deref(), &row.manager_id),
                    row.weeks,
                    row.actual_pts,
                    row.optimal_pts,
                    row.regret,
                    row.efficiency * 100.0
                );
            }
        }
    }
    Ok(())
}

/// Handle `report luck`
pub fn handle_luck_report(
    db: Option<PathBuf>,
    through_week: Option<Week>,
    as_json: bool,
) -> Result<()> {
    let db = open_database(db, false)?;
    let through = match through_week {
        Some(week) => week,
        None => db.most_recent_completed_week()?,
    };
    let report = luck_report(&db, through)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Luck Index through Week {}", through.as_u16());
    println!();
    println!("{:<24} {:<6} {:<8} {:<8}", "Team", "Wins", "xWins", "Luck");
    println!("{:<24} {:<6} {:<8} {:<8}", "----", "----", "-----", "----");
    for row in report {
        let luck = if row.luck.luck > 0.0 {
            format!("+{:.2}", row.luck.luck)
        } else {
            format!("{:.2}", row.luck.luck)
        };
        println!(
            "{:<24} {:<6} {:<8.2} {:<8}",
            display_name(row.team_name.as_deref(), &row.luck.manager_id),
            row.luck.actual_wins,
            row.luck.expected_wins,
            luck
        );
    }
    Ok(())
}
