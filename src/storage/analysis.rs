//! Report queries over the computed metrics tables

use super::{models::*, schema::MetricsDatabase};
use crate::cli::types::{ManagerId, Week};
use crate::error::Result;
use rusqlite::params;

impl MetricsDatabase {
    /// Lineup efficiency for one week, biggest regret first
    pub fn get_efficiency_report(&self, week: Week) -> Result<Vec<EfficiencyReportRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.week, e.manager_id, m.team_name,
                    e.actual_pts, e.optimal_pts, e.regret, e.efficiency
             FROM lineup_efficiency e
             LEFT JOIN managers m ON m.manager_id = e.manager_id
             WHERE e.week = ?
             ORDER BY e.regret DESC, e.manager_id",
        )?;

        let rows = stmt.query_map(params![week.as_u16()], |row| {
            Ok(EfficiencyReportRow {
                week: Week::new(row.get(0)?),
                manager_id: ManagerId::new(row.get::<_, String>(1)?),
                team_name: row.get(2)?,
                actual_pts: row.get(3)?,
                optimal_pts: row.get(4)?,
                regret: row.get(5)?,
                efficiency: row.get(6)?,
            })
        })?;

        let mut report = Vec::new();
        for row in rows {
            report.push(row?);
        }
        Ok(report)
    }

    /// Season totals through `through_week`, most efficient manager first
    pub fn get_season_efficiency(&self, through_week: Week) -> Result<Vec<SeasonEfficiency>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.manager_id, m.team_name, COUNT(*) as weeks,
                    SUM(e.actual_pts), SUM(e.optimal_pts), SUM(e.regret)
             FROM lineup_efficiency e
             LEFT JOIN managers m ON m.manager_id = e.manager_id
             WHERE e.week <= ?
             GROUP BY e.manager_id, m.team_name
             ORDER BY e.manager_id",
        )?;

        let rows = stmt.query_map(params![through_week.as_u16()], |row| {
            let actual_pts: f64 = row.get(3)?;
            let optimal_pts: f64 = row.get(4)?;
            let efficiency = if optimal_pts > 0.0 {
                (actual_pts / optimal_pts).clamp(0.0, 1.0)
            } else {
                1.0
            };
            Ok(SeasonEfficiency {
                manager_id: ManagerId::new(row.get::<_, String>(0)?),
                team_name: row.get(1)?,
                weeks: row.get(2)?,
                actual_pts,
                optimal_pts,
                regret: row.get(5)?,
                efficiency,
            })
        })?;

        let mut summary = Vec::new();
        for row in rows {
            summary.push(row?);
        }
        summary.sort_by(|a, b| {
            b.efficiency
                .total_cmp(&a.efficiency)
                .then_with(|| a.manager_id.cmp(&b.manager_id))
        });
        Ok(summary)
    }

    /// Manager who left the most points on the bench in a week
    pub fn get_regret_leader(&self, week: Week) -> Result<Option<EfficiencyReportRow>> {
        Ok(self
            .get_efficiency_report(week)?
            .into_iter()
            .find(|row| row.regret > 0.0))
    }
}
