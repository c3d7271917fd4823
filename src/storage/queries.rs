//! Basic database query operations

use super::{models::*, schema::MetricsDatabase};
use crate::cli::types::{ManagerId, MatchupId, PlayerId, PositionTag, Week};
use crate::error::Result;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::{BTreeSet, HashMap};

fn put_manager(conn: &Connection, manager: &Manager) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO managers (manager_id, manager_name, team_name)
         VALUES (?, ?, ?)",
        params![
            manager.manager_id.as_str(),
            manager.manager_name,
            manager.team_name
        ],
    )?;
    Ok(())
}

fn put_player(conn: &Connection, player: &Player) -> Result<()> {
    let positions: Vec<&str> = player
        .eligible_positions
        .iter()
        .map(PositionTag::as_str)
        .collect();
    conn.execute(
        "INSERT OR REPLACE INTO players (player_id, name, pos_type, eligible_positions)
         VALUES (?, ?, ?, ?)",
        params![
            player.player_id.as_str(),
            player.name,
            player.pos_type,
            serde_json::to_string(&positions)?
        ],
    )?;
    Ok(())
}

/// Stats outside the stored columns are dropped; missing ones store 0.
fn put_stat_line(conn: &Connection, line: &StatLine) -> Result<()> {
    for stat in line.stats.keys() {
        if !STAT_COLUMNS.contains(&stat.as_str()) {
            tracing::debug!(player_id = %line.player_id, stat = %stat, "untracked stat not stored");
        }
    }

    let placeholders = vec!["?"; STAT_COLUMNS.len() + 2].join(", ");
    let sql = format!(
        "INSERT OR REPLACE INTO player_stats (week, player_id, {})
         VALUES ({})",
        STAT_COLUMNS.join(", "),
        placeholders
    );

    let mut values: Vec<Value> = Vec::with_capacity(STAT_COLUMNS.len() + 2);
    values.push(Value::Integer(i64::from(line.week.as_u16())));
    values.push(Value::Text(line.player_id.to_string()));
    values.extend(STAT_COLUMNS.iter().map(|c| Value::Real(line.get(c))));

    conn.execute(&sql, params_from_iter(values))?;
    Ok(())
}

fn put_roster_row(conn: &Connection, row: &RosterSlotAssignment) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO rosters (week, manager_id, player_id, slot, started)
         VALUES (?, ?, ?, ?, ?)",
        params![
            row.week.as_u16(),
            row.manager_id.as_str(),
            row.player_id.as_str(),
            row.slot.as_str(),
            row.started
        ],
    )?;
    Ok(())
}

fn put_matchup(conn: &Connection, matchup: &Matchup) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO matchups (week, matchup_id, team_a, team_b, score_a, score_b)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![
            matchup.week.as_u16(),
            matchup.matchup_id.as_str(),
            matchup.team_a.as_str(),
            matchup.team_b.as_str(),
            matchup.score_a,
            matchup.score_b
        ],
    )?;
    Ok(())
}

fn put_schedule_entry(conn: &Connection, entry: &ScheduleEntry) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schedule (week, team_a, team_b) VALUES (?, ?, ?)",
        params![
            entry.week.as_u16(),
            entry.team_a.as_str(),
            entry.team_b.as_str()
        ],
    )?;
    Ok(())
}

impl MetricsDatabase {
    /// Insert or update a manager
    pub fn upsert_manager(&mut self, manager: &Manager) -> Result<()> {
        put_manager(&self.conn, manager)
    }

    /// Insert or update a player's basic information
    pub fn upsert_player(&mut self, player: &Player) -> Result<()> {
        put_player(&self.conn, player)
    }

    /// Insert or replace a player's stat line for a week.
    pub fn upsert_stat_line(&mut self, line: &StatLine) -> Result<()> {
        put_stat_line(&self.conn, line)
    }

    /// Insert or update one roster row
    pub fn upsert_roster_row(&mut self, row: &RosterSlotAssignment) -> Result<()> {
        put_roster_row(&self.conn, row)
    }

    /// Insert or update a matchup and its scores
    pub fn upsert_matchup(&mut self, matchup: &Matchup) -> Result<()> {
        put_matchup(&self.conn, matchup)
    }

    pub fn upsert_schedule_entry(&mut self, entry: &ScheduleEntry) -> Result<()> {
        put_schedule_entry(&self.conn, entry)
    }

    /// Upsert a whole batch of input rows in one transaction.
    ///
    /// A failure on any row rolls back every row of the batch.
    pub fn upsert_inputs(&mut self, inputs: &InputBatch<'_>) -> Result<()> {
        let tx = self.conn.transaction()?;
        for manager in inputs.managers {
            put_manager(&tx, manager)?;
        }
        for player in inputs.players {
            put_player(&tx, player)?;
        }
        for line in inputs.player_stats {
            put_stat_line(&tx, line)?;
        }
        for row in inputs.rosters {
            put_roster_row(&tx, row)?;
        }
        for matchup in inputs.matchups {
            put_matchup(&tx, matchup)?;
        }
        for entry in inputs.schedule {
            put_schedule_entry(&tx, entry)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// All managers ordered by id
    pub fn get_managers(&self) -> Result<Vec<Manager>> {
        let mut stmt = self.conn.prepare(
            "SELECT manager_id, manager_name, team_name FROM managers ORDER BY manager_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Manager {
                manager_id: ManagerId::new(row.get::<_, String>(0)?),
                manager_name: row.get(1)?,
                team_name: row.get(2)?,
            })
        })?;

        let mut managers = Vec::new();
        for row in rows {
            managers.push(row?);
        }
        Ok(managers)
    }

    /// Every known player keyed by id
    pub fn get_players(&self) -> Result<HashMap<PlayerId, Player>> {
        let mut stmt = self.conn.prepare(
            "SELECT player_id, name, pos_type, eligible_positions FROM players",
        )?;
        let rows = stmt.query_map([], |row| self.row_to_player(row))?;

        let mut players = HashMap::new();
        for row in rows {
            let player = row?;
            players.insert(player.player_id.clone(), player);
        }
        Ok(players)
    }

    /// Stat lines recorded for a week, ordered by player
    pub fn get_stat_lines(&self, week: Week) -> Result<Vec<StatLine>> {
        let sql = format!(
            "SELECT week, player_id, {} FROM player_stats WHERE week = ? ORDER BY player_id",
            STAT_COLUMNS.join(", ")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![week.as_u16()], |row| self.row_to_stat_line(row))?;

        let mut lines = Vec::new();
        for row in rows {
            lines.push(row?);
        }
        Ok(lines)
    }

    /// Roster rows for a week, ordered by manager then player
    pub fn get_rosters(&self, week: Week) -> Result<Vec<RosterSlotAssignment>> {
        let mut stmt = self.conn.prepare(
            "SELECT week, manager_id, player_id, slot, started
             FROM rosters
             WHERE week = ?
             ORDER BY manager_id, player_id",
        )?;
        let rows = stmt.query_map(params![week.as_u16()], |row| {
            Ok(RosterSlotAssignment {
                week: Week::new(row.get(0)?),
                manager_id: ManagerId::new(row.get::<_, String>(1)?),
                player_id: PlayerId::new(row.get::<_, String>(2)?),
                slot: PositionTag::new(&row.get::<_, String>(3)?),
                started: row.get(4)?,
            })
        })?;

        let mut roster = Vec::new();
        for row in rows {
            roster.push(row?);
        }
        Ok(roster)
    }

    /// Matchups for weeks `from..=through`, ordered by week then matchup id
    pub fn get_matchups(&self, from: Week, through: Week) -> Result<Vec<Matchup>> {
        let mut stmt = self.conn.prepare(
            "SELECT week, matchup_id, team_a, team_b, score_a, score_b
             FROM matchups
             WHERE week BETWEEN ? AND ?
             ORDER BY week, matchup_id",
        )?;
        let rows = stmt.query_map(params![from.as_u16(), through.as_u16()], |row| {
            Ok(Matchup {
                week: Week::new(row.get(0)?),
                matchup_id: MatchupId::new(row.get::<_, String>(1)?),
                team_a: ManagerId::new(row.get::<_, String>(2)?),
                team_b: ManagerId::new(row.get::<_, String>(3)?),
                score_a: row.get(4)?,
                score_b: row.get(5)?,
            })
        })?;

        let mut matchups = Vec::new();
        for row in rows {
            matchups.push(row?);
        }
        Ok(matchups)
    }

    pub fn get_schedule(&self) -> Result<Vec<ScheduleEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT week, team_a, team_b FROM schedule ORDER BY week, team_a")?;
        let rows = stmt.query_map([], |row| {
            Ok(ScheduleEntry {
                week: Week::new(row.get(0)?),
                team_a: ManagerId::new(row.get::<_, String>(1)?),
                team_b: ManagerId::new(row.get::<_, String>(2)?),
            })
        })?;

        let mut schedule = Vec::new();
        for row in rows {
            schedule.push(row?);
        }
        Ok(schedule)
    }

    /// Managers with roster rows in a week
    pub fn get_rostered_managers(&self, week: Week) -> Result<BTreeSet<ManagerId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT manager_id FROM rosters WHERE week = ?")?;
        let rows = stmt.query_map(params![week.as_u16()], |row| row.get::<_, String>(0))?;

        let mut managers = BTreeSet::new();
        for row in rows {
            managers.insert(ManagerId::new(row?));
        }
        Ok(managers)
    }

    /// Highest week with a finished matchup, or week 1 before any game ends.
    ///
    /// A matchup counts as finished when both scores are present and at least
    /// one is non-zero.
    pub fn most_recent_completed_week(&self) -> Result<Week> {
        let week: Option<u16> = self
            .conn
            .query_row(
                "SELECT MAX(week) FROM matchups
                 WHERE score_a IS NOT NULL AND score_b IS NOT NULL
                   AND (score_a > 0 OR score_b > 0)",
                [],
                |row| row.get::<_, Option<u16>>(0),
            )
            .optional()?
            .flatten();
        Ok(week.map(Week::new).unwrap_or_default())
    }

    /// Lineup efficiency rows, optionally limited to one week
    pub fn get_lineup_efficiency(&self, week: Option<Week>) -> Result<Vec<LineupEfficiencyRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT week, manager_id, actual_pts, optimal_pts, regret, efficiency
             FROM lineup_efficiency
             WHERE ?1 IS NULL OR week = ?1
             ORDER BY week, manager_id",
        )?;
        let rows = stmt.query_map(params![week.map(|w| w.as_u16())], |row| {
            Ok(LineupEfficiencyRow {
                week: Week::new(row.get(0)?),
                manager_id: ManagerId::new(row.get::<_, String>(1)?),
                actual_pts: row.get(2)?,
                optimal_pts: row.get(3)?,
                regret: row.get(4)?,
                efficiency: row.get(5)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Every expected-wins row, ordered by manager then week
    pub fn get_expected_wins(&self) -> Result<Vec<ExpectedWinRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT week, manager_id, p_win, cum_xw
             FROM expected_wins
             ORDER BY manager_id, week",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ExpectedWinRow {
                week: Week::new(row.get(0)?),
                manager_id: ManagerId::new(row.get::<_, String>(1)?),
                p_win: row.get(2)?,
                cum_xw: row.get(3)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Persist one batch of engine output atomically.
    ///
    /// Lineup rows are upserted and `cleared` units lose any earlier row.
    /// `expected` is the full regenerated expected-wins table and replaces
    /// the stored one wholesale.
    pub fn write_metrics(
        &mut self,
        lineup: &[LineupEfficiencyRow],
        cleared: &[(Week, ManagerId)],
        expected: &[ExpectedWinRow],
    ) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut upsert = tx.prepare(
                "INSERT OR REPLACE INTO lineup_efficiency
                 (week, manager_id, actual_pts, optimal_pts, regret, efficiency)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )?;
            for row in lineup {
                upsert.execute(params![
                    row.week.as_u16(),
                    row.manager_id.as_str(),
                    row.actual_pts,
                    row.optimal_pts,
                    row.regret,
                    row.efficiency
                ])?;
            }

            let mut clear =
                tx.prepare("DELETE FROM lineup_efficiency WHERE week = ? AND manager_id = ?")?;
            for (week, manager_id) in cleared {
                clear.execute(params![week.as_u16(), manager_id.as_str()])?;
            }

            tx.execute("DELETE FROM expected_wins", [])?;
            let mut insert = tx.prepare(
                "INSERT INTO expected_wins (week, manager_id, p_win, cum_xw) VALUES (?, ?, ?, ?)",
            )?;
            for row in expected {
                insert.execute(params![
                    row.week.as_u16(),
                    row.manager_id.as_str(),
                    row.p_win,
                    row.cum_xw
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Helper function to convert a database row to Player
    fn row_to_player(&self, row: &Row) -> rusqlite::Result<Player> {
        let raw: String = row.get(3)?;
        let tags: Vec<String> = serde_json::from_str(&raw)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

        Ok(Player {
            player_id: PlayerId::new(row.get::<_, String>(0)?),
            name: row.get(1)?,
            pos_type: row.get(2)?,
            eligible_positions: tags.iter().map(|t| PositionTag::new(t)).collect(),
        })
    }

    /// Helper function to convert a database row to StatLine; zero columns are left out
    fn row_to_stat_line(&self, row: &Row) -> rusqlite::Result<StatLine> {
        let mut line = StatLine::new(
            Week::new(row.get(0)?),
            PlayerId::new(row.get::<_, String>(1)?),
        );
        for (i, stat) in STAT_COLUMNS.iter().enumerate() {
            let value: f64 = row.get(i + 2)?;
            if value != 0.0 {
                line.stats.insert(stat.to_string(), value);
            }
        }
        Ok(line)
    }
}
