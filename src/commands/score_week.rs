//! Weekly scoring command implementation

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::types::{PlayerId, Week};
use crate::config::LeagueConfig;
use crate::engine::scoring::score_week;
use crate::storage::MetricsDatabase;
use crate::Result;

use super::{load_league_config, open_database};

/// Parameters for the score command
#[derive(Debug, Clone)]
pub struct ScoreParams {
    pub db: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub week: Week,
    pub player_name: Option<String>,
    pub as_json: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPlayer {
    pub player_id: PlayerId,
    pub name: Option<String>,
    pub points: f64,
}

/// Score a week's stat lines, highest first.
///
/// `player_name` keeps players whose name contains it, ignoring case.
pub fn scored_players(
    db: &MetricsDatabase,
    config: &LeagueConfig,
    week: Week,
    player_name: Option<&str>,
) -> Result<Vec<ScoredPlayer>> {
    let players = db.get_players()?;
    let points = score_week(&db.get_stat_lines(week)?, &config.scoring);
    let needle = player_name.map(str::to_lowercase);

    let mut scored: Vec<ScoredPlayer> = points
        .into_iter()
        .map(|(player_id, points)| ScoredPlayer {
            name: players.get(&player_id).map(|p| p.name.clone()),
            player_id,
            points,
        })
        .filter(|p| match &needle {
            Some(needle) => p
                .name
                .as_ref()
                .is_some_and(|name| name.to_lowercase().contains(needle)),
            None => true,
        })
        .collect();

    scored.sort_by(|a, b| {
        b.points
            .total_cmp(&a.points)
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
    Ok(scored)
}

/// Handle the score command
pub fn handle_score(params: ScoreParams) -> Result<()> {
    let config = load_league_config(params.config, params.verbose)?;
    let db = open_database(params.db, params.verbose)?;
    let scored = scored_players(&db, &config, params.week, params.player_name.as_deref())?;

    if params.as_json {
        println!("{}", serde_json::to_string_pretty(&scored)?);
        return Ok(());
    }

    if scored.is_empty() {
        println!("No stat lines found for week {}", params.week);
        return Ok(());
    }
    for player in &scored {
        println!(
            "{} {} [week {}] {:.2}",
            player.player_id,
            player.name.as_deref().unwrap_or("Unknown player"),
            params.week.as_u16(),
            player.points,
        );
    }
    Ok(())
}
