//! Scoring engine: raw stat line → fantasy points.

use std::collections::BTreeMap;

use crate::cli::types::PlayerId;
use crate::error::{MetricsError, Result};
use crate::storage::models::{StatLine, STAT_COLUMNS};


/// Per-unit point values keyed by stat category.
///
/// Built once per run from the league file and passed by reference; the
/// engine never mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringRules {
    points: BTreeMap<String, f64>,
}

impl ScoringRules {
    /// Validate and wrap a stat → points mapping.
    ///
    /// Stat names are trimmed and lower-cased. Empty names, duplicate names
    /// after normalisation and non-finite weights are configuration errors.
    /// Names outside [`STAT_COLUMNS`] are accepted (the stat feed may grow
    /// new categories) but logged.
    pub fn new(points: BTreeMap<String, f64>) -> Result<Self> {
        let mut normalised = BTreeMap::new();
        for (stat, value) in points {
            let key = stat.trim().to_lowercase();
            if key.is_empty() {
                return Err(MetricsError::config("scoring rule with empty stat name"));
            }
            if !value.is_finite() {
                return Err(MetricsError::config(format!(
                    "scoring rule `{}` has non-finite value {}",
                    key, value
                )));
            }
            if !STAT_COLUMNS.contains(&key.as_str()) {
                tracing::warn!(stat = %key, "scoring rule names a stat outside the stored columns");
            }
            if normalised.insert(key.clone(), value).is_some() {
                return Err(MetricsError::config(format!(
                    "scoring rule `{}` is defined more than once",
                    key
                )));
            }
        }
        Ok(Self { points: normalised })
    }

    /// Half-PPR rules matching a default Yahoo league.
    pub fn standard() -> Self {
        let points = [
            ("pass_yds", 0.04),
            ("pass_td", 4.0),
            ("pass_int", -1.0),
            ("rush_yds", 0.1),
            ("rush_td", 6.0),
            ("rec", 0.5),
            ("rec_yds", 0.1),
            ("rec_td", 6.0),
            ("return_td", 6.0),
            ("two_pt", 2.0),
            ("fum_lost", -2.0),
            ("fum_ret_td", 6.0),
            ("fg_0_19", 3.0),
            ("fg_20_29", 3.0),
            ("fg_30_39", 3.0),
            ("fg_40_49", 4.0),
            ("fg_50_plus", 5.0),
            ("pat_made", 1.0),
            ("dst_sacks", 1.0),
            ("dst_int", 2.0),
            ("dst_fum_rec", 2.0),
            ("dst_td", 6.0),
            ("safeties", 2.0),
            ("blk_kick", 2.0),
            ("dst_ret_td", 6.0),
            ("pts_allow_0", 10.0),
            ("pts_allow_1_6", 7.0),
            ("pts_allow_7_13", 4.0),
            ("pts_allow_14_20", 1.0),
            ("pts_allow_21_27", 0.0),
            ("pts_allow_28_34", -1.0),
            ("pts_allow_35_plus", -4.0),
            ("xpr", 2.0),
        ]
        .into_iter()
        .map(|(stat, pts)| (stat.to_string(), pts))
        .collect();
        Self { points }
    }

    pub fn per_unit(&self, stat: &str) -> Option<f64> {
        self.points.get(stat).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.points.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Compute fantasy points for one player's week.
///
/// Weighted linear sum over the line's stats, visited in key order so the
/// result is bit-for-bit repeatable. Stats without a rule contribute nothing.
pub fn score(line: &StatLine, rules: &ScoringRules) -> f64 {
    let mut total = 0.0;
    for (stat, raw) in &line.stats {
        if let Some(per_unit) = rules.per_unit(stat) {
            total += raw * per_unit;
        }
    }
    total
}

/// Score every stat line of a week.
///
/// A player with two lines for the same week indicates an upstream bug; the
/// first line wins and the duplicate is logged.
pub fn score_week(lines: &[StatLine], rules: &ScoringRules) -> BTreeMap<PlayerId, f64> {
    let mut points = BTreeMap::new();
    for line in lines {
        if points.contains_key(&line.player_id) {
            tracing::warn!(
                player_id = %line.player_id,
                week = %line.week,
                "duplicate stat line ignored"
            );
            continue;
        }
        points.insert(line.player_id.clone(), score(line, rules));
    }
    points
}
