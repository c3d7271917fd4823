//! Unit tests for the expected-wins engine

use super::*;
use crate::cli::types::MatchupId;

fn mid(id: &str) -> ManagerId {
    ManagerId::new(id)
}

fn scores(entries: &[(&str, f64)]) -> Vec<(ManagerId, f64)> {
    entries.iter().map(|(id, s)| (mid(id), *s)).collect()
}

fn matchup(week: u16, id: &str, a: &str, b: &str, sa: Option<f64>, sb: Option<f64>) -> Matchup {
    Matchup {
        week: Week::new(week),
        matchup_id: MatchupId::new(id),
        team_a: mid(a),
        team_b: mid(b),
        score_a: sa,
        score_b: sb,
    }
}

fn p_of(results: &[(ManagerId, f64)], id: &str) -> f64 {
    results
        .iter()
        .find(|(m, _)| m.as_str() == id)
        .map(|(_, p)| *p)
        .unwrap()
}

#[cfg(test)]
mod all_play_tests {
    use super::*;

    #[test]
    fn test_tied_top_scores_share_credit() {
        let result = all_play(&scores(&[("A", 100.0), ("B", 100.0), ("C", 90.0), ("D", 80.0)]));

        assert!((p_of(&result, "A") - 2.5 / 3.0).abs() < 1e-12);
        assert!((p_of(&result, "B") - 2.5 / 3.0).abs() < 1e-12);
        assert!((p_of(&result, "C") - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(p_of(&result, "D"), 0.0);
    }

    #[test]
    fn test_week_sums_to_half_the_league() {
        let week = scores(&[
            ("A", 112.4),
            ("B", 98.0),
            ("C", 98.0),
            ("D", 130.2),
            ("E", 77.7),
            ("F", 101.5),
        ]);
        let total: f64 = all_play(&week).iter().map(|(_, p)| p).sum();
        assert!((total - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_team_league_matches_head_to_head() {
        let result = all_play(&scores(&[("A", 90.0), ("B", 85.0)]));
        assert_eq!(p_of(&result, "A"), 1.0);
        assert_eq!(p_of(&result, "B"), 0.0);

        let tied = all_play(&scores(&[("A", 90.0), ("B", 90.0)]));
        assert_eq!(p_of(&tied, "A"), 0.5);
        assert_eq!(p_of(&tied, "B"), 0.5);
    }

    #[test]
    fn test_lone_team_gets_half() {
        let result = all_play(&scores(&[("A", 90.0)]));
        assert_eq!(result, vec![(mid("A"), 0.5)]);
    }

    #[test]
    fn test_empty_week() {
        assert!(all_play(&[]).is_empty());
    }
}

#[cfg(test)]
mod all_play_proptests {
    use super::*;
    use proptest::prelude::*;

    /// Half-point steps so ties come up often.
    fn week_scores() -> impl Strategy<Value = Vec<(ManagerId, f64)>> {
        prop::collection::vec(0u32..80, 1..14).prop_map(|points| {
            points
                .into_iter()
                .enumerate()
                .map(|(i, p)| (mid(&format!("t.{}", i)), f64::from(p) * 0.5))
                .collect()
        })
    }

    proptest! {
        /// Property: each p_win lies in [0, 1]
        #[test]
        fn prop_probabilities_are_bounded(week in week_scores()) {
            for (_, p) in all_play(&week) {
                prop_assert!((0.0..=1.0).contains(&p), "p_win {}", p);
            }
        }

        /// Property: a week's p_win values sum to half the league size
        #[test]
        fn prop_week_sums_to_half_the_league(week in week_scores()) {
            let total: f64 = all_play(&week).iter().map(|(_, p)| p).sum();
            let half = week.len() as f64 / 2.0;
            prop_assert!((total - half).abs() < 1e-9, "{} vs {}", total, half);
        }

        /// Property: a higher score never earns a lower p_win
        #[test]
        fn prop_p_win_follows_score(week in week_scores()) {
            let result = all_play(&week);
            for ((_, a), (_, pa)) in week.iter().zip(&result) {
                for ((_, b), (_, pb)) in week.iter().zip(&result) {
                    if a > b {
                        prop_assert!(pa > pb);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod team_scores_tests {
    use super::*;

    #[test]
    fn test_scores_grouped_by_week() {
        let matchups = vec![
            matchup(1, "1", "A", "B", Some(100.0), Some(90.0)),
            matchup(1, "2", "C", "D", Some(80.0), Some(85.0)),
            matchup(2, "3", "A", "C", Some(70.0), Some(75.0)),
        ];
        let by_week = team_scores_by_week(&matchups, WeekWindow::all());

        assert_eq!(by_week.len(), 2);
        assert_eq!(by_week[&Week::new(1)].len(), 4);
        assert_eq!(
            by_week[&Week::new(2)],
            vec![(mid("A"), 70.0), (mid("C"), 75.0)]
        );
    }

    #[test]
    fn test_unscored_matchup_leaves_managers_out() {
        let matchups = vec![
            matchup(3, "1", "A", "B", Some(100.0), Some(90.0)),
            matchup(3, "2", "C", "D", None, None),
        ];
        let by_week = team_scores_by_week(&matchups, WeekWindow::all());
        let week = &by_week[&Week::new(3)];

        assert_eq!(week.len(), 2);
        assert!(week.iter().all(|(m, _)| m.as_str() == "A" || m.as_str() == "B"));
    }

    #[test]
    fn test_window_filters_weeks() {
        let matchups = vec![
            matchup(1, "1", "A", "B", Some(100.0), Some(90.0)),
            matchup(2, "2", "A", "B", Some(100.0), Some(90.0)),
            matchup(3, "3", "A", "B", Some(100.0), Some(90.0)),
        ];
        let by_week = team_scores_by_week(&matchups, WeekWindow::new(Week::new(2), Week::new(2)));
        assert_eq!(by_week.keys().copied().collect::<Vec<_>>(), vec![Week::new(2)]);
    }

    #[test]
    fn test_duplicate_manager_keeps_first_score() {
        let matchups = vec![
            matchup(1, "1", "A", "B", Some(100.0), Some(90.0)),
            matchup(1, "2", "A", "C", Some(10.0), Some(95.0)),
        ];
        let by_week = team_scores_by_week(&matchups, WeekWindow::all());
        let week = &by_week[&Week::new(1)];

        assert_eq!(week.iter().filter(|(m, _)| m.as_str() == "A").count(), 1);
        assert_eq!(p_of(week, "A"), 100.0);
        assert_eq!(p_of(week, "C"), 95.0);
    }
}

#[cfg(test)]
mod accumulate_tests {
    use super::*;

    fn season() -> BTreeMap<Week, Vec<(ManagerId, f64)>> {
        let mut by_week = BTreeMap::new();
        by_week.insert(Week::new(1), scores(&[("A", 100.0), ("B", 90.0), ("C", 80.0)]));
        by_week.insert(Week::new(2), scores(&[("A", 70.0), ("B", 90.0), ("C", 80.0)]));
        by_week.insert(Week::new(3), scores(&[("A", 95.0), ("B", 95.0), ("C", 60.0)]));
        by_week
    }

    #[test]
    fn test_weekly_p_wins_matches_sequential() {
        let by_week = season();
        let parallel = weekly_p_wins(&by_week);
        for (week, week_scores) in &by_week {
            assert_eq!(parallel[week], all_play(week_scores));
        }
    }

    #[test]
    fn test_cum_xw_is_prefix_sum() {
        let rows = accumulate(&weekly_p_wins(&season()));
        let a: Vec<&ExpectedWinRow> = rows.iter().filter(|r| r.manager_id.as_str() == "A").collect();

        assert_eq!(a.len(), 3);
        assert_eq!(a[0].p_win, 1.0);
        assert_eq!(a[0].cum_xw, 1.0);
        assert_eq!(a[1].p_win, 0.0);
        assert_eq!(a[1].cum_xw, 1.0);
        assert_eq!(a[2].p_win, 0.75);
        assert_eq!(a[2].cum_xw, 1.75);
        assert!(verify_prefix(&rows).is_ok());
    }

    #[test]
    fn test_rows_ordered_by_manager_then_week() {
        let rows = accumulate(&weekly_p_wins(&season()));
        let keys: Vec<(String, u16)> = rows
            .iter()
            .map(|r| (r.manager_id.to_string(), r.week.as_u16()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_absent_manager_week_is_skipped_not_zeroed() {
        let mut by_week = season();
        by_week.insert(Week::new(2), scores(&[("A", 70.0), ("B", 90.0)]));
        let rows = accumulate(&weekly_p_wins(&by_week));

        let c: Vec<&ExpectedWinRow> = rows.iter().filter(|r| r.manager_id.as_str() == "C").collect();
        assert_eq!(c.len(), 2);
        assert_eq!(c[0].week, Week::new(1));
        assert_eq!(c[1].week, Week::new(3));
        assert_eq!(c[1].cum_xw, c[0].p_win + c[1].p_win);
    }
}

#[cfg(test)]
mod recompute_tests {
    use super::*;

    fn row(week: u16, id: &str, p_win: f64, cum_xw: f64) -> ExpectedWinRow {
        ExpectedWinRow {
            week: Week::new(week),
            manager_id: mid(id),
            p_win,
            cum_xw,
        }
    }

    #[test]
    fn test_correction_cascades_forward() {
        let stored = vec![
            row(1, "A", 0.5, 0.5),
            row(2, "A", 0.25, 0.75),
            row(3, "A", 1.0, 1.75),
            row(4, "A", 0.5, 2.25),
        ];
        let fresh = vec![row(2, "A", 0.75, 0.75)];
        let merged = recompute_window(&stored, &fresh, WeekWindow::new(Week::new(2), Week::new(2)));

        let cum: Vec<f64> = merged.iter().map(|r| r.cum_xw).collect();
        assert_eq!(cum, vec![0.5, 1.25, 2.25, 2.75]);
        assert!(verify_prefix(&merged).is_ok());
    }

    #[test]
    fn test_partial_recompute_matches_full_recompute() {
        let mut by_week = BTreeMap::new();
        for w in 1..=5u16 {
            by_week.insert(
                Week::new(w),
                scores(&[("A", 90.0 + w as f64), ("B", 100.0 - w as f64), ("C", 95.0)]),
            );
        }
        let stored = accumulate(&weekly_p_wins(&by_week));

        // Week 3 scores get corrected.
        by_week.insert(Week::new(3), scores(&[("A", 60.0), ("B", 120.0), ("C", 95.0)]));
        let full = accumulate(&weekly_p_wins(&by_week));

        let window = WeekWindow::new(Week::new(3), Week::new(5));
        let mut partial_input = BTreeMap::new();
        for (week, s) in by_week.range(Week::new(3)..=Week::new(5)) {
            partial_input.insert(*week, s.clone());
        }
        let fresh = accumulate(&weekly_p_wins(&partial_input));
        let merged = recompute_window(&stored, &fresh, window);

        assert_eq!(merged, full);
    }

    #[test]
    fn test_recompute_from_replaces_tail() {
        let stored = vec![row(1, "A", 1.0, 1.0), row(2, "A", 1.0, 2.0), row(3, "A", 1.0, 3.0)];
        let fresh = vec![row(2, "A", 0.0, 0.0), row(3, "A", 0.5, 0.5)];
        let merged = recompute_from(&stored, &fresh, Week::new(2));

        assert_eq!(
            merged,
            vec![row(1, "A", 1.0, 1.0), row(2, "A", 0.0, 1.0), row(3, "A", 0.5, 1.5)]
        );
    }

    #[test]
    fn test_stored_week_without_fresh_row_is_dropped() {
        let stored = vec![row(1, "A", 0.5, 0.5), row(2, "A", 1.0, 1.5), row(3, "A", 0.0, 1.5)];
        let merged = recompute_window(&stored, &[], WeekWindow::new(Week::new(2), Week::new(2)));

        assert_eq!(merged, vec![row(1, "A", 0.5, 0.5), row(3, "A", 0.0, 0.5)]);
    }
}

#[cfg(test)]
mod verify_tests {
    use super::*;

    #[test]
    fn test_empty_rows_verify() {
        assert!(verify_prefix(&[]).is_ok());
    }

    #[test]
    fn test_drifted_total_is_reported() {
        let rows = vec![
            ExpectedWinRow {
                week: Week::new(1),
                manager_id: mid("A"),
                p_win: 0.5,
                cum_xw: 0.5,
            },
            ExpectedWinRow {
                week: Week::new(2),
                manager_id: mid("A"),
                p_win: 0.5,
                cum_xw: 1.5,
            },
        ];

        match verify_prefix(&rows) {
            Err(MetricsError::InvariantViolation {
                manager_id,
                week,
                stored,
                expected,
            }) => {
                assert_eq!(manager_id, mid("A"));
                assert_eq!(week, Week::new(2));
                assert_eq!(stored, 1.5);
                assert_eq!(expected, 1.0);
            }
            other => panic!("expected invariant violation, got {:?}", other),
        }
    }

    #[test]
    fn test_unsorted_rows_are_checked_in_week_order() {
        let rows = vec![
            ExpectedWinRow {
                week: Week::new(2),
                manager_id: mid("A"),
                p_win: 1.0,
                cum_xw: 1.5,
            },
            ExpectedWinRow {
                week: Week::new(1),
                manager_id: mid("A"),
                p_win: 0.5,
                cum_xw: 0.5,
            },
        ];
        assert!(verify_prefix(&rows).is_ok());
    }
}
