//! Unit tests for the lineup optimizer

use super::*;
use crate::engine::eligibility::SlotCategory;

const TAG_SETS: &[&[&str]] = &[
    &["QB"],
    &["RB"],
    &["WR"],
    &["TE"],
    &["WR", "TE"],
    &["RB", "WR"],
    &["K"],
    &["DEF"],
];

#[cfg(test)]
mod optimizer_tests {
    use super::*;
    use proptest::prelude::*;

    fn candidate(id: &str, tags: &[&str], points: f64) -> Candidate {
        Candidate {
            player_id: PlayerId::new(id),
            tags: tags.iter().map(|t| PositionTag::new(t)).collect(),
            points,
        }
    }

    fn small_catalog() -> SlotCatalog {
        SlotCatalog::new(vec![
            SlotCategory::new("QB", 1, &["QB"]),
            SlotCategory::new("RB", 1, &["RB"]),
            SlotCategory::new("FLEX", 1, &["FLEX"]),
        ])
        .unwrap()
    }

    /// Exhaustive search over every legal assignment.
    fn brute_force(candidates: &[Candidate], catalog: &SlotCatalog) -> f64 {
        fn go(
            idx: usize,
            instances: &[&SlotCategory],
            candidates: &[Candidate],
            used: &mut Vec<bool>,
        ) -> f64 {
            if idx == instances.len() {
                return 0.0;
            }
            // Leave this slot empty.
            let mut best = go(idx + 1, instances, candidates, used);
            for (i, c) in candidates.iter().enumerate() {
                if used[i] || !instances[idx].admits(&c.tags) {
                    continue;
                }
                used[i] = true;
                let value = c.points + go(idx + 1, instances, candidates, used);
                used[i] = false;
                if value > best {
                    best = value;
                }
            }
            best
        }

        let instances = catalog.instances();
        let mut used = vec![false; candidates.len()];
        go(0, &instances, candidates, &mut used)
    }

    /// Between one and `max` players with quarter-point scores in [-5, 35).
    fn roster_strategy(max: usize) -> impl Strategy<Value = Vec<Candidate>> {
        prop::collection::vec((0..TAG_SETS.len(), 0u32..160), 1..=max).prop_map(|picks| {
            picks
                .into_iter()
                .enumerate()
                .map(|(i, (tags, steps))| {
                    candidate(&format!("p{}", i), TAG_SETS[tags], f64::from(steps) * 0.25 - 5.0)
                })
                .collect()
        })
    }

    fn flex_catalog() -> SlotCatalog {
        SlotCatalog::new(vec![
            SlotCategory::new("QB", 1, &["QB"]),
            SlotCategory::new("RB", 1, &["RB"]),
            SlotCategory::new("WR", 1, &["WR"]),
            SlotCategory::new("W/R/T", 1, &["WR", "RB", "TE"]),
            SlotCategory::new("Q/W/R/T", 1, &["QB", "WR", "RB", "TE"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_simple_assignment_scenario() {
        let catalog = small_catalog();
        let candidates = vec![
            candidate("qb", &["QB"], 10.0),
            candidate("rb", &["RB"], 8.0),
            candidate("flex", &["RB", "FLEX"], 12.0),
        ];

        let lineup = optimize(&candidates, &catalog);

        assert_eq!(lineup.total, 30.0);
        assert_eq!(lineup.shortfall, 0);
        let flex = lineup
            .fills
            .iter()
            .find(|f| f.slot.as_str() == "FLEX")
            .unwrap();
        assert_eq!(flex.player_id, Some(PlayerId::new("flex")));
    }

    #[test]
    fn test_flex_overlap_beats_greedy() {
        // Greedy fills RB with the 20-point dual-eligible player and leaves
        // WR empty; the optimum moves that player to WR.
        let catalog = SlotCatalog::new(vec![
            SlotCategory::new("RB", 1, &["RB"]),
            SlotCategory::new("WR", 1, &["WR"]),
        ])
        .unwrap();
        let candidates = vec![
            candidate("dual", &["RB", "WR"], 20.0),
            candidate("rb", &["RB"], 15.0),
            candidate("te", &["TE"], 30.0),
        ];

        let lineup = optimize(&candidates, &catalog);
        assert_eq!(lineup.total, 35.0);
    }

    #[test]
    fn test_shortfall_when_too_few_eligible() {
        let catalog = small_catalog();
        let candidates = vec![candidate("qb", &["QB"], 18.0), candidate("k", &["K"], 9.0)];

        let lineup = optimize(&candidates, &catalog);

        assert_eq!(lineup.total, 18.0);
        assert_eq!(lineup.shortfall, 2);
        assert_eq!(lineup.fills.iter().filter(|f| f.player_id.is_none()).count(), 2);
    }

    #[test]
    fn test_negative_scorer_not_started() {
        let catalog = small_catalog();
        let candidates = vec![candidate("qb", &["QB"], -3.0), candidate("rb", &["RB"], 6.0)];

        let lineup = optimize(&candidates, &catalog);

        assert_eq!(lineup.total, 6.0);
        // The QB could have been placed, so it isn't a shortfall.
        assert_eq!(lineup.shortfall, 1);
    }

    #[test]
    fn test_repeatable_output() {
        let catalog = flex_catalog();
        // Several equal-scoring players compete for overlapping slots.
        let roster = vec![
            candidate("qb", &["QB"], 12.0),
            candidate("rb1", &["RB"], 9.0),
            candidate("rb2", &["RB"], 9.0),
            candidate("wr1", &["WR"], 9.0),
            candidate("wr2", &["WR", "TE"], 9.0),
            candidate("te", &["TE"], 9.0),
            candidate("k", &["K"], 4.0),
        ];

        let first = optimize(&roster, &catalog);
        assert_eq!(first.total, 48.0);
        for _ in 0..5 {
            assert_eq!(optimize(&roster, &catalog), first);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Property: the optimizer finds the same total as exhaustive search
        #[test]
        fn prop_optimal_matches_brute_force(roster in roster_strategy(10)) {
            let catalog = flex_catalog();
            let lineup = optimize(&roster, &catalog);
            let expected = brute_force(&roster, &catalog);
            prop_assert!(
                (lineup.total - expected).abs() < 1e-9,
                "optimizer {} vs brute force {}",
                lineup.total,
                expected
            );
        }

        /// Property: every fill is eligible and no player starts twice
        #[test]
        fn prop_optimal_lineup_is_legal(roster in roster_strategy(12)) {
            let catalog = flex_catalog();
            let lineup = optimize(&roster, &catalog);

            let mut seen = BTreeSet::new();
            for fill in &lineup.fills {
                if let Some(pid) = &fill.player_id {
                    prop_assert!(seen.insert(pid.clone()), "player {} used twice", pid);
                    let c = roster.iter().find(|c| &c.player_id == pid).unwrap();
                    prop_assert!(catalog.get(&fill.slot).unwrap().admits(&c.tags));
                }
            }
            prop_assert_eq!(lineup.fills.len(), catalog.total_capacity());
        }
    }
}

#[cfg(test)]
mod evaluate_tests {
    use super::*;
    use proptest::prelude::*;

    fn player(id: &str, tags: &[&str]) -> Player {
        Player {
            player_id: PlayerId::new(id),
            name: id.to_uppercase(),
            pos_type: "O".to_string(),
            eligible_positions: tags.iter().map(|t| PositionTag::new(t)).collect(),
        }
    }

    fn row(pid: &str, slot: &str, started: bool) -> RosterSlotAssignment {
        RosterSlotAssignment {
            week: Week::new(3),
            manager_id: ManagerId::new("t.1"),
            player_id: PlayerId::new(pid),
            slot: PositionTag::new(slot),
            started,
        }
    }

    fn fixture() -> (HashMap<PlayerId, Player>, BTreeMap<PlayerId, f64>, SlotCatalog) {
        let catalog = SlotCatalog::new(vec![
            crate::engine::eligibility::SlotCategory::new("QB", 1, &["QB"]),
            crate::engine::eligibility::SlotCategory::new("RB", 1, &["RB"]),
            crate::engine::eligibility::SlotCategory::new("W/R/T", 1, &["WR", "RB", "TE"]),
        ])
        .unwrap();

        let mut players = HashMap::new();
        for p in [
            player("qb", &["QB"]),
            player("rb1", &["RB"]),
            player("rb2", &["RB"]),
            player("wr", &["WR"]),
        ] {
            players.insert(p.player_id.clone(), p);
        }

        let mut points = BTreeMap::new();
        points.insert(PlayerId::new("qb"), 20.0);
        points.insert(PlayerId::new("rb1"), 5.0);
        points.insert(PlayerId::new("rb2"), 15.0);
        points.insert(PlayerId::new("wr"), 10.0);

        (players, points, catalog)
    }

    #[test]
    fn test_regret_and_efficiency() {
        let (players, points, catalog) = fixture();
        let roster = vec![
            row("qb", "QB", true),
            row("rb1", "RB", true),
            row("wr", "W/R/T", true),
            row("rb2", "BN", false),
        ];

        let LineupOutcome::Computed(report) =
            evaluate_lineup(Week::new(3), &ManagerId::new("t.1"), &roster, &players, &points, &catalog)
        else {
            panic!("expected a computed report");
        };

        assert_eq!(report.row.actual_pts, 35.0);
        assert_eq!(report.row.optimal_pts, 45.0);
        assert_eq!(report.row.regret, 10.0);
        assert!((report.row.efficiency - 35.0 / 45.0).abs() < 1e-12);
        assert!(report.problems.is_empty());
        assert!(!report.is_partial());
        assert!(report.infeasibility().is_none());
    }

    #[test]
    fn test_optimal_dominates_actual() {
        let (players, points, catalog) = fixture();
        let lineups = [
            vec![row("qb", "QB", true), row("rb2", "RB", true), row("wr", "W/R/T", true)],
            vec![row("qb", "QB", true), row("rb1", "RB", true), row("rb2", "W/R/T", true)],
            vec![row("qb", "BN", false), row("rb1", "RB", true), row("wr", "BN", false)],
        ];

        for roster in &lineups {
            let LineupOutcome::Computed(report) =
                evaluate_lineup(Week::new(3), &ManagerId::new("t.1"), roster, &players, &points, &catalog)
            else {
                panic!("expected a computed report");
            };
            assert!(report.row.optimal_pts >= report.row.actual_pts);
            assert!(report.row.regret >= 0.0);
            assert!(report.row.efficiency > 0.0 && report.row.efficiency <= 1.0);
        }
    }

    #[test]
    fn test_missing_stat_line_scores_zero() {
        let (players, mut points, catalog) = fixture();
        points.remove(&PlayerId::new("qb"));
        let roster = vec![row("qb", "QB", true), row("rb2", "RB", true)];

        let LineupOutcome::Computed(report) =
            evaluate_lineup(Week::new(3), &ManagerId::new("t.1"), &roster, &players, &points, &catalog)
        else {
            panic!("expected a computed report");
        };

        assert_eq!(report.row.actual_pts, 15.0);
        assert_eq!(report.row.optimal_pts, 15.0);
        // The QB can still fill its slot, so only W/R/T is short.
        assert_eq!(report.optimal.shortfall, 1);
        assert!(matches!(
            report.infeasibility(),
            Some(MetricsError::InfeasibleAssignment { unfilled: 1, slots: 3, .. })
        ));
    }

    #[test]
    fn test_zero_optimal_gives_full_efficiency() {
        let (players, _, catalog) = fixture();
        let points = BTreeMap::new();
        let roster = vec![row("qb", "QB", true), row("rb1", "RB", true), row("wr", "W/R/T", true)];

        let LineupOutcome::Computed(report) =
            evaluate_lineup(Week::new(3), &ManagerId::new("t.1"), &roster, &players, &points, &catalog)
        else {
            panic!("expected a computed report");
        };

        assert_eq!(report.row.optimal_pts, 0.0);
        assert_eq!(report.row.efficiency, 1.0);
        assert_eq!(report.row.regret, 0.0);
    }

    #[test]
    fn test_empty_roster_is_no_data() {
        let (players, points, catalog) = fixture();
        let outcome =
            evaluate_lineup(Week::new(3), &ManagerId::new("t.1"), &[], &players, &points, &catalog);

        assert_eq!(
            outcome,
            LineupOutcome::NoData {
                week: Week::new(3),
                manager_id: ManagerId::new("t.1"),
            }
        );
    }

    #[test]
    fn test_illegal_actual_lineup_reported() {
        let (players, points, catalog) = fixture();
        let roster = vec![row("wr", "QB", true), row("rb2", "RB", true)];

        let LineupOutcome::Computed(report) =
            evaluate_lineup(Week::new(3), &ManagerId::new("t.1"), &roster, &players, &points, &catalog)
        else {
            panic!("expected a computed report");
        };

        assert_eq!(report.problems.len(), 1);
        assert!(report.row.regret >= 0.0);
    }

    #[test]
    fn test_efficiency_row_clamps() {
        let row = efficiency_row(Week::new(1), ManagerId::new("t.1"), 50.0, 40.0);
        assert_eq!(row.regret, 0.0);
        assert_eq!(row.efficiency, 1.0);

        let row = efficiency_row(Week::new(1), ManagerId::new("t.1"), -4.0, 40.0);
        assert_eq!(row.regret, 44.0);
        assert_eq!(row.efficiency, 0.0);
    }

    proptest! {
        /// Property: the optimal lineup scores at least any legal started lineup
        #[test]
        fn prop_optimal_dominates_legal_lineup(
            picks in prop::collection::vec((0..TAG_SETS.len(), -20i32..140), 1..=12),
            choices in prop::collection::vec(0usize..12, 10),
        ) {
            let catalog = SlotCatalog::standard();
            let ids: Vec<String> = (0..picks.len()).map(|i| format!("p{}", i)).collect();
            let mut players = HashMap::new();
            let mut points = BTreeMap::new();
            for (id, (tags, steps)) in ids.iter().zip(&picks) {
                players.insert(PlayerId::new(id.as_str()), player(id, TAG_SETS[*tags]));
                points.insert(PlayerId::new(id.as_str()), f64::from(*steps) * 0.25);
            }

            // One chosen player per slot instance, when eligible and not yet started.
            let mut slots: Vec<Option<String>> = vec![None; ids.len()];
            for (instance, choice) in catalog.instances().into_iter().zip(&choices) {
                let i = choice % ids.len();
                let tags = &players[&PlayerId::new(ids[i].as_str())].eligible_positions;
                if slots[i].is_none() && instance.admits(tags) {
                    slots[i] = Some(instance.code.as_str().to_string());
                }
            }
            let roster: Vec<RosterSlotAssignment> = ids
                .iter()
                .zip(&slots)
                .map(|(id, slot)| match slot {
                    Some(code) => row(id, code, true),
                    None => row(id, "BN", false),
                })
                .collect();

            let report = match evaluate_lineup(
                Week::new(3),
                &ManagerId::new("t.1"),
                &roster,
                &players,
                &points,
                &catalog,
            ) {
                LineupOutcome::Computed(report) => report,
                other => panic!("expected a computed report, got {:?}", other),
            };

            prop_assert!(report.problems.is_empty());
            prop_assert!(report.row.optimal_pts >= report.row.actual_pts - 1e-9);
            prop_assert!(report.row.regret >= 0.0);
        }
    }
}
