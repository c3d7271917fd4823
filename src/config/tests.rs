//! Unit tests for league file loading

use super::*;
use std::io::Write;

const SAMPLE_TOML: &str = r#"
name = "Sunday League"

[scoring]
pass_yds = 0.04
pass_td = 4.0
rec = 1.0

[[slots]]
code = "QB"
count = 1
accepts = ["QB"]

[[slots]]
code = "RB"
count = 2
accepts = ["RB"]

[[slots]]
code = "W/R/T"
accepts = ["WR", "RB", "TE"]
"#;

#[cfg(test)]
mod parse_tests {
    use super::*;

    #[test]
    fn test_parse_toml_league_file() {
        let config = LeagueConfig::parse(SAMPLE_TOML, false).unwrap();

        assert_eq!(config.name.as_deref(), Some("Sunday League"));
        assert_eq!(config.scoring.per_unit("rec"), Some(1.0));
        assert_eq!(config.catalog.slots().len(), 3);
        assert_eq!(config.catalog.total_capacity(), 4);
    }

    #[test]
    fn test_count_defaults_to_one() {
        let config = LeagueConfig::parse(SAMPLE_TOML, false).unwrap();
        let flex = config.catalog.get(&PositionTag::new("W/R/T")).unwrap();
        assert_eq!(flex.capacity, 1);
    }

    #[test]
    fn test_parse_json_league_file() {
        let json = r#"{
            "scoring": {"pass_td": 6.0},
            "slots": [{"code": "QB", "count": 1, "accepts": ["QB"]}]
        }"#;
        let config = LeagueConfig::parse(json, true).unwrap();

        assert_eq!(config.name, None);
        assert_eq!(config.scoring.per_unit("pass_td"), Some(6.0));
        assert_eq!(config.catalog.total_capacity(), 1);
    }

    #[test]
    fn test_tags_are_normalised() {
        let toml = r#"
            [scoring]
            dst_td = 6.0

            [[slots]]
            code = "d/st"
            accepts = ["dst"]
        "#;
        let config = LeagueConfig::parse(toml, false).unwrap();
        let slot = &config.catalog.slots()[0];

        assert_eq!(slot.code, PositionTag::new("DEF"));
        assert!(slot.accepts.contains(&PositionTag::new("DEF")));
    }

    #[test]
    fn test_standard_survives_file_conversion() {
        let standard = LeagueConfig::standard();
        let back = LeagueConfig::from_file(standard.to_file()).unwrap();
        assert_eq!(back, standard);
    }
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    fn expect_config_error(text: &str) {
        match LeagueConfig::parse(text, false) {
            Err(MetricsError::Configuration { .. }) => {}
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_capacity_rejected() {
        expect_config_error(
            r#"
            [scoring]
            pass_td = 4.0
            [[slots]]
            code = "QB"
            count = 0
            accepts = ["QB"]
            "#,
        );
    }

    #[test]
    fn test_duplicate_slot_rejected() {
        expect_config_error(
            r#"
            [scoring]
            pass_td = 4.0
            [[slots]]
            code = "QB"
            accepts = ["QB"]
            [[slots]]
            code = "qb"
            accepts = ["QB"]
            "#,
        );
    }

    #[test]
    fn test_empty_predicate_rejected() {
        expect_config_error(
            r#"
            [scoring]
            pass_td = 4.0
            [[slots]]
            code = "QB"
            accepts = []
            "#,
        );
    }

    #[test]
    fn test_empty_tag_rejected() {
        expect_config_error(
            r#"
            [scoring]
            pass_td = 4.0
            [[slots]]
            code = "QB"
            accepts = ["QB", " "]
            "#,
        );
    }

    #[test]
    fn test_empty_slot_code_rejected() {
        expect_config_error(
            r#"
            [scoring]
            pass_td = 4.0
            [[slots]]
            code = ""
            accepts = ["QB"]
            "#,
        );
    }

    #[test]
    fn test_bench_as_starting_slot_rejected() {
        expect_config_error(
            r#"
            [scoring]
            pass_td = 4.0
            [[slots]]
            code = "BN"
            accepts = ["QB"]
            "#,
        );
    }

    #[test]
    fn test_non_finite_weight_rejected() {
        expect_config_error(
            r#"
            [scoring]
            pass_td = nan
            [[slots]]
            code = "QB"
            accepts = ["QB"]
            "#,
        );
    }

    #[test]
    fn test_no_slots_rejected() {
        expect_config_error(
            r#"
            slots = []
            [scoring]
            pass_td = 4.0
            "#,
        );
    }

    #[test]
    fn test_missing_scoring_table_is_parse_error() {
        let result = LeagueConfig::parse(
            r#"
            [[slots]]
            code = "QB"
            accepts = ["QB"]
            "#,
            false,
        );
        assert!(matches!(result, Err(MetricsError::Toml(_))));
    }
}

#[cfg(test)]
mod load_tests {
    use super::*;

    #[test]
    fn test_load_toml_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(SAMPLE_TOML.as_bytes()).unwrap();

        let config = LeagueConfig::load(file.path()).unwrap();
        assert_eq!(config.catalog.total_capacity(), 4);
    }

    #[test]
    fn test_json_chosen_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".JSON").tempfile().unwrap();
        file.write_all(
            br#"{"scoring": {"rec": 0.5}, "slots": [{"code": "WR", "count": 3, "accepts": ["WR"]}]}"#,
        )
        .unwrap();

        let config = LeagueConfig::load(file.path()).unwrap();
        assert_eq!(config.catalog.total_capacity(), 3);
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = LeagueConfig::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(MetricsError::Configuration { .. })));
    }
}
