//! Derived-metrics engine: scoring, eligibility, lineup optimization and
//! expected wins.
//!
//! Everything in here is pure computation over in-memory records. Reading
//! inputs and persisting results lives in [`crate::storage`]; batching lives
//! in [`crate::commands`].

pub mod assignment;
pub mod eligibility;
pub mod expected_wins;
pub mod lineup;
pub mod scoring;
pub mod standings;

use crate::cli::types::Week;

pub use eligibility::{eligible_slots, PlacementError, SlotCatalog, SlotCategory};
pub use expected_wins::{all_play, recompute_from, verify_prefix};
pub use lineup::{evaluate_lineup, optimize, LineupOutcome, LineupReport, OptimalLineup};
pub use scoring::{score, score_week, ScoringRules};
pub use standings::{luck_index, LuckRow, TeamRecord};

/// Inclusive range of weeks a computation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub from: Week,
    pub through: Week,
}

impl WeekWindow {
    pub fn new(from: Week, through: Week) -> Self {
        Self { from, through }
    }

    /// Every week of the season.
    pub fn all() -> Self {
        Self::new(Week::new(0), Week::new(u16::MAX))
    }

    /// `from` and every later week.
    pub fn starting_at(from: Week) -> Self {
        Self::new(from, Week::new(u16::MAX))
    }

    pub fn contains(&self, week: Week) -> bool {
        self.from <= week && week <= self.through
    }

    pub fn is_empty(&self) -> bool {
        self.from > self.through
    }

    /// Weeks in order, for windows with a concrete end.
    pub fn weeks(&self) -> impl Iterator<Item = Week> {
        (self.from.as_u16()..=self.through.as_u16()).map(Week::new)
    }
}
