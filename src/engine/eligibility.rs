//! Slot catalog and roster eligibility resolution.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use thiserror::Error;

use crate::cli::types::{PlayerId, PositionTag};
use crate::error::{MetricsError, Result};
use crate::storage::models::{Player, RosterSlotAssignment};

/// A starting slot category: code, capacity, and the position tags it takes.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotCategory {
    pub code: PositionTag,
    pub capacity: usize,
    pub accepts: BTreeSet<PositionTag>,
}

impl SlotCategory {
    pub fn new(code: &str, capacity: usize, accepts: &[&str]) -> Self {
        Self {
            code: PositionTag::new(code),
            capacity,
            accepts: accepts.iter().map(|t| PositionTag::new(t)).collect(),
        }
    }

    /// Whether a player with these tags may start in this slot.
    ///
    /// A player tagged with the slot code itself (e.g. `W/R/T`) qualifies
    /// as well as one whose tags intersect `accepts`.
    pub fn admits(&self, tags: &BTreeSet<PositionTag>) -> bool {
        tags.contains(&self.code) || !self.accepts.is_disjoint(tags)
    }
}

/// Ordered starting-slot catalog for a league.
///
/// Bench and IR are implicit: unlimited capacity, open to everyone, never
/// scored.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotCatalog {
    slots: Vec<SlotCategory>,
}

/// Why a player can't be placed in a slot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("slot {slot} is not in the league catalog")]
    UnknownSlot { slot: PositionTag },

    #[error("player {player_id} is not eligible for slot {slot}")]
    Ineligible {
        player_id: PlayerId,
        slot: PositionTag,
    },

    #[error("slot {slot} holds {used} starters but capacity is {capacity}")]
    OverCapacity {
        slot: PositionTag,
        used: usize,
        capacity: usize,
    },
}

impl SlotCatalog {
    /// Validate and build a catalog.
    pub fn new(slots: Vec<SlotCategory>) -> Result<Self> {
        if slots.is_empty() {
            return Err(MetricsError::config("slot catalog has no starting slots"));
        }

        let mut seen = BTreeSet::new();
        for slot in &slots {
            if slot.code.is_reserve() {
                return Err(MetricsError::config(format!(
                    "{} is a reserve slot and cannot be listed as a starting slot",
                    slot.code
                )));
            }
            if slot.capacity == 0 {
                return Err(MetricsError::config(format!(
                    "slot {} has zero capacity",
                    slot.code
                )));
            }
            if slot.accepts.is_empty() {
                return Err(MetricsError::config(format!(
                    "slot {} has no eligible positions",
                    slot.code
                )));
            }
            if slot.accepts.iter().any(PositionTag::is_reserve) {
                return Err(MetricsError::config(format!(
                    "slot {} accepts a reserve tag",
                    slot.code
                )));
            }
            if !seen.insert(slot.code.clone()) {
                return Err(MetricsError::config(format!(
                    "slot {} is defined more than once",
                    slot.code
                )));
            }
        }

        Ok(Self { slots })
    }

    /// Superflex lineup: QB, 2 RB, 2 WR, TE, W/R/T, Q/W/R/T, DEF, K.
    pub fn standard() -> Self {
        Self {
            slots: vec![
                SlotCategory::new("QB", 1, &["QB"]),
                SlotCategory::new("RB", 2, &["RB"]),
                SlotCategory::new("WR", 2, &["WR"]),
                SlotCategory::new("TE", 1, &["TE"]),
                SlotCategory::new("W/R/T", 1, &["WR", "RB", "TE"]),
                SlotCategory::new("Q/W/R/T", 1, &["QB", "WR", "RB", "TE"]),
                SlotCategory::new("DEF", 1, &["DEF"]),
                SlotCategory::new("K", 1, &["K"]),
            ],
        }
    }

    pub fn slots(&self) -> &[SlotCategory] {
        &self.slots
    }

    pub fn get(&self, code: &PositionTag) -> Option<&SlotCategory> {
        self.slots.iter().find(|s| &s.code == code)
    }

    /// Known starting slot or bench/IR.
    pub fn recognizes(&self, code: &PositionTag) -> bool {
        code.is_reserve() || self.get(code).is_some()
    }

    /// Total number of starting positions.
    pub fn total_capacity(&self) -> usize {
        self.slots.iter().map(|s| s.capacity).sum()
    }

    /// One entry per unit of capacity, in catalog order.
    pub fn instances(&self) -> Vec<&SlotCategory> {
        self.slots
            .iter()
            .flat_map(|s| std::iter::repeat(s).take(s.capacity))
            .collect()
    }

    /// Check that a player may sit in `slot`. Bench and IR always succeed.
    pub fn check_placement(
        &self,
        player_id: &PlayerId,
        tags: &BTreeSet<PositionTag>,
        slot: &PositionTag,
    ) -> std::result::Result<(), PlacementError> {
        if slot.is_reserve() {
            return Ok(());
        }
        let category = self.get(slot).ok_or_else(|| PlacementError::UnknownSlot {
            slot: slot.clone(),
        })?;
        if category.admits(tags) {
            Ok(())
        } else {
            Err(PlacementError::Ineligible {
                player_id: player_id.clone(),
                slot: slot.clone(),
            })
        }
    }
}

/// Every slot code the player may occupy, bench and IR included.
pub fn eligible_slots(player: &Player, catalog: &SlotCatalog) -> BTreeSet<PositionTag> {
    let mut out: BTreeSet<PositionTag> = catalog
        .slots()
        .iter()
        .filter(|s| s.admits(&player.eligible_positions))
        .map(|s| s.code.clone())
        .collect();
    out.insert(PositionTag::bench());
    out.insert(PositionTag::injured_reserve());
    out
}

/// Check a recorded starting lineup against the catalog.
///
/// Returns every problem found rather than stopping at the first, so the
/// batch can log the whole picture for a bad roster.
pub fn validate_started_lineup(
    roster: &[RosterSlotAssignment],
    players: &HashMap<PlayerId, Player>,
    catalog: &SlotCatalog,
) -> Vec<PlacementError> {
    let empty = BTreeSet::new();
    let mut problems = Vec::new();
    let mut used: BTreeMap<PositionTag, usize> = BTreeMap::new();

    for row in roster.iter().filter(|r| r.started && !r.slot.is_reserve()) {
        let tags = players
            .get(&row.player_id)
            .map(|p| &p.eligible_positions)
            .unwrap_or(&empty);
        if let Err(e) = catalog.check_placement(&row.player_id, tags, &row.slot) {
            problems.push(e);
            continue;
        }
        *used.entry(row.slot.clone()).or_insert(0) += 1;
    }

    for (slot, count) in used {
        if let Some(category) = catalog.get(&slot) {
            if count > category.capacity {
                problems.push(PlacementError::OverCapacity {
                    slot,
                    used: count,
                    capacity: category.capacity,
                });
            }
        }
    }

    problems
}
