//! Fantasy football position tags and roster slot codes.

use crate::error::MetricsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Code of the bench slot.
pub const BENCH: &str = "BN";
/// Code of the injured-reserve slot.
pub const INJURED_RESERVE: &str = "IR";

/// A position tag or roster slot code.
///
/// Players carry a set of these (`QB`, `RB`, `W/R/T`, ...) and every slot in
/// the league's catalog is identified by one. Tags are stored upper-cased
/// and a handful of platform spellings are folded together:
///
/// - `D/ST`, `DST` → `DEF`
/// - `BE`, `BENCH` → `BN`
/// - `IL` → `IR`
///
/// # Examples
///
/// ```rust
/// use ffl_metrics::PositionTag;
///
/// let dst: PositionTag = "d/st".parse().unwrap();
/// assert_eq!(dst.as_str(), "DEF");
/// assert!(PositionTag::new("BE").is_reserve());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PositionTag(String);

impl PositionTag {
    /// Build a tag from raw text, normalising case and aliases.
    pub fn new(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();
        let canonical = match upper.as_str() {
            "D/ST" | "DST" => "DEF".to_string(),
            "BE" | "BENCH" => BENCH.to_string(),
            "IL" => INJURED_RESERVE.to_string(),
            _ => upper,
        };
        Self(canonical)
    }

    pub fn bench() -> Self {
        Self(BENCH.to_string())
    }

    pub fn injured_reserve() -> Self {
        Self(INJURED_RESERVE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bench and IR hold players without scoring for the week.
    pub fn is_reserve(&self) -> bool {
        self.0 == BENCH || self.0 == INJURED_RESERVE
    }
}

impl fmt::Display for PositionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PositionTag {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(MetricsError::config("empty position tag"));
        }
        Ok(Self::new(s))
    }
}

impl TryFrom<String> for PositionTag {
    type Error = MetricsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PositionTag> for String {
    fn from(tag: PositionTag) -> Self {
        tag.0
    }
}
