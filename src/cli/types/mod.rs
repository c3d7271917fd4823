//! Type-safe wrappers for league identifiers, weeks and position tags.

pub mod ids;
pub mod position;
pub mod time;

pub use ids::{ManagerId, MatchupId, PlayerId};
pub use position::PositionTag;
pub use time::Week;
