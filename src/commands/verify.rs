//! Expected-wins consistency check command implementation

use std::path::PathBuf;

use crate::engine::expected_wins::verify_prefix;
use crate::Result;

use super::open_database;

/// Handle the verify command
///
/// Fails with an invariant violation when a stored running total no longer
/// matches the weekly probabilities; nothing is rewritten.
pub fn handle_verify(db: Option<PathBuf>, verbose: bool) -> Result<()> {
    let db = open_database(db, verbose)?;
    let rows = db.get_expected_wins()?;
    verify_prefix(&rows)?;
    println!("✓ Expected wins consistent ({} rows)", rows.len());
    Ok(())
}
