//! League file validation command implementation

use std::path::PathBuf;

use crate::Result;

use super::load_league_config;

/// Handle the check-config command
///
/// Loads and validates the league file, then prints the effective scoring
/// rules and slot catalog (as JSON with `as_json`).
pub fn handle_check_config(config: Option<PathBuf>, as_json: bool) -> Result<()> {
    let league = load_league_config(config, !as_json)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&league.to_file())?);
        return Ok(());
    }

    println!(
        "✓ League file valid: {} scoring rules, {} starting slots",
        league.scoring.len(),
        league.catalog.total_capacity()
    );
    if let Some(name) = &league.name {
        println!("League: {}", name);
    }
    for slot in league.catalog.slots() {
        let accepts: Vec<&str> = slot.accepts.iter().map(|t| t.as_str()).collect();
        println!("  {:<8} x{}  {}", slot.code.as_str(), slot.capacity, accepts.join(", "));
    }
    Ok(())
}
