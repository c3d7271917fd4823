//! Database initialization command implementation

use std::path::PathBuf;

use crate::storage::MetricsDatabase;
use crate::Result;

use super::resolve_db_path;

/// Handle the init-db command
pub fn handle_init_db(db: Option<PathBuf>) -> Result<()> {
    let path = resolve_db_path(db)?;
    MetricsDatabase::open(&path)?;
    println!("✓ Database ready at {}", path.display());
    Ok(())
}
