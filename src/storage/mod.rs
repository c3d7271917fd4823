//! Storage layer for the league metrics store
//!
//! This module wraps the SQLite database, organized into logical components:
//! - `models`: Data structures
//! - `schema`: Database connection and schema management
//! - `queries`: Input upserts, loads and metric writes
//! - `analysis`: Report queries over the computed metrics

pub mod analysis;
pub mod models;
pub mod queries;
pub mod schema;


// Re-export the main types and database struct for easy access
pub use models::*;
pub use schema::MetricsDatabase;
