//! Error types for the fantasy league metrics engine

use thiserror::Error;

use crate::cli::types::{ManagerId, Week};


pub type Result<T> = std::result::Result<T, MetricsError>;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Missing input: {what} for week {week}")]
    MissingInput { what: String, week: Week },

    #[error(
        "Infeasible assignment for manager {manager_id} in week {week}: \
         {unfilled} of {slots} starting slots cannot be filled"
    )]
    InfeasibleAssignment {
        manager_id: ManagerId,
        week: Week,
        unfilled: usize,
        slots: usize,
    },

    #[error(
        "Invariant violation for manager {manager_id} in week {week}: \
         stored cum_xw {stored} does not match prefix sum {expected}"
    )]
    InvariantViolation {
        manager_id: ManagerId,
        week: Week,
        stored: f64,
        expected: f64,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{what} not provided and {env_var} environment variable not set")]
    MissingPath { what: String, env_var: String },

    #[error("Invalid week: {0}")]
    InvalidWeek(#[from] std::num::ParseIntError),

    #[error("{message}")]
    Other { message: String },
}

impl MetricsError {
    pub fn config(message: impl Into<String>) -> Self {
        MetricsError::Configuration {
            message: message.into(),
        }
    }

    /// Errors that belong to a single (week, manager) unit and must not
    /// stop sibling units in the same batch.
    pub fn is_unit_local(&self) -> bool {
        matches!(
            self,
            MetricsError::MissingInput { .. } | MetricsError::InfeasibleAssignment { .. }
        )
    }
}

impl From<anyhow::Error> for MetricsError {
    fn from(err: anyhow::Error) -> Self {
        MetricsError::Other {
            message: format!("{:#}", err),
        }
    }
}
