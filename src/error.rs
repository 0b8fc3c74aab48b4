//! Error types shared across the coaching pipeline
//!
//! Core computations are total and never fail. Errors only arise at the
//! edges: configuration, persistence, and boundary validation of goals.
//! Upstream (Strava) failures have their own type in `strava` and are
//! recovered by the orchestrator rather than surfaced.

use serde::Serialize;

/// ---------------------------------------------------------------------------
/// Store Errors
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration failed: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Stored document is not valid JSON: {0}")]
  Serialization(#[from] serde_json::Error),
}

/// ---------------------------------------------------------------------------
/// Configuration Errors
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid value for {name}: {value}")]
  InvalidValue { name: &'static str, value: String },

  #[error("Invalid URL for {name}: {source}")]
  InvalidUrl {
    name: &'static str,
    #[source]
    source: url::ParseError,
  },
}

/// ---------------------------------------------------------------------------
/// Command-Level Errors
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CoachError {
  #[error("Store unavailable: {0}")]
  Store(#[from] StoreError),

  #[error("User {0} is not connected to Strava")]
  NotConnected(String),

  #[error("No training plan found for user {0}")]
  PlanNotFound(String),

  #[error("Invalid goal: {0}")]
  InvalidGoal(String),

  #[error("Configuration error: {0}")]
  Config(#[from] ConfigError),
}

impl From<sqlx::Error> for CoachError {
  fn from(e: sqlx::Error) -> Self {
    CoachError::Store(StoreError::Database(e))
  }
}

impl Serialize for CoachError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

pub type CoachResult<T> = Result<T, CoachError>;
