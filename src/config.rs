//! Runtime configuration read from environment variables
//!
//! `.env` is loaded by the binary before `AppConfig::from_env` runs, so
//! values there and in the real environment are treated the same.

use std::env;
use std::str::FromStr;
use std::time::Duration as StdDuration;
use url::Url;

use crate::error::ConfigError;
use crate::orchestrator::{OrchestratorConfig, DEFAULT_FETCH_WINDOW_DAYS, DEFAULT_FRESHNESS_DAYS};
use crate::strava::{DEFAULT_TIMEOUT_SECS, STRAVA_API_BASE};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://run-coach.db?mode=rwc";

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub database_url: String,
  pub strava_api_base: Url,
  pub strava_timeout: StdDuration,
  /// How far back each fetch reaches
  pub activity_fetch_days: i64,
  /// Plans younger than this are reused as-is
  pub plan_freshness_days: i64,
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    let api_base = env::var("STRAVA_API_BASE").unwrap_or_else(|_| STRAVA_API_BASE.to_string());
    let strava_api_base = Url::parse(&api_base).map_err(|source| ConfigError::InvalidUrl {
      name: "STRAVA_API_BASE",
      source,
    })?;

    let timeout_secs: u64 = positive_var("STRAVA_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

    Ok(Self {
      database_url,
      strava_api_base,
      strava_timeout: StdDuration::from_secs(timeout_secs),
      activity_fetch_days: positive_var("ACTIVITY_FETCH_DAYS", DEFAULT_FETCH_WINDOW_DAYS)?,
      plan_freshness_days: positive_var("PLAN_FRESHNESS_DAYS", DEFAULT_FRESHNESS_DAYS)?,
    })
  }

  pub fn orchestrator(&self) -> OrchestratorConfig {
    OrchestratorConfig {
      fetch_window_days: self.activity_fetch_days,
      freshness_days: self.plan_freshness_days,
    }
  }
}

/// Parse a numeric variable that must be > 0, falling back to `default` when unset
fn positive_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
  T: FromStr + PartialOrd + Default,
{
  let Ok(raw) = env::var(name) else {
    return Ok(default);
  };

  match raw.trim().parse::<T>() {
    Ok(value) if value > T::default() => Ok(value),
    _ => Err(ConfigError::InvalidValue { name, value: raw }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  const VARS: [&str; 5] = [
    "DATABASE_URL",
    "STRAVA_API_BASE",
    "STRAVA_TIMEOUT_SECS",
    "ACTIVITY_FETCH_DAYS",
    "PLAN_FRESHNESS_DAYS",
  ];

  fn unset_all() -> Vec<(&'static str, Option<&'static str>)> {
    VARS.iter().map(|v| (*v, None)).collect()
  }

  #[test]
  #[serial]
  fn test_defaults_when_unset() {
    temp_env::with_vars(unset_all(), || {
      let config = AppConfig::from_env().unwrap();
      assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
      assert_eq!(config.strava_api_base.as_str(), "https://www.strava.com/api/v3");
      assert_eq!(config.strava_timeout, StdDuration::from_secs(15));
      assert_eq!(config.activity_fetch_days, 30);
      assert_eq!(config.plan_freshness_days, 7);
    });
  }

  #[test]
  #[serial]
  fn test_overrides_are_applied() {
    temp_env::with_vars(
      [
        ("DATABASE_URL", Some("sqlite::memory:")),
        ("STRAVA_API_BASE", Some("http://localhost:9000/api")),
        ("STRAVA_TIMEOUT_SECS", Some("3")),
        ("ACTIVITY_FETCH_DAYS", Some(" 14 ")),
        ("PLAN_FRESHNESS_DAYS", Some("2")),
      ],
      || {
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.strava_api_base.as_str(), "http://localhost:9000/api");
        assert_eq!(config.strava_timeout, StdDuration::from_secs(3));

        let orch = config.orchestrator();
        assert_eq!(orch.fetch_window_days, 14);
        assert_eq!(orch.freshness_days, 2);
      },
    );
  }

  #[test]
  #[serial]
  fn test_invalid_numbers_are_rejected() {
    temp_env::with_vars([("PLAN_FRESHNESS_DAYS", Some("soon"))], || {
      let err = AppConfig::from_env().unwrap_err();
      assert!(matches!(err, ConfigError::InvalidValue { name: "PLAN_FRESHNESS_DAYS", .. }));
    });

    temp_env::with_vars([("STRAVA_TIMEOUT_SECS", Some("0"))], || {
      assert!(AppConfig::from_env().is_err());
    });
  }

  #[test]
  #[serial]
  fn test_invalid_api_base_is_rejected() {
    temp_env::with_vars([("STRAVA_API_BASE", Some("not a url"))], || {
      let err = AppConfig::from_env().unwrap_err();
      assert!(matches!(err, ConfigError::InvalidUrl { name: "STRAVA_API_BASE", .. }));
    });
  }
}
