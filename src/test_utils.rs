//! Test utilities and helpers for integration and unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - A fixed clock
//! - Helper assertions

use crate::config::AppConfig;
use crate::db::AppState;
use crate::models::{ActivityRecord, AthleteAccount};
use crate::strava::StravaClient;
use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration as StdDuration;
use url::Url;

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Seed a connected athlete with a non-expiring token
pub async fn seed_test_account(pool: &SqlitePool, user_id: &str) -> AthleteAccount {
  let account = mock_account(user_id);

  sqlx::query(
    r#"
    INSERT INTO athletes (user_id, access_token, refresh_token, token_expires_at)
    VALUES (?1, ?2, ?3, ?4)
    "#,
  )
  .bind(&account.user_id)
  .bind(&account.access_token)
  .bind(&account.refresh_token)
  .bind(account.token_expires_at)
  .execute(pool)
  .await
  .expect("Failed to seed test account");

  account
}

/// ---------------------------------------------------------------------------
/// Application State
/// ---------------------------------------------------------------------------

/// Config pointing the Strava client at `api_base` (usually a mockito server)
pub fn test_config(api_base: &str) -> AppConfig {
  AppConfig {
    database_url: "sqlite::memory:".to_string(),
    strava_api_base: Url::parse(api_base).expect("Invalid test API base"),
    strava_timeout: StdDuration::from_secs(5),
    activity_fetch_days: 30,
    plan_freshness_days: 7,
  }
}

pub fn test_state(pool: SqlitePool, api_base: &str) -> AppState {
  let config = test_config(api_base);
  let strava = StravaClient::from_config(&config).expect("Failed to build Strava client");
  AppState {
    db: pool,
    config,
    strava,
  }
}

/// Strava `/athlete/activities` payload for the given records
pub fn strava_body(activities: &[ActivityRecord]) -> String {
  let payload: Vec<serde_json::Value> = activities
    .iter()
    .map(|a| {
      serde_json::json!({
        "id": a.id,
        "name": a.name,
        "type": a.activity_type,
        "start_date": a.start_timestamp.to_rfc3339(),
        "elapsed_time": a.elapsed_time_seconds,
        "moving_time": a.moving_time_seconds,
        "distance": a.distance_meters,
        "total_elevation_gain": a.elevation_gain_meters,
        "average_heartrate": a.average_heart_rate,
        "max_heartrate": a.max_heart_rate,
      })
    })
    .collect();

  serde_json::to_string(&payload).expect("Failed to encode Strava payload")
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

static NEXT_ACTIVITY_ID: AtomicI64 = AtomicI64::new(1_000);

/// Create a mock activity `days_ago` days before `now`
pub fn mock_activity(
  activity_type: &str,
  days_ago: i64,
  km: f64,
  minutes: f64,
  now: DateTime<Utc>,
) -> ActivityRecord {
  let moving = (minutes * 60.0).round() as i64;
  ActivityRecord {
    id: NEXT_ACTIVITY_ID.fetch_add(1, Ordering::Relaxed),
    name: format!("Test {}", activity_type),
    activity_type: activity_type.to_string(),
    start_timestamp: now - Duration::days(days_ago),
    distance_meters: Some(km * 1000.0),
    moving_time_seconds: Some(moving),
    elapsed_time_seconds: Some(moving + 60),
    elevation_gain_meters: Some(20.0),
    average_heart_rate: Some(145.0),
    max_heart_rate: Some(170.0),
  }
}

/// Create a mock run `days_ago` days before `now`
pub fn mock_run(days_ago: i64, km: f64, minutes: f64, now: DateTime<Utc>) -> ActivityRecord {
  mock_activity("Run", days_ago, km, minutes, now)
}

/// Create mock athlete credentials for testing
pub fn mock_account(user_id: &str) -> AthleteAccount {
  AthleteAccount {
    user_id: user_id.to_string(),
    access_token: "test_access_token".to_string(),
    refresh_token: Some("test_refresh_token".to_string()),
    token_expires_at: None,
    last_sync_at: None,
  }
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// A fixed "now" so window arithmetic in tests is reproducible
pub fn fixed_now() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0)
    .single()
    .expect("valid fixed timestamp")
}

/// Create a DateTime N days before `fixed_now()`
pub fn datetime_days_ago(days: i64) -> DateTime<Utc> {
  fixed_now() - Duration::days(days)
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      "SELECT name FROM sqlite_master WHERE type='table' AND name IN ('athletes', 'activities', 'training_plans')"
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 3, "Expected 3 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_account_is_stored() {
    let pool = setup_test_db().await;

    seed_test_account(&pool, "athlete-1").await;
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM athletes WHERE user_id = 'athlete-1'")
      .fetch_one(&pool)
      .await
      .expect("Failed to count athletes");

    assert_eq!(count, 1);

    teardown_test_db(pool).await;
  }

  #[test]
  fn test_mock_factories_create_valid_data() {
    let now = fixed_now();
    let run = mock_run(3, 10.0, 50.0, now);
    assert!(run.is_run());
    assert_eq!(run.moving_time_seconds, Some(3000));
    assert_eq!(run.start_timestamp, datetime_days_ago(3));

    let ride = mock_activity("Ride", 1, 40.0, 90.0, now);
    assert!(!ride.is_run());
    assert_ne!(run.id, ride.id);

    let account = mock_account("athlete-1");
    assert!(!account.token_expired(now));
  }

  #[test]
  fn test_strava_body_parses_back() {
    let now = fixed_now();
    let run = mock_run(2, 7.5, 40.0, now);
    let body = strava_body(std::slice::from_ref(&run));

    let parsed: Vec<crate::strava::StravaActivity> = serde_json::from_str(&body).unwrap();
    let record = ActivityRecord::from(parsed[0].clone());
    assert_eq!(record, run);
  }
}
