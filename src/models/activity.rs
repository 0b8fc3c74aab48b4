use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity types that count as running for every metric in this crate
pub const RUNNING_TYPES: [&str; 3] = ["Run", "VirtualRun", "TrailRun"];

/// One completed activity as ingested from the activity source.
///
/// Numeric fields are optional: Strava omits some of them for manual
/// entries, and a missing value contributes nothing to an aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
  #[sqlx(rename = "strava_id")]
  pub id: i64,
  #[serde(default)]
  pub name: String,
  pub activity_type: String,
  pub start_timestamp: DateTime<Utc>,
  pub distance_meters: Option<f64>,
  pub moving_time_seconds: Option<i64>,
  pub elapsed_time_seconds: Option<i64>,
  pub elevation_gain_meters: Option<f64>,
  pub average_heart_rate: Option<f64>,
  pub max_heart_rate: Option<f64>,
}

impl ActivityRecord {
  pub fn is_run(&self) -> bool {
    RUNNING_TYPES.contains(&self.activity_type.as_str())
  }

  pub fn distance_km(&self) -> f64 {
    self.distance_meters.filter(|d| d.is_finite() && *d > 0.0).unwrap_or(0.0) / 1000.0
  }

  /// Pace in min/km, or None when distance or moving time is missing or zero
  pub fn pace_min_per_km(&self) -> Option<f64> {
    let km = self.distance_km();
    match self.moving_time_seconds {
      Some(secs) if secs > 0 && km > 0.0 => Some((secs as f64 / 60.0) / km),
      _ => None,
    }
  }
}
