//! Deterministic analysis layer for running metrics
//!
//! Reduces a list of raw activity records into a `RunningMetrics` summary.
//! Every function here is total: empty input, zero distances, and missing
//! heart-rate data all map to documented defaults instead of errors.
//! "Now" is always passed in by the caller.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ActivityRecord;

/// ---------------------------------------------------------------------------
/// Window Constants
/// ---------------------------------------------------------------------------

/// Trailing window used for every metric
pub const METRICS_WINDOW_DAYS: i64 = 28;

/// Weekly figures are the window total divided by this
const WEEKS_IN_WINDOW: f64 = 4.0;

/// Runs per week treated as fully consistent
const CONSISTENT_RUNS_PER_WEEK: f64 = 4.0;

/// Minimum pace samples before an improvement rate is reported
const MIN_RUNS_FOR_IMPROVEMENT: usize = 4;

pub const DEFAULT_PACE_MIN_PER_KM: f64 = 6.0;

/// ---------------------------------------------------------------------------
/// Running Metrics
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningMetrics {
  pub weekly_distance_km: f64,
  pub weekly_run_count: f64,
  pub average_pace_min_per_km: f64,
  pub longest_run_km: f64,
  pub total_elevation_gain_m: f64,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub average_heart_rate: Option<f64>,
  /// 0-100, four runs a week scores 100
  pub consistency_score: f64,
  /// Positive means the second half of the window was faster
  pub improvement_rate_percent: f64,
}

impl RunningMetrics {
  /// Safe non-zero baseline used whenever there is not enough data
  pub fn default_baseline() -> Self {
    Self {
      weekly_distance_km: 15.0,
      weekly_run_count: 3.0,
      average_pace_min_per_km: DEFAULT_PACE_MIN_PER_KM,
      longest_run_km: 5.0,
      total_elevation_gain_m: 50.0,
      average_heart_rate: None,
      consistency_score: 50.0,
      improvement_rate_percent: 0.0,
    }
  }
}

impl Default for RunningMetrics {
  fn default() -> Self {
    Self::default_baseline()
  }
}

/// ---------------------------------------------------------------------------
/// Metrics Analyzer
/// ---------------------------------------------------------------------------

/// Running activities that started within the last `days` days of `now`
pub fn recent_running<'a>(
  activities: &'a [ActivityRecord],
  now: DateTime<Utc>,
  days: i64,
) -> Vec<&'a ActivityRecord> {
  let cutoff = now - Duration::days(days);
  activities
    .iter()
    .filter(|a| a.is_run() && a.start_timestamp > cutoff)
    .collect()
}

/// Compute running metrics over the trailing 28-day window
pub fn analyze_running_data(activities: &[ActivityRecord], now: DateTime<Utc>) -> RunningMetrics {
  let runs = recent_running(activities, now, METRICS_WINDOW_DAYS);

  if runs.is_empty() {
    return RunningMetrics::default_baseline();
  }

  let total_km: f64 = runs.iter().map(|r| r.distance_km()).sum();
  let weekly_distance_km = total_km / WEEKS_IN_WINDOW;
  let weekly_run_count = runs.len() as f64 / WEEKS_IN_WINDOW;

  let paces: Vec<f64> = runs.iter().filter_map(|r| r.pace_min_per_km()).collect();
  let average_pace_min_per_km = mean(&paces).unwrap_or(DEFAULT_PACE_MIN_PER_KM);

  let longest_run_km = runs.iter().map(|r| r.distance_km()).fold(0.0, f64::max);

  let total_elevation_gain_m = runs
    .iter()
    .filter_map(|r| r.elevation_gain_meters)
    .filter(|e| e.is_finite())
    .sum::<f64>()
    / WEEKS_IN_WINDOW;

  let heart_rates: Vec<f64> = runs
    .iter()
    .filter_map(|r| r.average_heart_rate)
    .filter(|hr| hr.is_finite() && *hr > 0.0)
    .collect();
  let average_heart_rate = mean(&heart_rates);

  let consistency_score = ((weekly_run_count / CONSISTENT_RUNS_PER_WEEK) * 100.0).min(100.0);

  RunningMetrics {
    weekly_distance_km,
    weekly_run_count,
    average_pace_min_per_km,
    longest_run_km,
    total_elevation_gain_m,
    average_heart_rate,
    consistency_score,
    improvement_rate_percent: improvement_rate(&runs),
  }
}

/// Compare mean pace of the older half of the window against the newer half
fn improvement_rate(runs: &[&ActivityRecord]) -> f64 {
  let mut timed: Vec<_> = runs
    .iter()
    .filter_map(|r| r.pace_min_per_km().map(|p| (r.start_timestamp, p)))
    .collect();

  if timed.len() < MIN_RUNS_FOR_IMPROVEMENT {
    return 0.0;
  }

  timed.sort_by_key(|(started, _)| *started);
  let (first, second) = timed.split_at(timed.len() / 2);

  let first_pace = mean(&first.iter().map(|(_, p)| *p).collect::<Vec<_>>());
  let second_pace = mean(&second.iter().map(|(_, p)| *p).collect::<Vec<_>>());

  match (first_pace, second_pace) {
    (Some(f), Some(s)) if f > 0.0 => ((f - s) / f) * 100.0,
    _ => 0.0,
  }
}

fn mean(values: &[f64]) -> Option<f64> {
  if values.is_empty() {
    None
  } else {
    Some(values.iter().sum::<f64>() / values.len() as f64)
  }
}

/// ---------------------------------------------------------------------------
/// Activity Stats (all cached running activities, no window)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
  pub total_runs: usize,
  pub total_distance_km: f64,
  pub total_moving_time_seconds: i64,
  /// None when there is no distance to divide by
  pub average_pace_seconds_per_km: Option<f64>,
  pub total_elevation_gain_m: f64,
}

impl ActivityStats {
  pub fn compute(activities: &[ActivityRecord]) -> Self {
    let runs: Vec<_> = activities.iter().filter(|a| a.is_run()).collect();

    let total_distance_km: f64 = runs.iter().map(|r| r.distance_km()).sum();
    let total_moving_time_seconds: i64 = runs
      .iter()
      .filter_map(|r| r.moving_time_seconds)
      .filter(|s| *s > 0)
      .sum();
    let total_elevation_gain_m: f64 = runs.iter().filter_map(|r| r.elevation_gain_meters).sum();

    let average_pace_seconds_per_km = if total_distance_km > 0.0 {
      Some(total_moving_time_seconds as f64 / total_distance_km)
    } else {
      None
    };

    Self {
      total_runs: runs.len(),
      total_distance_km,
      total_moving_time_seconds,
      average_pace_seconds_per_km,
      total_elevation_gain_m,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assert_approx_eq;
  use crate::test_utils::{fixed_now, mock_activity, mock_run};

  #[test]
  fn test_empty_activities_return_baseline() {
    let metrics = analyze_running_data(&[], fixed_now());
    assert_eq!(metrics, RunningMetrics::default_baseline());
    assert_eq!(metrics.weekly_distance_km, 15.0);
    assert_eq!(metrics.weekly_run_count, 3.0);
    assert_eq!(metrics.average_pace_min_per_km, 6.0);
    assert_eq!(metrics.longest_run_km, 5.0);
    assert_eq!(metrics.total_elevation_gain_m, 50.0);
    assert_eq!(metrics.consistency_score, 50.0);
    assert_eq!(metrics.improvement_rate_percent, 0.0);
    assert!(metrics.average_heart_rate.is_none());
  }

  #[test]
  fn test_non_running_and_stale_activities_ignored() {
    let now = fixed_now();
    let activities = vec![
      mock_activity("Ride", 2, 40.0, 90.0, now),
      mock_activity("Swim", 1, 2.0, 45.0, now),
      mock_run(29, 10.0, 50.0, now),
      mock_run(60, 12.0, 60.0, now),
    ];

    let metrics = analyze_running_data(&activities, now);
    assert_eq!(metrics, RunningMetrics::default_baseline());
  }

  #[test]
  fn test_weekly_figures_are_window_total_over_four() {
    let now = fixed_now();
    // 8 runs of 10km in 50min (5:00/km) spread over the window
    let activities: Vec<_> = (0..8).map(|i| mock_run(i * 3, 10.0, 50.0, now)).collect();

    let metrics = analyze_running_data(&activities, now);
    assert_approx_eq!(metrics.weekly_distance_km, 20.0, 1e-9);
    assert_approx_eq!(metrics.weekly_run_count, 2.0, 1e-9);
    assert_approx_eq!(metrics.average_pace_min_per_km, 5.0, 1e-9);
    assert_approx_eq!(metrics.longest_run_km, 10.0, 1e-9);
    assert_approx_eq!(metrics.consistency_score, 50.0, 1e-9);
    assert_approx_eq!(metrics.improvement_rate_percent, 0.0, 1e-9);
  }

  #[test]
  fn test_virtual_and_trail_runs_count_as_running() {
    let now = fixed_now();
    let activities = vec![
      mock_activity("VirtualRun", 1, 8.0, 40.0, now),
      mock_activity("TrailRun", 2, 8.0, 48.0, now),
    ];

    let metrics = analyze_running_data(&activities, now);
    assert_approx_eq!(metrics.weekly_distance_km, 4.0, 1e-9);
    assert_approx_eq!(metrics.weekly_run_count, 0.5, 1e-9);
  }

  #[test]
  fn test_consistency_caps_at_100() {
    let now = fixed_now();
    let activities: Vec<_> = (0..27).map(|i| mock_run(i, 5.0, 30.0, now)).collect();

    let metrics = analyze_running_data(&activities, now);
    assert_eq!(metrics.consistency_score, 100.0);
  }

  #[test]
  fn test_improvement_rate_positive_when_getting_faster() {
    let now = fixed_now();
    // Older runs at 6:00/km, newer runs at 5:00/km
    let activities = vec![
      mock_run(20, 10.0, 60.0, now),
      mock_run(15, 10.0, 60.0, now),
      mock_run(5, 10.0, 50.0, now),
      mock_run(1, 10.0, 50.0, now),
    ];

    let metrics = analyze_running_data(&activities, now);
    // (6 - 5) / 6 * 100
    assert_approx_eq!(metrics.improvement_rate_percent, 16.6667, 1e-3);
  }

  #[test]
  fn test_improvement_rate_needs_four_runs() {
    let now = fixed_now();
    let activities = vec![
      mock_run(20, 10.0, 60.0, now),
      mock_run(10, 10.0, 55.0, now),
      mock_run(1, 10.0, 50.0, now),
    ];

    let metrics = analyze_running_data(&activities, now);
    assert_eq!(metrics.improvement_rate_percent, 0.0);
  }

  #[test]
  fn test_heart_rate_averaged_over_reporting_runs_only() {
    let now = fixed_now();
    let mut with_hr = mock_run(2, 10.0, 50.0, now);
    with_hr.average_heart_rate = Some(150.0);
    let mut with_hr_2 = mock_run(4, 10.0, 50.0, now);
    with_hr_2.average_heart_rate = Some(140.0);
    let mut without_hr = mock_run(6, 10.0, 50.0, now);
    without_hr.average_heart_rate = None;

    let metrics = analyze_running_data(&[with_hr, with_hr_2, without_hr], now);
    assert_eq!(metrics.average_heart_rate, Some(145.0));
  }

  #[test]
  fn test_missing_fields_do_not_abort_batch() {
    let now = fixed_now();
    let mut broken = mock_run(1, 10.0, 50.0, now);
    broken.distance_meters = None;
    broken.moving_time_seconds = None;
    broken.elevation_gain_meters = None;
    let mut zero_distance = mock_run(2, 0.0, 30.0, now);
    zero_distance.average_heart_rate = None;
    let good = mock_run(3, 10.0, 50.0, now);

    let metrics = analyze_running_data(&[broken, zero_distance, good], now);
    assert!(metrics.average_pace_min_per_km.is_finite());
    assert_approx_eq!(metrics.average_pace_min_per_km, 5.0, 1e-9);
    assert_approx_eq!(metrics.weekly_run_count, 0.75, 1e-9);
    assert_approx_eq!(metrics.weekly_distance_km, 2.5, 1e-9);
  }

  #[test]
  fn test_window_without_distances_uses_default_pace() {
    let now = fixed_now();
    let mut run = mock_run(1, 0.0, 30.0, now);
    run.distance_meters = None;

    let metrics = analyze_running_data(&[run], now);
    assert_eq!(metrics.average_pace_min_per_km, DEFAULT_PACE_MIN_PER_KM);
    assert_eq!(metrics.longest_run_km, 0.0);
  }

  #[test]
  fn test_longest_run_detects_long_efforts() {
    let now = fixed_now();
    // 20 runs, 100km total, one of them 12km
    let mut activities: Vec<_> = (0..19).map(|i| mock_run(i, 88.0 / 19.0, 28.0, now)).collect();
    activities.push(mock_run(20, 12.0, 66.0, now));

    let metrics = analyze_running_data(&activities, now);
    assert_approx_eq!(metrics.weekly_distance_km, 25.0, 1e-6);
    assert!(metrics.longest_run_km > 8.0);
  }

  #[test]
  fn test_activity_stats_totals() {
    let now = fixed_now();
    let activities = vec![
      mock_run(1, 10.0, 50.0, now),
      mock_run(40, 5.0, 30.0, now),
      mock_activity("Ride", 2, 40.0, 90.0, now),
    ];

    let stats = ActivityStats::compute(&activities);
    assert_eq!(stats.total_runs, 2);
    assert_approx_eq!(stats.total_distance_km, 15.0, 1e-9);
    assert_eq!(stats.total_moving_time_seconds, 80 * 60);
    assert_approx_eq!(stats.average_pace_seconds_per_km.unwrap(), 320.0, 1e-9);
  }

  #[test]
  fn test_activity_stats_empty() {
    let stats = ActivityStats::compute(&[]);
    assert_eq!(stats.total_runs, 0);
    assert!(stats.average_pace_seconds_per_km.is_none());
  }
}
