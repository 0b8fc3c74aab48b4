//! Display formatting over core output
//!
//! Nothing here feeds back into planning. This is also the only place pace
//! values are clamped: zones are stored unclamped and limited to a sane
//! 5-15 min/mile band only when shown.

use chrono::NaiveDate;
use serde::Serialize;

use crate::goals::{GoalRequest, Goals, RaceType};
use crate::models::{PaceRange, TrainingPlan, Workout};
use crate::zones::TrainingZones;

pub const KM_PER_MILE: f64 = 1.609344;

/// Display band for paces, in min/mile
const DISPLAY_MIN_PACE_PER_MILE: f64 = 5.0;
const DISPLAY_MAX_PACE_PER_MILE: f64 = 15.0;

/// ---------------------------------------------------------------------------
/// Units
/// ---------------------------------------------------------------------------

pub fn km_to_miles(km: f64) -> f64 {
  km / KM_PER_MILE
}

/// Clamp a min/km pace into the display band
pub fn clamp_pace_for_display(min_per_km: f64) -> f64 {
  let fastest = DISPLAY_MIN_PACE_PER_MILE / KM_PER_MILE;
  let slowest = DISPLAY_MAX_PACE_PER_MILE / KM_PER_MILE;
  if min_per_km.is_finite() {
    min_per_km.clamp(fastest, slowest)
  } else {
    slowest
  }
}

/// "m:ss" for a min/km pace
pub fn format_pace(min_per_km: f64) -> String {
  let total_seconds = (clamp_pace_for_display(min_per_km) * 60.0).round() as u32;
  format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// ---------------------------------------------------------------------------
/// Zones
/// ---------------------------------------------------------------------------

/// Pace band in whole seconds per km
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDisplay {
  pub min_seconds_per_km: u32,
  pub max_seconds_per_km: u32,
}

impl From<PaceRange> for ZoneDisplay {
  fn from(range: PaceRange) -> Self {
    let seconds = |pace: f64| (clamp_pace_for_display(pace) * 60.0).round() as u32;
    Self {
      min_seconds_per_km: seconds(range.min_pace),
      max_seconds_per_km: seconds(range.max_pace),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZonesDisplay {
  pub recovery: ZoneDisplay,
  pub easy: ZoneDisplay,
  pub tempo: ZoneDisplay,
  pub threshold: ZoneDisplay,
  pub interval: ZoneDisplay,
}

pub fn zones_for_display(zones: &TrainingZones) -> ZonesDisplay {
  ZonesDisplay {
    recovery: zones.recovery.into(),
    easy: zones.easy.into(),
    tempo: zones.tempo.into(),
    threshold: zones.threshold.into(),
    interval: zones.interval.into(),
  }
}

/// ---------------------------------------------------------------------------
/// Goals
/// ---------------------------------------------------------------------------

pub fn plan_name(request: &GoalRequest) -> String {
  let race = request.race_type.as_deref().map(str::trim).filter(|r| !r.is_empty());
  let target = request.target_time.as_deref().map(str::trim).filter(|t| !t.is_empty());

  match (race, target) {
    (Some(race), Some(target)) => format!("{} Training Plan - Target {}", race.to_uppercase(), target),
    (Some(race), None) => format!("{} Training Plan", race.to_uppercase()),
    _ => "Personalized Running Plan".to_string(),
  }
}

pub fn goals_for_display(request: &GoalRequest) -> Vec<String> {
  let mut formatted = Vec::new();

  if let Some(race) = request.race_type.as_deref().filter(|r| !r.trim().is_empty()) {
    formatted.push(format!("Train for {}", race.trim().to_uppercase()));
  }
  if let Some(target) = request.target_time.as_deref().filter(|t| !t.trim().is_empty()) {
    formatted.push(format!("Target time: {}", target.trim()));
  }
  if let Some(km) = request.weekly_km {
    formatted.push(format!("Weekly goal: {} km", km));
  }
  if let Some(date) = request.race_date {
    formatted.push(format!("Race date: {}", date.format("%Y-%m-%d")));
  }

  if formatted.is_empty() {
    formatted.push("General fitness improvement".to_string());
  }
  formatted
}

/// Rebuild the display request from stored goals
fn request_from_goals(goals: &Goals) -> GoalRequest {
  GoalRequest {
    race_type: goals
      .target_distance_km
      .and_then(RaceType::for_distance)
      .map(|r| r.as_str().to_string()),
    target_time: goals
      .target_time_min
      .map(|m| format!("{}:{:02}", m / 60, m % 60)),
    race_date: goals.race_date,
    weekly_km: goals.weekly_target_km,
    focus_area: goals.focus_area,
  }
}

/// ---------------------------------------------------------------------------
/// Plan Summary
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
  pub name: String,
  pub goals: Vec<String>,
  pub weekly_volume_km: f64,
  pub average_pace: String,
  /// Runs over the 4-week analysis window
  pub total_runs: u32,
  pub consistency: f64,
  pub training_zones: ZonesDisplay,
  pub adaptations: Vec<String>,
}

impl PlanSummary {
  /// `request` overrides the goals stored on the plan when present
  pub fn build(plan: &TrainingPlan, request: Option<&GoalRequest>) -> Self {
    let stored;
    let request = match request {
      Some(r) => r,
      None => {
        stored = request_from_goals(&plan.goals);
        &stored
      }
    };

    Self {
      name: plan_name(request),
      goals: goals_for_display(request),
      weekly_volume_km: (plan.metrics.weekly_distance_km * 10.0).round() / 10.0,
      average_pace: format_pace(plan.metrics.average_pace_min_per_km),
      total_runs: (plan.metrics.weekly_run_count * 4.0).round() as u32,
      consistency: plan.metrics.consistency_score,
      training_zones: zones_for_display(&plan.training_zones),
      adaptations: plan.adaptations.iter().map(ToString::to_string).collect(),
    }
  }
}

/// One line per workout for terminal output
pub fn workout_line(workout: &Workout) -> String {
  let day = workout.date.format("%a %Y-%m-%d");
  let distance = workout
    .distance_km
    .map(|km| format!(" {:.1} km ({:.1} mi)", km, km_to_miles(km)))
    .unwrap_or_default();
  let pace = workout
    .target_pace
    .map(|p| format!(" @ {}-{}/km", format_pace(p.min_pace), format_pace(p.max_pace)))
    .unwrap_or_default();

  format!(
    "{}  {:<9} {:>3} min{}{}  {}",
    day,
    workout.workout_type.as_str(),
    workout.duration_minutes,
    distance,
    pace,
    workout.description
  )
}

/// Days until the race, if one is set and still ahead
pub fn days_to_race(goals: &Goals, today: NaiveDate) -> Option<i64> {
  goals
    .race_date
    .map(|race| (race - today).num_days())
    .filter(|days| *days >= 0)
}
