use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adaptation::AdaptationLog;
use crate::analysis::RunningMetrics;
use crate::goals::Goals;
use crate::zones::TrainingZones;

/// ---------------------------------------------------------------------------
/// Workout Building Blocks
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutType {
  Easy,
  Tempo,
  Interval,
  Long,
  Recovery,
  Hill,
  Fartlek,
}

impl WorkoutType {
  pub fn as_str(&self) -> &'static str {
    match self {
      WorkoutType::Easy => "easy",
      WorkoutType::Tempo => "tempo",
      WorkoutType::Interval => "interval",
      WorkoutType::Long => "long",
      WorkoutType::Recovery => "recovery",
      WorkoutType::Hill => "hill",
      WorkoutType::Fartlek => "fartlek",
    }
  }
}

impl std::fmt::Display for WorkoutType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
  Low,
  Medium,
  High,
}

/// A pace band in min/km. `min` is the faster end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaceRange {
  pub min_pace: f64,
  pub max_pace: f64,
}

impl PaceRange {
  pub fn new(min_pace: f64, max_pace: f64) -> Self {
    Self { min_pace, max_pace }
  }
}

/// Structure of an interval session, all durations in minutes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalSpec {
  pub warmup_min: f64,
  pub work_min: f64,
  pub rest_min: f64,
  pub repeats: u32,
  pub cooldown_min: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
  pub date: NaiveDate,
  pub workout_type: WorkoutType,
  pub duration_minutes: u32,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub distance_km: Option<f64>,
  pub description: String,
  pub intensity: Intensity,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub target_pace: Option<PaceRange>,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub interval_spec: Option<IntervalSpec>,
  pub adaptation_tags: Vec<String>,
}

/// ---------------------------------------------------------------------------
/// Training Plan (root aggregate, one per user)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingPlan {
  pub id: Uuid,
  pub user_id: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub weekly_plan: Vec<Workout>,
  pub goals: Goals,
  pub metrics: RunningMetrics,
  pub training_zones: TrainingZones,
  pub adaptations: AdaptationLog,
}

impl TrainingPlan {
  /// Age of the plan measured from creation; syncs do not reset it
  pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
    now - self.created_at
  }
}

/// What a plan request hands back: the stored plan plus this week's workouts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView {
  pub plan: TrainingPlan,
  pub upcoming_workouts: Vec<Workout>,
  /// True when the stored metrics were reused without an upstream fetch
  pub reused: bool,
}
