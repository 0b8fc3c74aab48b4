//! Training goals and focus-area resolution
//!
//! Goal requests arrive loosely shaped (a race-type string, an "HH:MM"
//! target time). They are validated once here into a typed `Goals` value.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::RunningMetrics;
use crate::error::CoachError;

/// ---------------------------------------------------------------------------
/// Focus Area
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
  Endurance,
  Speed,
  Strength,
  GeneralFitness,
}

impl std::fmt::Display for FocusArea {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Endurance => write!(f, "endurance"),
      Self::Speed => write!(f, "speed"),
      Self::Strength => write!(f, "strength"),
      Self::GeneralFitness => write!(f, "general_fitness"),
    }
  }
}

impl std::str::FromStr for FocusArea {
  type Err = CoachError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().replace('-', "_").as_str() {
      "endurance" => Ok(Self::Endurance),
      "speed" => Ok(Self::Speed),
      "strength" => Ok(Self::Strength),
      "general_fitness" => Ok(Self::GeneralFitness),
      other => Err(CoachError::InvalidGoal(format!("Unknown focus area: {}", other))),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Race Type Lookup
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RaceType {
  #[serde(rename = "5k")]
  FiveK,
  #[serde(rename = "10k")]
  TenK,
  HalfMarathon,
  Marathon,
  GeneralFitness,
}

impl RaceType {
  pub fn target_distance_km(&self) -> Option<f64> {
    match self {
      RaceType::FiveK => Some(5.0),
      RaceType::TenK => Some(10.0),
      RaceType::HalfMarathon => Some(21.1),
      RaceType::Marathon => Some(42.2),
      RaceType::GeneralFitness => None,
    }
  }

  pub fn focus_area(&self) -> FocusArea {
    match self {
      RaceType::Marathon | RaceType::HalfMarathon => FocusArea::Endurance,
      RaceType::FiveK | RaceType::TenK => FocusArea::Speed,
      RaceType::GeneralFitness => FocusArea::GeneralFitness,
    }
  }

  /// Inverse of `target_distance_km` for stored goals
  pub fn for_distance(km: f64) -> Option<RaceType> {
    [RaceType::FiveK, RaceType::TenK, RaceType::HalfMarathon, RaceType::Marathon]
      .into_iter()
      .find(|r| r.target_distance_km().is_some_and(|d| (d - km).abs() < 1e-6))
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      RaceType::FiveK => "5k",
      RaceType::TenK => "10k",
      RaceType::HalfMarathon => "half-marathon",
      RaceType::Marathon => "marathon",
      RaceType::GeneralFitness => "general-fitness",
    }
  }
}

impl std::str::FromStr for RaceType {
  type Err = CoachError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "5k" => Ok(Self::FiveK),
      "10k" => Ok(Self::TenK),
      "half-marathon" | "half_marathon" | "half" => Ok(Self::HalfMarathon),
      "marathon" => Ok(Self::Marathon),
      "general-fitness" | "general_fitness" => Ok(Self::GeneralFitness),
      other => Err(CoachError::InvalidGoal(format!("Unknown race type: {}", other))),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Goals
/// ---------------------------------------------------------------------------

/// Validated goals stored on a plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goals {
  /// None lets the planner derive focus from the metrics
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub focus_area: Option<FocusArea>,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub target_distance_km: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub target_time_min: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub race_date: Option<NaiveDate>,
  /// Volume the athlete asked for; shown with the goals, not used for sizing
  #[serde(skip_serializing_if = "Option::is_none", default)]
  pub weekly_target_km: Option<f64>,
}

/// Goals as a caller submits them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRequest {
  pub race_type: Option<String>,
  /// "H:MM" or "HH:MM"
  pub target_time: Option<String>,
  pub race_date: Option<NaiveDate>,
  pub weekly_km: Option<f64>,
  pub focus_area: Option<FocusArea>,
}

impl Goals {
  pub fn from_request(request: &GoalRequest) -> Result<Self, CoachError> {
    let race_type = request
      .race_type
      .as_deref()
      .filter(|s| !s.trim().is_empty())
      .map(str::parse::<RaceType>)
      .transpose()?;

    let target_time_min = request
      .target_time
      .as_deref()
      .filter(|s| !s.trim().is_empty())
      .map(parse_target_time)
      .transpose()?;

    let focus_area = request
      .focus_area
      .or_else(|| race_type.map(|r| r.focus_area()));

    Ok(Self {
      focus_area,
      target_distance_km: race_type.and_then(|r| r.target_distance_km()),
      target_time_min,
      race_date: request.race_date,
      weekly_target_km: request.weekly_km.filter(|km| km.is_finite() && *km > 0.0),
    })
  }
}

/// "H:MM" → total minutes
pub fn parse_target_time(time: &str) -> Result<u32, CoachError> {
  let invalid = || CoachError::InvalidGoal(format!("Target time must be H:MM, got {}", time));

  let (hours, minutes) = time.trim().split_once(':').ok_or_else(invalid)?;
  let hours: u32 = hours.parse().map_err(|_| invalid())?;
  let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
  if minutes >= 60 {
    return Err(invalid());
  }
  hours
    .checked_mul(60)
    .and_then(|m| m.checked_add(minutes))
    .ok_or_else(invalid)
}

/// Explicit focus wins; otherwise pick one from current metrics
pub fn resolve_focus_area(metrics: &RunningMetrics, goals: &Goals) -> FocusArea {
  if let Some(focus) = goals.focus_area {
    return focus;
  }

  if metrics.weekly_distance_km < 20.0 {
    FocusArea::Endurance
  } else if metrics.average_pace_min_per_km > 6.5 {
    FocusArea::GeneralFitness
  } else if metrics.longest_run_km < 10.0 {
    FocusArea::Endurance
  } else {
    FocusArea::Speed
  }
}
