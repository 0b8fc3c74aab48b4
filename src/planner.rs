//! Weekly workout plan builder
//!
//! Turns metrics, zones, and goals into seven dated workouts. The weekly
//! shape is fixed; only workout choice and sizing respond to the athlete:
//!
//! | slot | workout                                      |
//! |------|----------------------------------------------|
//! | 0    | long run if longest run > 8 km, else recovery |
//! | 1, 4 | recovery                                     |
//! | 2    | intervals for a speed focus, else tempo       |
//! | 3, 6 | easy                                         |
//! | 5    | hills if elevation > 100 m/week, else tempo   |
//!
//! The builder is pure: the same inputs and `today` always yield the same
//! plan.

use chrono::{Duration, NaiveDate};

use crate::analysis::RunningMetrics;
use crate::goals::{resolve_focus_area, FocusArea, Goals};
use crate::models::{Intensity, IntervalSpec, PaceRange, Workout, WorkoutType};
use crate::zones::TrainingZones;

pub const DAYS_IN_PLAN: usize = 7;

const LONG_RUN_TRIGGER_KM: f64 = 8.0;
const HILL_TRIGGER_ELEVATION_M: f64 = 100.0;

/// ---------------------------------------------------------------------------
/// Plan Assembly
/// ---------------------------------------------------------------------------

pub fn build_weekly_plan(
  metrics: &RunningMetrics,
  zones: &TrainingZones,
  goals: &Goals,
  today: NaiveDate,
) -> Vec<Workout> {
  let focus = resolve_focus_area(metrics, goals);

  (0..DAYS_IN_PLAN)
    .map(|slot| {
      let date = today + Duration::days(slot as i64);
      match slot {
        0 if metrics.longest_run_km > LONG_RUN_TRIGGER_KM => long_run(date, metrics, zones),
        0 | 1 | 4 => recovery(date),
        2 if focus == FocusArea::Speed => intervals(date, metrics, zones),
        3 | 6 => easy_run(date, metrics, zones),
        5 if metrics.total_elevation_gain_m > HILL_TRIGGER_ELEVATION_M => hills(date, zones),
        _ => tempo(date, metrics, zones),
      }
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Workout Templates
/// ---------------------------------------------------------------------------

fn minutes(value: f64) -> u32 {
  value.round().max(0.0) as u32
}

fn tags(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| s.to_string()).collect()
}

fn easy_run(date: NaiveDate, metrics: &RunningMetrics, zones: &TrainingZones) -> Workout {
  let distance = (metrics.weekly_distance_km * 0.2).max(3.0);
  Workout {
    date,
    workout_type: WorkoutType::Easy,
    duration_minutes: minutes(distance * zones.easy.max_pace),
    distance_km: Some(distance),
    description: "Easy-paced run to build aerobic base. Keep effort conversational.".to_string(),
    intensity: Intensity::Low,
    target_pace: Some(zones.easy),
    interval_spec: None,
    adaptation_tags: tags(&["Building aerobic base", "Active recovery"]),
  }
}

fn tempo(date: NaiveDate, metrics: &RunningMetrics, zones: &TrainingZones) -> Workout {
  let work_distance = (metrics.weekly_distance_km * 0.3).clamp(3.0, 8.0);
  Workout {
    date,
    workout_type: WorkoutType::Tempo,
    // 10 min warmup + 10 min cooldown around the tempo block
    duration_minutes: minutes(work_distance * zones.tempo.max_pace + 20.0),
    distance_km: Some(work_distance + 2.0),
    description: format!(
      "Tempo run at comfortably hard pace. 10min warmup, {}km at tempo pace, 10min cooldown.",
      work_distance.round()
    ),
    intensity: Intensity::Medium,
    target_pace: Some(zones.tempo),
    interval_spec: None,
    adaptation_tags: tags(&["Lactate threshold improvement", "Race pace practice"]),
  }
}

fn intervals(date: NaiveDate, metrics: &RunningMetrics, zones: &TrainingZones) -> Workout {
  let repeats = ((metrics.weekly_distance_km / 5.0).floor().max(0.0) as u32).clamp(4, 8);
  Workout {
    date,
    workout_type: WorkoutType::Interval,
    duration_minutes: 45,
    distance_km: Some(6.0),
    description: format!(
      "{}x400m intervals with 90s recovery. Focus on form and controlled speed.",
      repeats
    ),
    intensity: Intensity::High,
    target_pace: Some(zones.interval),
    interval_spec: Some(IntervalSpec {
      warmup_min: 15.0,
      work_min: 2.0,
      rest_min: 1.5,
      repeats,
      cooldown_min: 10.0,
    }),
    adaptation_tags: tags(&["VO2 max improvement", "Speed development", "Running economy"]),
  }
}

fn long_run(date: NaiveDate, metrics: &RunningMetrics, zones: &TrainingZones) -> Workout {
  let distance = (metrics.longest_run_km * 1.1).clamp(8.0, 25.0);
  Workout {
    date,
    workout_type: WorkoutType::Long,
    duration_minutes: minutes(distance * zones.easy.max_pace),
    distance_km: Some(distance),
    description: "Long steady run at easy pace. Focus on time on feet and endurance building."
      .to_string(),
    intensity: Intensity::Medium,
    target_pace: Some(zones.easy),
    interval_spec: None,
    adaptation_tags: tags(&["Aerobic capacity", "Mental toughness", "Fat oxidation"]),
  }
}

fn hills(date: NaiveDate, zones: &TrainingZones) -> Workout {
  Workout {
    date,
    workout_type: WorkoutType::Hill,
    duration_minutes: 40,
    distance_km: Some(5.0),
    description: "Hill repeats: 6x2min uphill at hard effort, easy jog down recovery.".to_string(),
    intensity: Intensity::High,
    target_pace: Some(PaceRange::new(zones.threshold.min_pace, zones.tempo.max_pace)),
    interval_spec: None,
    adaptation_tags: tags(&["Leg strength", "Power development", "Running form"]),
  }
}

fn recovery(date: NaiveDate) -> Workout {
  Workout {
    date,
    workout_type: WorkoutType::Recovery,
    duration_minutes: 30,
    distance_km: Some(3.0),
    description: "Recovery run or cross-training. Light effort, focus on movement and recovery."
      .to_string(),
    intensity: Intensity::Low,
    target_pace: None,
    interval_spec: None,
    adaptation_tags: tags(&["Active recovery", "Injury prevention"]),
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
