//! Pace-based training zones
//!
//! Five bands derived as fixed offsets from the athlete's average pace.
//! Values are not clamped here; clamping for display lives in `summary`.

use serde::{Deserialize, Serialize};

use crate::analysis::RunningMetrics;
use crate::models::PaceRange;

/// Offsets in min/km from average pace, as (faster end, slower end)
const RECOVERY_OFFSETS: (f64, f64) = (1.5, 2.5);
const EASY_OFFSETS: (f64, f64) = (0.5, 1.5);
const TEMPO_OFFSETS: (f64, f64) = (-0.3, 0.2);
const THRESHOLD_OFFSETS: (f64, f64) = (-0.8, -0.3);
const INTERVAL_OFFSETS: (f64, f64) = (-1.5, -0.8);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingZones {
  pub recovery: PaceRange,
  pub easy: PaceRange,
  pub tempo: PaceRange,
  pub threshold: PaceRange,
  pub interval: PaceRange,
}

impl TrainingZones {
  /// Zones in order from fastest to slowest, with their names
  pub fn named(&self) -> [(&'static str, PaceRange); 5] {
    [
      ("interval", self.interval),
      ("threshold", self.threshold),
      ("tempo", self.tempo),
      ("easy", self.easy),
      ("recovery", self.recovery),
    ]
  }
}

fn band(average_pace: f64, (low, high): (f64, f64)) -> PaceRange {
  PaceRange::new(average_pace + low, average_pace + high)
}

/// Only `average_pace_min_per_km` is used
pub fn calculate_training_zones(metrics: &RunningMetrics) -> TrainingZones {
  let avg = metrics.average_pace_min_per_km;
  TrainingZones {
    recovery: band(avg, RECOVERY_OFFSETS),
    easy: band(avg, EASY_OFFSETS),
    tempo: band(avg, TEMPO_OFFSETS),
    threshold: band(avg, THRESHOLD_OFFSETS),
    interval: band(avg, INTERVAL_OFFSETS),
  }
}
