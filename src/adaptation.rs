//! Adaptation Engine
//!
//! Explains, in plain language, how a plan changed between two snapshots.
//!
//! Key principles:
//! - Every rule that matches fires; there is no first-match short cut
//! - A pass never yields an empty list (a generic entry is the fallback)
//! - The log kept on a plan is bounded: oldest entries fall off first

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{recent_running, RunningMetrics};
use crate::models::ActivityRecord;

/// Entries kept on a plan
pub const MAX_ADAPTATIONS: usize = 10;

/// Trailing window for the sync-path checks
pub const RECENT_WINDOW_DAYS: i64 = 7;

// ---------------------------------------------------------------------------
/// Adaptation entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adaptation {
    pub reason: String,
    pub change: String,
    pub date: DateTime<Utc>,
}

impl Adaptation {
    pub fn new(reason: &str, change: &str, date: DateTime<Utc>) -> Self {
        Self {
            reason: reason.to_string(),
            change: change.to_string(),
            date,
        }
    }
}

impl std::fmt::Display for Adaptation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.reason, self.change)
    }
}

pub fn initial_plan_entry(now: DateTime<Utc>) -> Adaptation {
    Adaptation::new(
        "Initial plan creation",
        "Generated baseline training plan based on current fitness level",
        now,
    )
}

fn regular_update(now: DateTime<Utc>) -> Adaptation {
    Adaptation::new(
        "Regular plan update",
        "Fine-tuned plan based on recent performance",
        now,
    )
}

// ---------------------------------------------------------------------------
/// Bounded adaptation log
// ---------------------------------------------------------------------------

/// FIFO of the most recent adaptations, never longer than `MAX_ADAPTATIONS`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Adaptation>", into = "Vec<Adaptation>")]
pub struct AdaptationLog {
    entries: VecDeque<Adaptation>,
}

impl AdaptationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// New log with `entries` appended and the oldest dropped past the cap
    pub fn appended<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = Adaptation>,
    {
        for entry in entries {
            self.entries.push_back(entry);
            while self.entries.len() > MAX_ADAPTATIONS {
                self.entries.pop_front();
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Adaptation> {
        self.entries.iter()
    }
}

impl From<Vec<Adaptation>> for AdaptationLog {
    fn from(mut entries: Vec<Adaptation>) -> Self {
        // Stored documents may predate the cap
        entries.sort_by_key(|a| a.date);
        AdaptationLog::new().appended(entries)
    }
}

impl From<AdaptationLog> for Vec<Adaptation> {
    fn from(log: AdaptationLog) -> Self {
        log.entries.into_iter().collect()
    }
}

// ---------------------------------------------------------------------------
/// Metric snapshot rules
// ---------------------------------------------------------------------------

fn metric_rules(
    current: &RunningMetrics,
    previous: &RunningMetrics,
    now: DateTime<Utc>,
) -> Vec<Adaptation> {
    let mut adaptations = Vec::new();

    if current.weekly_distance_km > previous.weekly_distance_km * 1.1 {
        adaptations.push(Adaptation::new(
            "Increased training volume",
            "Added more distance to weekly plan",
            now,
        ));
    }

    if current.average_pace_min_per_km < previous.average_pace_min_per_km - 0.2 {
        adaptations.push(Adaptation::new(
            "Pace improvement detected",
            "Adjusted training zones for faster paces",
            now,
        ));
    }

    if current.consistency_score > previous.consistency_score + 15.0 {
        adaptations.push(Adaptation::new(
            "Improved consistency",
            "Increased workout intensity and frequency",
            now,
        ));
    }

    adaptations
}

/// Compare two metric snapshots; always returns at least one entry
pub fn compare_metrics(
    current: &RunningMetrics,
    previous: &RunningMetrics,
    now: DateTime<Utc>,
) -> Vec<Adaptation> {
    let adaptations = metric_rules(current, previous, now);
    if adaptations.is_empty() {
        vec![regular_update(now)]
    } else {
        adaptations
    }
}

// ---------------------------------------------------------------------------
/// Sync-path rules
// ---------------------------------------------------------------------------

/// Recent-week checks against the stored snapshot.
///
/// `current` is the freshly analyzed snapshot, `previous` the one stored
/// on the plan before this sync.
pub fn assess_sync(
    activities: &[ActivityRecord],
    current: &RunningMetrics,
    previous: &RunningMetrics,
    now: DateTime<Utc>,
) -> Vec<Adaptation> {
    let recent_week = recent_running(activities, now, RECENT_WINDOW_DAYS);

    if recent_week.is_empty() {
        return vec![Adaptation::new(
            "No recent runs detected",
            "Maintaining current plan intensity",
            now,
        )];
    }

    let mut adaptations = metric_rules(current, previous, now);

    let paces: Vec<f64> = recent_week
        .iter()
        .filter_map(|a| a.pace_min_per_km())
        .collect();
    if !paces.is_empty() {
        let recent_pace = paces.iter().sum::<f64>() / paces.len() as f64;
        if recent_pace < previous.average_pace_min_per_km - 0.3 {
            adaptations.push(Adaptation::new(
                "Recent pace improvement",
                "Increasing workout intensity by 5%",
                now,
            ));
        }
    }

    let recent_km: f64 = recent_week.iter().map(|a| a.distance_km()).sum();
    if recent_km > previous.weekly_distance_km * 1.2 {
        adaptations.push(Adaptation::new(
            "Volume increase noted",
            "Adjusting long run distance and recovery periods",
            now,
        ));
    }

    if recent_week.len() >= 4 {
        adaptations.push(Adaptation::new(
            "Excellent consistency",
            "Adding a tempo workout to the weekly plan",
            now,
        ));
    } else if recent_week.len() < 2 {
        adaptations.push(Adaptation::new(
            "Low activity detected",
            "Focusing on easy runs to rebuild routine",
            now,
        ));
    }

    if adaptations.is_empty() {
        adaptations.push(regular_update(now));
    }
    adaptations
}

// ---------------------------------------------------------------------------
/// Tests
// ---------------------------------------------------------------------------
