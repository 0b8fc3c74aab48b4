//! Plan Orchestrator
//!
//! Decides, per request, whether a user's plan is reused, regenerated, or
//! synced, and drives the analyze → zones → build pipeline accordingly.
//!
//! Activity fetching and plan persistence sit behind the `ActivitySource`
//! and `PlanStore` traits so the decision logic can be exercised without
//! Strava or SQLite.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::adaptation::{assess_sync, compare_metrics, initial_plan_entry, Adaptation, AdaptationLog};
use crate::analysis::analyze_running_data;
use crate::error::{CoachError, StoreError};
use crate::goals::Goals;
use crate::models::{ActivityRecord, AthleteAccount, PlanView, TrainingPlan, Workout};
use crate::planner::build_weekly_plan;
use crate::strava::SourceError;
use crate::zones::calculate_training_zones;

pub const DEFAULT_FETCH_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_FRESHNESS_DAYS: i64 = 7;

/// ---------------------------------------------------------------------------
/// Collaborator Traits
/// ---------------------------------------------------------------------------

#[async_trait]
pub trait ActivitySource: Send + Sync {
  /// Activities started after `since`, newest data as the source reports it
  async fn fetch_recent_activities(
    &self,
    account: &AthleteAccount,
    since: DateTime<Utc>,
  ) -> Result<Vec<ActivityRecord>, SourceError>;
}

#[async_trait]
pub trait PlanStore: Send + Sync {
  async fn get_plan(&self, user_id: &str) -> Result<Option<TrainingPlan>, StoreError>;

  /// Full replace of the user's plan document
  async fn save_plan(&self, plan: &TrainingPlan) -> Result<(), StoreError>;
}

/// ---------------------------------------------------------------------------
/// Orchestrator
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
  pub fetch_window_days: i64,
  pub freshness_days: i64,
}

impl Default for OrchestratorConfig {
  fn default() -> Self {
    Self {
      fetch_window_days: DEFAULT_FETCH_WINDOW_DAYS,
      freshness_days: DEFAULT_FRESHNESS_DAYS,
    }
  }
}

/// Result of a sync pass
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
  pub activities: Vec<ActivityRecord>,
  /// Entries appended by this pass; empty when the user has no plan yet
  pub adaptations: Vec<Adaptation>,
  pub plan: Option<TrainingPlan>,
}

pub struct PlanOrchestrator<S, P> {
  source: S,
  store: P,
  config: OrchestratorConfig,
}

impl<S: ActivitySource, P: PlanStore> PlanOrchestrator<S, P> {
  pub fn new(source: S, store: P, config: OrchestratorConfig) -> Self {
    Self { source, store, config }
  }

  /// Return the user's plan, regenerating it only when missing or stale.
  ///
  /// A fresh plan keeps its metrics and zones; only the week is rebuilt
  /// from `now`, nothing is fetched and nothing is written.
  pub async fn get_or_create_plan(
    &self,
    account: &AthleteAccount,
    now: DateTime<Utc>,
  ) -> Result<PlanView, CoachError> {
    let freshness = Duration::days(self.config.freshness_days);

    let existing = match self.store.get_plan(&account.user_id).await? {
      Some(mut plan) if plan.age(now) < freshness => {
        debug!(user_id = %account.user_id, plan_id = %plan.id, "Reusing fresh plan");
        let week = build_weekly_plan(&plan.metrics, &plan.training_zones, &plan.goals, now.date_naive());
        plan.weekly_plan = week.clone();
        return Ok(PlanView {
          plan,
          upcoming_workouts: week,
          reused: true,
        });
      }
      other => other,
    };

    let goals = existing.as_ref().map(|p| p.goals.clone()).unwrap_or_default();
    let plan = self.regenerate(account, goals, existing, now).await?;

    Ok(PlanView {
      upcoming_workouts: plan.weekly_plan.clone(),
      plan,
      reused: false,
    })
  }

  /// Regenerate the plan now with new goals, regardless of freshness
  pub async fn generate_plan(
    &self,
    account: &AthleteAccount,
    goals: Goals,
    now: DateTime<Utc>,
  ) -> Result<TrainingPlan, CoachError> {
    let existing = self.store.get_plan(&account.user_id).await?;
    self.regenerate(account, goals, existing, now).await
  }

  /// Fetch recent activity and fold it into the stored plan.
  ///
  /// Without a stored plan the fetched activities are only reported back.
  pub async fn sync(
    &self,
    account: &AthleteAccount,
    now: DateTime<Utc>,
  ) -> Result<SyncOutcome, CoachError> {
    let activities = self.fetch_recent(account, now).await;
    self.apply_sync(account, activities, now).await
  }

  /// Second half of `sync`, for callers that persist the fetched
  /// activities before the plan is touched
  pub async fn apply_sync(
    &self,
    account: &AthleteAccount,
    activities: Vec<ActivityRecord>,
    now: DateTime<Utc>,
  ) -> Result<SyncOutcome, CoachError> {
    let Some(mut plan) = self.store.get_plan(&account.user_id).await? else {
      info!(user_id = %account.user_id, fetched = activities.len(), "Sync without a plan, nothing to adapt");
      return Ok(SyncOutcome {
        activities,
        adaptations: Vec::new(),
        plan: None,
      });
    };

    let metrics = analyze_running_data(&activities, now);
    let adaptations = assess_sync(&activities, &metrics, &plan.metrics, now);
    let zones = calculate_training_zones(&metrics);

    plan.weekly_plan = build_weekly_plan(&metrics, &zones, &plan.goals, now.date_naive());
    plan.metrics = metrics;
    plan.training_zones = zones;
    plan.adaptations = plan.adaptations.appended(adaptations.clone());
    plan.updated_at = now;

    self.store.save_plan(&plan).await?;

    info!(
      user_id = %account.user_id,
      fetched = activities.len(),
      adaptations = adaptations.len(),
      "Plan synced"
    );

    Ok(SyncOutcome {
      activities,
      adaptations,
      plan: Some(plan),
    })
  }

  /// Seven days starting `today`, rebuilt from the stored plan's metrics,
  /// zones and goals. Nothing is fetched or written.
  pub async fn current_week(
    &self,
    user_id: &str,
    today: NaiveDate,
  ) -> Result<Option<Vec<Workout>>, CoachError> {
    let week = self
      .store
      .get_plan(user_id)
      .await?
      .map(|plan| build_weekly_plan(&plan.metrics, &plan.training_zones, &plan.goals, today));
    Ok(week)
  }

  /// -------------------------------------------------------------------------
  /// Internals
  /// -------------------------------------------------------------------------

  async fn regenerate(
    &self,
    account: &AthleteAccount,
    goals: Goals,
    previous: Option<TrainingPlan>,
    now: DateTime<Utc>,
  ) -> Result<TrainingPlan, CoachError> {
    let activities = self.fetch_recent(account, now).await;
    let metrics = analyze_running_data(&activities, now);
    let zones = calculate_training_zones(&metrics);
    let weekly_plan = build_weekly_plan(&metrics, &zones, &goals, now.date_naive());

    let adaptations = match &previous {
      Some(old) => old.adaptations.clone().appended(compare_metrics(&metrics, &old.metrics, now)),
      None => AdaptationLog::new().appended([initial_plan_entry(now)]),
    };

    let plan = TrainingPlan {
      id: Uuid::new_v4(),
      user_id: account.user_id.clone(),
      created_at: now,
      updated_at: now,
      weekly_plan,
      goals,
      metrics,
      training_zones: zones,
      adaptations,
    };

    self.store.save_plan(&plan).await?;

    info!(
      user_id = %account.user_id,
      plan_id = %plan.id,
      runs_analyzed = activities.iter().filter(|a| a.is_run()).count(),
      replaced = previous.is_some(),
      "Generated training plan"
    );

    Ok(plan)
  }

  /// Activities inside the fetch window. Upstream failures degrade to
  /// "no new activities".
  pub async fn fetch_recent(&self, account: &AthleteAccount, now: DateTime<Utc>) -> Vec<ActivityRecord> {
    let since = now - Duration::days(self.config.fetch_window_days);
    match self.source.fetch_recent_activities(account, since).await {
      Ok(activities) => activities,
      Err(e) => {
        warn!(user_id = %account.user_id, error = %e, "Activity fetch failed, continuing with no activities");
        Vec::new()
      }
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
