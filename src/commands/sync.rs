use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::adaptation::Adaptation;
use crate::commands::{orchestrator, require_account};
use crate::db::AppState;
use crate::error::CoachResult;
use crate::store::SqliteStore;

/// ---------------------------------------------------------------------------
/// Sync Activities from Strava
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
  pub total_fetched: usize,
  pub new_activities: usize,
  pub adaptations: Vec<Adaptation>,
  /// False when the user has no plan yet
  pub plan_updated: bool,
  pub synced_at: String,
}

/// Pull recent activities, cache them, and fold them into the stored plan
pub async fn sync_activities(state: &AppState, user_id: &str) -> CoachResult<SyncReport> {
  let account = require_account(state, user_id).await?;
  let now = Utc::now();

  let orch = orchestrator(state);
  let activities = orch.fetch_recent(&account, now).await;

  // Cache before adapting so a failed write leaves the plan untouched
  let store = SqliteStore::new(state.db.clone());
  let new_activities = store.cache_activities(user_id, &activities).await?;
  store.mark_synced(user_id, now).await?;

  let outcome = orch.apply_sync(&account, activities, now).await?;

  info!(
    user_id,
    total_fetched = outcome.activities.len(),
    new_activities,
    "Strava sync complete"
  );

  Ok(SyncReport {
    total_fetched: outcome.activities.len(),
    new_activities,
    adaptations: outcome.adaptations,
    plan_updated: outcome.plan.is_some(),
    synced_at: now.to_rfc3339(),
  })
}
