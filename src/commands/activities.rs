use chrono::Utc;

use crate::analysis::{recent_running, ActivityStats};
use crate::commands::require_account;
use crate::db::AppState;
use crate::error::CoachResult;
use crate::models::ActivityRecord;
use crate::store::SqliteStore;

pub const DEFAULT_ACTIVITY_LIMIT: i64 = 50;
pub const DEFAULT_STATS_DAYS: i64 = 28;

/// Upper bound on rows read for a stats window
const STATS_ROW_LIMIT: i64 = 1000;

/// Cached activities, most recent first
pub async fn get_cached_activities(
  state: &AppState,
  user_id: &str,
  limit: i64,
) -> CoachResult<Vec<ActivityRecord>> {
  require_account(state, user_id).await?;
  let activities = SqliteStore::new(state.db.clone())
    .list_activities(user_id, limit.max(1))
    .await?;
  Ok(activities)
}

/// Running totals over the cached activities of the last `days` days
pub async fn get_activity_stats(state: &AppState, user_id: &str, days: i64) -> CoachResult<ActivityStats> {
  require_account(state, user_id).await?;
  let cached = SqliteStore::new(state.db.clone())
    .list_activities(user_id, STATS_ROW_LIMIT)
    .await?;

  let window: Vec<ActivityRecord> = recent_running(&cached, Utc::now(), days.max(1))
    .into_iter()
    .cloned()
    .collect();

  Ok(ActivityStats::compute(&window))
}
