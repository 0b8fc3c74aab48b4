pub mod account;
pub mod activities;
pub mod plan;
pub mod sync;

use crate::db::AppState;
use crate::error::{CoachError, CoachResult};
use crate::models::AthleteAccount;
use crate::orchestrator::PlanOrchestrator;
use crate::store::SqliteStore;
use crate::strava::StravaClient;

/// Orchestrator wired to the live Strava client and the SQLite store
pub(crate) fn orchestrator(state: &AppState) -> PlanOrchestrator<StravaClient, SqliteStore> {
  PlanOrchestrator::new(
    state.strava.clone(),
    SqliteStore::new(state.db.clone()),
    state.config.orchestrator(),
  )
}

/// Stored credentials, or `NotConnected`
pub(crate) async fn require_account(state: &AppState, user_id: &str) -> CoachResult<AthleteAccount> {
  SqliteStore::new(state.db.clone())
    .get_account(user_id)
    .await?
    .ok_or_else(|| CoachError::NotConnected(user_id.to_string()))
}
