use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::db::AppState;
use crate::error::CoachResult;
use crate::models::AthleteAccount;
use crate::store::SqliteStore;

/// ---------------------------------------------------------------------------
/// Account Status
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatus {
  pub user_id: String,
  pub is_connected: bool,
  pub token_expired: bool,
  pub expires_at: Option<String>,
  pub last_sync_at: Option<String>,
}

impl AccountStatus {
  fn disconnected(user_id: &str) -> Self {
    Self {
      user_id: user_id.to_string(),
      is_connected: false,
      token_expired: false,
      expires_at: None,
      last_sync_at: None,
    }
  }

  fn from_account(account: &AthleteAccount, now: DateTime<Utc>) -> Self {
    Self {
      user_id: account.user_id.clone(),
      is_connected: true,
      token_expired: account.token_expired(now),
      expires_at: account.token_expires_at.map(|t| t.to_rfc3339()),
      last_sync_at: account.last_sync_at.map(|t| t.to_rfc3339()),
    }
  }
}

pub async fn get_account_status(state: &AppState, user_id: &str) -> CoachResult<AccountStatus> {
  let store = SqliteStore::new(state.db.clone());
  let status = match store.get_account(user_id).await? {
    Some(account) => AccountStatus::from_account(&account, Utc::now()),
    None => AccountStatus::disconnected(user_id),
  };
  Ok(status)
}

/// ---------------------------------------------------------------------------
/// Connect / Disconnect
/// ---------------------------------------------------------------------------

/// Store credentials obtained elsewhere (token exchange is not done here)
pub async fn connect_account(
  state: &AppState,
  user_id: &str,
  access_token: &str,
  refresh_token: Option<String>,
  expires_at: Option<DateTime<Utc>>,
) -> CoachResult<AccountStatus> {
  let store = SqliteStore::new(state.db.clone());
  let last_sync_at = store.get_account(user_id).await?.and_then(|a| a.last_sync_at);

  let account = AthleteAccount {
    user_id: user_id.to_string(),
    access_token: access_token.to_string(),
    refresh_token,
    token_expires_at: expires_at,
    last_sync_at,
  };
  store.upsert_account(&account).await?;

  info!(user_id, "Strava account connected");
  Ok(AccountStatus::from_account(&account, Utc::now()))
}

/// Returns false when there was nothing to disconnect
pub async fn disconnect_account(state: &AppState, user_id: &str) -> CoachResult<bool> {
  let removed = SqliteStore::new(state.db.clone()).delete_account(user_id).await?;
  if removed {
    info!(user_id, "Strava account disconnected");
  }
  Ok(removed)
}
