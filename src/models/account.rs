use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored Strava credentials for one user.
///
/// Token exchange and refresh happen outside this crate; the access token
/// is handed to the activity source as an opaque bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AthleteAccount {
  pub user_id: String,
  pub access_token: String,
  pub refresh_token: Option<String>,
  pub token_expires_at: Option<DateTime<Utc>>,
  pub last_sync_at: Option<DateTime<Utc>>,
}

impl AthleteAccount {
  pub fn token_expired(&self, now: DateTime<Utc>) -> bool {
    self.token_expires_at.is_some_and(|exp| now >= exp)
  }
}
