pub mod adaptation;
pub mod analysis;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod goals;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod planner;
pub mod store;
pub mod strava;
pub mod summary;
pub mod zones;

#[cfg(test)]
pub mod test_utils;

use config::AppConfig;
use db::AppState;
use strava::StravaClient;

/// Build the shared application state: config from the environment,
/// database pool with migrations applied, and the Strava client.
///
/// Callers load `.env` first.
pub async fn bootstrap(database_url: Option<String>) -> anyhow::Result<AppState> {
  let mut config = AppConfig::from_env()?;
  if let Some(url) = database_url {
    config.database_url = url;
  }

  let db = db::initialize_db(&config.database_url).await?;
  let strava = StravaClient::from_config(&config)?;

  Ok(AppState { db, config, strava })
}
