use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration as StdDuration;
use tracing::{debug, warn};
use url::Url;

use crate::config::AppConfig;
use crate::models::{ActivityRecord, AthleteAccount};
use crate::orchestrator::ActivitySource;

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

pub const STRAVA_API_BASE: &str = "https://www.strava.com/api/v3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
const ACTIVITIES_PER_PAGE: u32 = 200;
const ERROR_PREVIEW_CHARS: usize = 500;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
  #[error("HTTP request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("Strava request timed out")]
  Timeout,

  #[error("Not authenticated with Strava")]
  NotAuthenticated,

  #[error("Strava API error: {0}")]
  Api(String),

  #[error("Failed to parse Strava response: {0}")]
  Parse(String),
}

impl Serialize for SourceError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Strava API - Activity Payload
/// ---------------------------------------------------------------------------

/// Activity summary from Strava API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StravaActivity {
  pub id: i64,
  #[serde(default)]
  pub name: String,
  /// Strava uses "type" for legacy and "sport_type" for newer activities
  #[serde(rename = "type", default)]
  pub activity_type: String,
  #[serde(default)]
  pub sport_type: Option<String>,
  pub start_date: DateTime<Utc>,
  #[serde(default)]
  pub elapsed_time: Option<i64>,
  #[serde(default)]
  pub moving_time: Option<i64>,
  #[serde(default)]
  pub distance: Option<f64>,
  #[serde(default)]
  pub total_elevation_gain: Option<f64>,
  #[serde(default)]
  pub average_heartrate: Option<f64>,
  #[serde(default)]
  pub max_heartrate: Option<f64>,
}

impl From<StravaActivity> for ActivityRecord {
  fn from(a: StravaActivity) -> Self {
    let activity_type = if a.activity_type.is_empty() {
      a.sport_type.unwrap_or_default()
    } else {
      a.activity_type
    };

    ActivityRecord {
      id: a.id,
      name: a.name,
      activity_type,
      start_timestamp: a.start_date,
      distance_meters: a.distance,
      moving_time_seconds: a.moving_time,
      elapsed_time_seconds: a.elapsed_time,
      elevation_gain_meters: a.total_elevation_gain,
      average_heart_rate: a.average_heartrate,
      max_heart_rate: a.max_heartrate,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Strava API Client
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StravaClient {
  http: Client,
  base_url: Url,
}

impl StravaClient {
  pub fn new(base_url: Url, timeout: StdDuration) -> Result<Self, SourceError> {
    let http = Client::builder().timeout(timeout).build()?;
    Ok(Self { http, base_url })
  }

  pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
    Self::new(config.strava_api_base.clone(), config.strava_timeout)
  }

  fn activities_url(&self, after: i64) -> Result<Url, SourceError> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| SourceError::Api(format!("Unusable API base: {}", self.base_url)))?
      .pop_if_empty()
      .extend(&["athlete", "activities"]);

    url
      .query_pairs_mut()
      .append_pair("per_page", &ACTIVITIES_PER_PAGE.to_string())
      .append_pair("page", "1")
      .append_pair("after", &after.to_string());

    Ok(url)
  }

  /// Fetch activities started after `after` (first page only)
  pub async fn fetch_activities(
    &self,
    access_token: &str,
    after: DateTime<Utc>,
  ) -> Result<Vec<ActivityRecord>, SourceError> {
    let url = self.activities_url(after.timestamp())?;
    debug!(url = %url.as_str(), "Fetching Strava activities");

    let response = self
      .http
      .get(url)
      .bearer_auth(access_token)
      .send()
      .await
      .map_err(timeout_or_request)?;

    if response.status() == StatusCode::UNAUTHORIZED {
      return Err(SourceError::NotAuthenticated);
    }

    if !response.status().is_success() {
      let status = response.status();
      let error_text = response.text().await.unwrap_or_default();
      return Err(SourceError::Api(format!(
        "Failed to fetch activities ({}): {}",
        status,
        preview(&error_text)
      )));
    }

    let response_text = response.text().await.map_err(timeout_or_request)?;

    let activities: Vec<StravaActivity> = serde_json::from_str(&response_text).map_err(|e| {
      warn!(error = %e, body = %preview(&response_text), "Unparseable Strava response");
      SourceError::Parse(e.to_string())
    })?;

    Ok(activities.into_iter().map(ActivityRecord::from).collect())
  }
}

fn timeout_or_request(e: reqwest::Error) -> SourceError {
  if e.is_timeout() {
    SourceError::Timeout
  } else {
    SourceError::Request(e)
  }
}

fn preview(text: &str) -> String {
  text.chars().take(ERROR_PREVIEW_CHARS).collect()
}

#[async_trait]
impl ActivitySource for StravaClient {
  /// A timed-out request counts as "no new activities"
  async fn fetch_recent_activities(
    &self,
    account: &AthleteAccount,
    since: DateTime<Utc>,
  ) -> Result<Vec<ActivityRecord>, SourceError> {
    match self.fetch_activities(&account.access_token, since).await {
      Err(SourceError::Timeout) => {
        warn!(user_id = %account.user_id, "Strava fetch timed out, treating as empty");
        Ok(Vec::new())
      }
      other => other,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
