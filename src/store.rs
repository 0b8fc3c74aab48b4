//! SQLite persistence: plan documents, athlete credentials, activity cache
//!
//! A plan is stored as one JSON document per user and always replaced
//! whole. Concurrent writers for the same user are last-writer-wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::DbPool;
use crate::error::StoreError;
use crate::models::{ActivityRecord, AthleteAccount, TrainingPlan};
use crate::orchestrator::PlanStore;

#[derive(Debug, Clone)]
pub struct SqliteStore {
  pool: DbPool,
}

impl SqliteStore {
  pub fn new(pool: DbPool) -> Self {
    Self { pool }
  }

  /// ---------------------------------------------------------------------------
  /// Athlete Accounts
  /// ---------------------------------------------------------------------------

  pub async fn upsert_account(&self, account: &AthleteAccount) -> Result<(), StoreError> {
    sqlx::query(
      r#"
      INSERT INTO athletes (user_id, access_token, refresh_token, token_expires_at, last_sync_at)
      VALUES (?1, ?2, ?3, ?4, ?5)
      ON CONFLICT(user_id) DO UPDATE SET
        access_token = excluded.access_token,
        refresh_token = excluded.refresh_token,
        token_expires_at = excluded.token_expires_at
      "#,
    )
    .bind(&account.user_id)
    .bind(&account.access_token)
    .bind(&account.refresh_token)
    .bind(account.token_expires_at)
    .bind(account.last_sync_at)
    .execute(&self.pool)
    .await?;

    Ok(())
  }

  pub async fn get_account(&self, user_id: &str) -> Result<Option<AthleteAccount>, StoreError> {
    let account = sqlx::query_as::<_, AthleteAccount>(
      "SELECT user_id, access_token, refresh_token, token_expires_at, last_sync_at
       FROM athletes WHERE user_id = ?1",
    )
    .bind(user_id)
    .fetch_optional(&self.pool)
    .await?;

    Ok(account)
  }

  /// Remove credentials and cached activities; the plan is kept
  pub async fn delete_account(&self, user_id: &str) -> Result<bool, StoreError> {
    let mut tx = self.pool.begin().await?;

    sqlx::query("DELETE FROM activities WHERE user_id = ?1")
      .bind(user_id)
      .execute(&mut *tx)
      .await?;

    let result = sqlx::query("DELETE FROM athletes WHERE user_id = ?1")
      .bind(user_id)
      .execute(&mut *tx)
      .await?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
  }

  pub async fn mark_synced(&self, user_id: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
    sqlx::query("UPDATE athletes SET last_sync_at = ?1 WHERE user_id = ?2")
      .bind(at)
      .bind(user_id)
      .execute(&self.pool)
      .await?;

    Ok(())
  }

  /// ---------------------------------------------------------------------------
  /// Activity Cache
  /// ---------------------------------------------------------------------------

  /// Upsert by Strava id; returns how many activities were new
  pub async fn cache_activities(
    &self,
    user_id: &str,
    activities: &[ActivityRecord],
  ) -> Result<usize, StoreError> {
    let mut tx = self.pool.begin().await?;
    let mut new_count = 0;

    for activity in activities {
      let existing: Option<i64> = sqlx::query_scalar("SELECT strava_id FROM activities WHERE strava_id = ?1")
        .bind(activity.id)
        .fetch_optional(&mut *tx)
        .await?;

      sqlx::query(
        r#"
        INSERT INTO activities (
          strava_id, user_id, name, activity_type, start_timestamp,
          distance_meters, moving_time_seconds, elapsed_time_seconds,
          elevation_gain_meters, average_heart_rate, max_heart_rate
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT(strava_id) DO UPDATE SET
          name = excluded.name,
          activity_type = excluded.activity_type,
          start_timestamp = excluded.start_timestamp,
          distance_meters = excluded.distance_meters,
          moving_time_seconds = excluded.moving_time_seconds,
          elapsed_time_seconds = excluded.elapsed_time_seconds,
          elevation_gain_meters = excluded.elevation_gain_meters,
          average_heart_rate = excluded.average_heart_rate,
          max_heart_rate = excluded.max_heart_rate
        "#,
      )
      .bind(activity.id)
      .bind(user_id)
      .bind(&activity.name)
      .bind(&activity.activity_type)
      .bind(activity.start_timestamp)
      .bind(activity.distance_meters)
      .bind(activity.moving_time_seconds)
      .bind(activity.elapsed_time_seconds)
      .bind(activity.elevation_gain_meters)
      .bind(activity.average_heart_rate)
      .bind(activity.max_heart_rate)
      .execute(&mut *tx)
      .await?;

      if existing.is_none() {
        new_count += 1;
      }
    }

    tx.commit().await?;
    Ok(new_count)
  }

  /// Most recent first
  pub async fn list_activities(&self, user_id: &str, limit: i64) -> Result<Vec<ActivityRecord>, StoreError> {
    let activities = sqlx::query_as::<_, ActivityRecord>(
      r#"
      SELECT strava_id, name, activity_type, start_timestamp, distance_meters,
             moving_time_seconds, elapsed_time_seconds, elevation_gain_meters,
             average_heart_rate, max_heart_rate
      FROM activities
      WHERE user_id = ?1
      ORDER BY start_timestamp DESC
      LIMIT ?2
      "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(&self.pool)
    .await?;

    Ok(activities)
  }
}

/// ---------------------------------------------------------------------------
/// Plan Documents
/// ---------------------------------------------------------------------------

#[async_trait]
impl PlanStore for SqliteStore {
  async fn get_plan(&self, user_id: &str) -> Result<Option<TrainingPlan>, StoreError> {
    let json: Option<String> = sqlx::query_scalar("SELECT plan_json FROM training_plans WHERE user_id = ?1")
      .bind(user_id)
      .fetch_optional(&self.pool)
      .await?;

    match json {
      Some(json) => Ok(Some(serde_json::from_str(&json)?)),
      None => Ok(None),
    }
  }

  async fn save_plan(&self, plan: &TrainingPlan) -> Result<(), StoreError> {
    let json = serde_json::to_string(plan)?;

    sqlx::query(
      r#"
      INSERT INTO training_plans (user_id, plan_id, plan_json, created_at, updated_at)
      VALUES (?1, ?2, ?3, ?4, ?5)
      ON CONFLICT(user_id) DO UPDATE SET
        plan_id = excluded.plan_id,
        plan_json = excluded.plan_json,
        created_at = excluded.created_at,
        updated_at = excluded.updated_at
      "#,
    )
    .bind(&plan.user_id)
    .bind(plan.id.to_string())
    .bind(&json)
    .bind(plan.created_at)
    .bind(plan.updated_at)
    .execute(&self.pool)
    .await?;

    Ok(())
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
