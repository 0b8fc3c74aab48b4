use chrono::Utc;
use serde::Serialize;

use crate::commands::{orchestrator, require_account};
use crate::db::AppState;
use crate::error::{CoachError, CoachResult};
use crate::goals::{GoalRequest, Goals};
use crate::models::{PlanView, Workout};
use crate::summary::PlanSummary;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
  #[serde(flatten)]
  pub view: PlanView,
  pub summary: PlanSummary,
}

/// ---------------------------------------------------------------------------
/// Get or Create
/// ---------------------------------------------------------------------------

pub async fn get_training_plan(state: &AppState, user_id: &str) -> CoachResult<PlanResponse> {
  let account = require_account(state, user_id).await?;
  let view = orchestrator(state).get_or_create_plan(&account, Utc::now()).await?;
  let summary = PlanSummary::build(&view.plan, None);
  Ok(PlanResponse { view, summary })
}

/// ---------------------------------------------------------------------------
/// Regenerate With Goals
/// ---------------------------------------------------------------------------

pub async fn generate_training_plan(
  state: &AppState,
  user_id: &str,
  request: &GoalRequest,
) -> CoachResult<PlanResponse> {
  // Validate before touching the network
  let goals = Goals::from_request(request)?;
  let account = require_account(state, user_id).await?;

  let plan = orchestrator(state).generate_plan(&account, goals, Utc::now()).await?;
  let summary = PlanSummary::build(&plan, Some(request));

  Ok(PlanResponse {
    view: PlanView {
      upcoming_workouts: plan.weekly_plan.clone(),
      plan,
      reused: false,
    },
    summary,
  })
}

/// ---------------------------------------------------------------------------
/// Current Week
/// ---------------------------------------------------------------------------

pub async fn get_current_week(state: &AppState, user_id: &str) -> CoachResult<Vec<Workout>> {
  orchestrator(state)
    .current_week(user_id, Utc::now().date_naive())
    .await?
    .ok_or_else(|| CoachError::PlanNotFound(user_id.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::WorkoutType;
  use crate::test_utils::{
    mock_run, seed_test_account, setup_test_db, strava_body, teardown_test_db, test_state,
  };
  use mockito::Matcher;
  use serial_test::serial;

  #[tokio::test]
  #[serial]
  async fn test_plan_is_created_once_then_reused() {
    let pool = setup_test_db().await;
    let mut server = mockito::Server::new_async().await;
    let now = Utc::now();
    let runs: Vec<_> = (0..10).map(|i| mock_run(i * 2, 10.0, 52.0, now)).collect();

    let mock = server
      .mock("GET", "/athlete/activities")
      .match_query(Matcher::Any)
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(strava_body(&runs))
      .expect(1)
      .create_async()
      .await;

    let state = test_state(pool.clone(), &server.url());
    seed_test_account(&pool, "athlete-1").await;

    let first = get_training_plan(&state, "athlete-1").await.unwrap();
    let second = get_training_plan(&state, "athlete-1").await.unwrap();

    mock.assert_async().await;
    assert!(!first.view.reused);
    assert!(second.view.reused);
    assert_eq!(first.view.plan.id, second.view.plan.id);
    assert_eq!(first.view.upcoming_workouts.len(), 7);
    // 10 x 10km over four weeks, longest 10km
    assert_eq!(first.view.upcoming_workouts[0].workout_type, WorkoutType::Long);
    assert_eq!(first.summary.name, "Personalized Running Plan");

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_unconnected_user_is_rejected() {
    let pool = setup_test_db().await;
    let state = test_state(pool.clone(), "http://127.0.0.1:9");

    let result = get_training_plan(&state, "nobody").await;
    assert!(matches!(result, Err(CoachError::NotConnected(_))));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_generate_with_goals_and_current_week() {
    let pool = setup_test_db().await;
    let mut server = mockito::Server::new_async().await;
    server
      .mock("GET", "/athlete/activities")
      .match_query(Matcher::Any)
      .with_status(200)
      .with_body("[]")
      .create_async()
      .await;

    let state = test_state(pool.clone(), &server.url());
    seed_test_account(&pool, "athlete-1").await;

    assert!(matches!(
      get_current_week(&state, "athlete-1").await,
      Err(CoachError::PlanNotFound(_))
    ));

    let request = GoalRequest {
      race_type: Some("10k".to_string()),
      target_time: Some("0:50".to_string()),
      ..GoalRequest::default()
    };
    let response = generate_training_plan(&state, "athlete-1", &request).await.unwrap();

    assert_eq!(response.summary.name, "10K Training Plan - Target 0:50");
    assert_eq!(response.view.plan.goals.target_distance_km, Some(10.0));
    // Speed focus puts intervals on day three
    assert_eq!(response.view.plan.weekly_plan[2].workout_type, WorkoutType::Interval);

    let week = get_current_week(&state, "athlete-1").await.unwrap();
    assert_eq!(week.len(), 7);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  #[serial]
  async fn test_invalid_goals_are_rejected_before_fetch() {
    let pool = setup_test_db().await;
    let state = test_state(pool.clone(), "http://127.0.0.1:9");
    seed_test_account(&pool, "athlete-1").await;

    let request = GoalRequest {
      race_type: Some("ultra".to_string()),
      ..GoalRequest::default()
    };
    let result = generate_training_plan(&state, "athlete-1", &request).await;
    assert!(matches!(result, Err(CoachError::InvalidGoal(_))));

    teardown_test_db(pool).await;
  }
}
