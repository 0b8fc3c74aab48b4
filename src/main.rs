//! run-coach: adaptive running plans from Strava history
//!
//! Usage:
//! ```bash
//! # Store credentials obtained from the Strava OAuth flow
//! run-coach account connect athlete-1 --access-token <token>
//!
//! # Get (or create) this week's plan
//! run-coach plan show athlete-1
//!
//! # Regenerate with a race goal
//! run-coach plan generate athlete-1 --race-type half-marathon --target-time 1:45
//!
//! # Pull new activities and adapt the plan
//! run-coach sync athlete-1
//! ```

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

use run_coach_lib::commands::{account, activities, plan, sync};
use run_coach_lib::goals::{FocusArea, GoalRequest};
use run_coach_lib::logging::LoggingConfig;
use run_coach_lib::models::{TrainingPlan, Workout};
use run_coach_lib::summary::{days_to_race, format_pace, workout_line, PlanSummary};

#[derive(Parser)]
#[command(
  name = "run-coach",
  version,
  about = "Adaptive running coach driven by Strava activity history"
)]
struct Cli {
  #[command(subcommand)]
  command: Command,

  /// Database URL override
  #[arg(long, global = true)]
  database_url: Option<String>,

  /// Print JSON instead of human-readable output
  #[arg(long, global = true)]
  json: bool,
}

#[derive(Subcommand)]
enum Command {
  /// Strava account credentials
  Account {
    #[command(subcommand)]
    action: AccountCommand,
  },

  /// Training plan operations
  Plan {
    #[command(subcommand)]
    action: PlanCommand,
  },

  /// Fetch recent activities and adapt the stored plan
  Sync { user_id: String },

  /// Cached activities
  Activities {
    #[command(subcommand)]
    action: ActivitiesCommand,
  },
}

#[derive(Subcommand)]
enum AccountCommand {
  /// Store credentials for a user
  Connect {
    user_id: String,
    #[arg(long)]
    access_token: String,
    #[arg(long)]
    refresh_token: Option<String>,
    /// RFC 3339 expiry of the access token
    #[arg(long)]
    expires_at: Option<DateTime<Utc>>,
  },
  /// Remove credentials and cached activities
  Disconnect { user_id: String },
  Status { user_id: String },
}

#[derive(Subcommand)]
enum PlanCommand {
  /// Current plan, generated if missing or older than the freshness window
  Show { user_id: String },

  /// Regenerate the plan now with new goals
  Generate {
    user_id: String,
    /// 5k, 10k, half-marathon, marathon, general-fitness
    #[arg(long)]
    race_type: Option<String>,
    /// H:MM
    #[arg(long)]
    target_time: Option<String>,
    #[arg(long)]
    race_date: Option<NaiveDate>,
    #[arg(long)]
    weekly_km: Option<f64>,
    /// endurance, speed, strength, general_fitness
    #[arg(long)]
    focus: Option<String>,
  },

  /// Workouts for the seven days starting today, from the stored plan
  Week { user_id: String },
}

#[derive(Subcommand)]
enum ActivitiesCommand {
  List {
    user_id: String,
    #[arg(long, default_value_t = activities::DEFAULT_ACTIVITY_LIMIT)]
    limit: i64,
  },
  Stats {
    user_id: String,
    #[arg(long, default_value_t = activities::DEFAULT_STATS_DAYS)]
    days: i64,
  },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

fn print_plan(plan: &TrainingPlan, summary: &PlanSummary, workouts: &[Workout], reused: bool) {
  println!("{}", summary.name);
  for goal in &summary.goals {
    println!("  - {}", goal);
  }
  if let Some(days) = days_to_race(&plan.goals, Utc::now().date_naive()) {
    println!("  - {} days to race day", days);
  }
  println!(
    "Weekly volume {} km, avg pace {}/km, {} runs in 4 weeks, consistency {:.0}%{}",
    summary.weekly_volume_km,
    summary.average_pace,
    summary.total_runs,
    summary.consistency,
    if reused { " (cached)" } else { "" }
  );
  println!();
  println!("Zones:");
  for (name, range) in plan.training_zones.named() {
    println!(
      "  {:<9} {}-{}/km",
      name,
      format_pace(range.min_pace),
      format_pace(range.max_pace)
    );
  }
  println!();
  for workout in workouts {
    println!("{}", workout_line(workout));
  }
  if !summary.adaptations.is_empty() {
    println!();
    println!("Adaptations:");
    for line in &summary.adaptations {
      println!("  - {}", line);
    }
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  dotenvy::dotenv().ok();
  LoggingConfig::from_env().init()?;

  let cli = Cli::parse();
  let state = run_coach_lib::bootstrap(cli.database_url).await?;

  match cli.command {
    Command::Account { action } => match action {
      AccountCommand::Connect {
        user_id,
        access_token,
        refresh_token,
        expires_at,
      } => {
        let status = account::connect_account(&state, &user_id, &access_token, refresh_token, expires_at).await?;
        if cli.json {
          print_json(&status)?;
        } else {
          println!("Connected {}", status.user_id);
        }
      }
      AccountCommand::Disconnect { user_id } => {
        let removed = account::disconnect_account(&state, &user_id).await?;
        if cli.json {
          print_json(&serde_json::json!({ "disconnected": removed }))?;
        } else if removed {
          println!("Disconnected {}", user_id);
        } else {
          println!("{} was not connected", user_id);
        }
      }
      AccountCommand::Status { user_id } => {
        let status = account::get_account_status(&state, &user_id).await?;
        if cli.json {
          print_json(&status)?;
        } else {
          println!(
            "{}: {}{}",
            status.user_id,
            if status.is_connected { "connected" } else { "not connected" },
            if status.token_expired { " (token expired)" } else { "" }
          );
          if let Some(last) = status.last_sync_at {
            println!("Last sync: {}", last);
          }
        }
      }
    },

    Command::Plan { action } => match action {
      PlanCommand::Show { user_id } => {
        let response = plan::get_training_plan(&state, &user_id).await?;
        if cli.json {
          print_json(&response)?;
        } else {
          print_plan(
            &response.view.plan,
            &response.summary,
            &response.view.upcoming_workouts,
            response.view.reused,
          );
        }
      }
      PlanCommand::Generate {
        user_id,
        race_type,
        target_time,
        race_date,
        weekly_km,
        focus,
      } => {
        let request = GoalRequest {
          race_type,
          target_time,
          race_date,
          weekly_km,
          focus_area: focus.map(|f| f.parse::<FocusArea>()).transpose()?,
        };
        let response = plan::generate_training_plan(&state, &user_id, &request).await?;
        if cli.json {
          print_json(&response)?;
        } else {
          print_plan(&response.view.plan, &response.summary, &response.view.upcoming_workouts, false);
        }
      }
      PlanCommand::Week { user_id } => {
        let week = plan::get_current_week(&state, &user_id).await?;
        if cli.json {
          print_json(&week)?;
        } else {
          for workout in &week {
            println!("{}", workout_line(workout));
          }
        }
      }
    },

    Command::Sync { user_id } => {
      let report = sync::sync_activities(&state, &user_id).await?;
      if cli.json {
        print_json(&report)?;
      } else {
        println!(
          "Fetched {} activities ({} new){}",
          report.total_fetched,
          report.new_activities,
          if report.plan_updated { ", plan updated" } else { "" }
        );
        for adaptation in &report.adaptations {
          println!("  - {}", adaptation);
        }
      }
    }

    Command::Activities { action } => match action {
      ActivitiesCommand::List { user_id, limit } => {
        let cached = activities::get_cached_activities(&state, &user_id, limit).await?;
        if cli.json {
          print_json(&cached)?;
        } else {
          for a in &cached {
            let pace = a.pace_min_per_km().map(format_pace).unwrap_or_else(|| "-".into());
            println!(
              "{}  {:<10} {:>6.2} km  {}/km  {}",
              a.start_timestamp.format("%Y-%m-%d"),
              a.activity_type,
              a.distance_km(),
              pace,
              a.name
            );
          }
        }
      }
      ActivitiesCommand::Stats { user_id, days } => {
        let stats = activities::get_activity_stats(&state, &user_id, days).await?;
        if cli.json {
          print_json(&stats)?;
        } else {
          println!(
            "{} runs, {:.1} km, {} min moving, {:.0} m climbed over {} days",
            stats.total_runs,
            stats.total_distance_km,
            stats.total_moving_time_seconds / 60,
            stats.total_elevation_gain_m,
            days
          );
          if let Some(pace) = stats.average_pace_seconds_per_km {
            println!("Average pace {}/km", format_pace(pace / 60.0));
          }
        }
      }
    },
  }

  state.db.close().await;
  Ok(())
}
