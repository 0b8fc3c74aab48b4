pub mod account;
pub mod activity;
pub mod plan;

pub use account::AthleteAccount;
pub use activity::ActivityRecord;
pub use plan::{
  IntervalSpec, Intensity, PaceRange, PlanView, TrainingPlan, Workout, WorkoutType,
};
