//! Monthly goals: a small checklist with target amounts, shown on the dashboard.

mod core;
mod endpoints;

pub use core::{
    GoalId, MonthlyGoal, create_goal, create_goal_table, get_goals_for_month, toggle_goal,
};
pub use endpoints::{create_goal_endpoint, delete_goal_endpoint, toggle_goal_endpoint};
