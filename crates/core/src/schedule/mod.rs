//! Per-year budgeting schedule.
//!
//! A plan is not a state machine: it holds two windows and an editing switch,
//! and every mutating operation asks a membership predicate against one
//! instant read from the injected clock.

pub mod service;
pub mod types;

#[cfg(test)]
mod window_props;

pub use service::{MIN_PLAN_YEAR, ScheduleService};
pub use types::{CreatePlanInput, PlanWindows, SchedulePlan, WindowKind};
