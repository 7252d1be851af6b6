//! Schedule validation and window gating.

use chrono::{DateTime, Datelike, Utc};

use super::types::{CreatePlanInput, PlanWindows, SchedulePlan, WindowKind};
use crate::error::PlanningError;

/// Earliest budgeting year accepted.
pub const MIN_PLAN_YEAR: i32 = 1900;

/// Stateless service for schedule rules.
pub struct ScheduleService;

impl ScheduleService {
    /// Checks `MIN_PLAN_YEAR <= year <= now.year`.
    pub fn validate_year(year: i32, now: DateTime<Utc>) -> Result<(), PlanningError> {
        if year < MIN_PLAN_YEAR || year > now.year() {
            return Err(PlanningError::Validation(format!(
                "year {year} must be between {MIN_PLAN_YEAR} and {}",
                now.year()
            )));
        }
        Ok(())
    }

    /// Checks each window ends no earlier than it starts.
    ///
    /// With `enforce_order` the acceptance window must also not start before
    /// the edit window does.
    pub fn validate_windows(windows: &PlanWindows, enforce_order: bool) -> Result<(), PlanningError> {
        if windows.edit_end < windows.edit_start {
            return Err(PlanningError::InvalidWindow(format!(
                "edit window ends at {} before it starts at {}",
                windows.edit_end, windows.edit_start
            )));
        }
        if windows.accept_end < windows.accept_start {
            return Err(PlanningError::InvalidWindow(format!(
                "acceptance window ends at {} before it starts at {}",
                windows.accept_end, windows.accept_start
            )));
        }
        if enforce_order && windows.accept_start < windows.edit_start {
            return Err(PlanningError::InvalidWindow(format!(
                "acceptance window starts at {} before the edit window at {}",
                windows.accept_start, windows.edit_start
            )));
        }
        Ok(())
    }

    /// Validates and builds a new plan.
    pub fn create_plan(
        input: CreatePlanInput,
        now: DateTime<Utc>,
        enforce_order: bool,
    ) -> Result<SchedulePlan, PlanningError> {
        Self::validate_year(input.year, now)?;
        Self::validate_windows(&input.windows, enforce_order)?;

        Ok(SchedulePlan {
            year: input.year,
            windows: input.windows,
            edit_enabled: input.edit_enabled,
            created_at: now,
            updated_at: now,
        })
    }

    /// Fails with `WindowClosed` unless the plan is editable at `now`.
    pub fn require_editable(plan: &SchedulePlan, now: DateTime<Utc>) -> Result<(), PlanningError> {
        if plan.is_editable(now) {
            Ok(())
        } else {
            Err(PlanningError::WindowClosed {
                window: WindowKind::Edit,
                year: plan.year,
                at: now,
            })
        }
    }

    /// Fails with `WindowClosed` unless the plan is in its acceptance window at `now`.
    pub fn require_acceptable(plan: &SchedulePlan, now: DateTime<Utc>) -> Result<(), PlanningError> {
        if plan.is_acceptable(now) {
            Ok(())
        } else {
            Err(PlanningError::WindowClosed {
                window: WindowKind::Acceptance,
                year: plan.year,
                at: now,
            })
        }
    }
}
