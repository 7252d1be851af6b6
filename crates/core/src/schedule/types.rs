//! Schedule plan data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which window an operation is gated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    /// Entries may be created and amended.
    Edit,
    /// Entries may be accepted or have acceptance revoked.
    Acceptance,
}

impl WindowKind {
    /// Returns the string representation of the window.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Acceptance => "acceptance",
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edit and acceptance windows of a plan. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanWindows {
    /// First instant entries may be edited.
    pub edit_start: DateTime<Utc>,
    /// Last instant entries may be edited.
    pub edit_end: DateTime<Utc>,
    /// First instant entries may be accepted.
    pub accept_start: DateTime<Utc>,
    /// Last instant entries may be accepted.
    pub accept_end: DateTime<Utc>,
}

impl PlanWindows {
    /// Returns true if `now` lies in the edit window.
    #[must_use]
    pub fn in_edit(&self, now: DateTime<Utc>) -> bool {
        self.edit_start <= now && now <= self.edit_end
    }

    /// Returns true if `now` lies in the acceptance window.
    #[must_use]
    pub fn in_acceptance(&self, now: DateTime<Utc>) -> bool {
        self.accept_start <= now && now <= self.accept_end
    }
}

/// Budgeting schedule for one calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePlan {
    /// Budgeting year; at most one plan per year.
    pub year: i32,
    /// Edit and acceptance windows.
    pub windows: PlanWindows,
    /// Administrator switch that can close editing inside the edit window.
    pub edit_enabled: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl SchedulePlan {
    /// `edit_enabled AND edit_start <= now <= edit_end`.
    #[must_use]
    pub fn is_editable(&self, now: DateTime<Utc>) -> bool {
        self.edit_enabled && self.windows.in_edit(now)
    }

    /// `accept_start <= now <= accept_end`.
    #[must_use]
    pub fn is_acceptable(&self, now: DateTime<Utc>) -> bool {
        self.windows.in_acceptance(now)
    }
}

/// Input for creating a plan.
#[derive(Debug, Clone)]
pub struct CreatePlanInput {
    /// Budgeting year.
    pub year: i32,
    /// Windows.
    pub windows: PlanWindows,
    /// Initial editing switch.
    pub edit_enabled: bool,
}
