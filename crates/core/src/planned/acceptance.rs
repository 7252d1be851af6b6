//! Two-stage acceptance state machine.
//!
//! Division acceptance comes first, head-office acceptance second. The two
//! levels are kept as one enumerated state so every change goes through a
//! transition function below.

use std::fmt;

use chrono::{DateTime, Utc};
use planbook_shared::types::{EntryId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::PlanningError;

/// Acceptance state of a ledger entry.
///
/// ```text
/// DRAFT ──division──▶ DIVISION_ACCEPTED ──head office──▶ FULLY_ACCEPTED
///   ▲                                                        │
///   └──revoke head── HEAD_ACCEPTED ◀──────revoke division────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcceptanceState {
    /// No acceptance granted.
    #[default]
    Draft,
    /// Accepted by the division only.
    DivisionAccepted,
    /// Head-office flag only; reachable by revoking division acceptance.
    HeadAccepted,
    /// Accepted at both levels.
    FullyAccepted,
}

impl AcceptanceState {
    /// All states.
    pub const ALL: [Self; 4] = [
        Self::Draft,
        Self::DivisionAccepted,
        Self::HeadAccepted,
        Self::FullyAccepted,
    ];

    /// Builds the state from the two flags.
    #[must_use]
    pub const fn from_flags(division: bool, head_office: bool) -> Self {
        match (division, head_office) {
            (false, false) => Self::Draft,
            (true, false) => Self::DivisionAccepted,
            (false, true) => Self::HeadAccepted,
            (true, true) => Self::FullyAccepted,
        }
    }

    /// Division-level flag.
    #[must_use]
    pub const fn division_accepted(self) -> bool {
        matches!(self, Self::DivisionAccepted | Self::FullyAccepted)
    }

    /// Head-office flag.
    #[must_use]
    pub const fn head_accepted(self) -> bool {
        matches!(self, Self::HeadAccepted | Self::FullyAccepted)
    }

    /// Flag for the given level.
    #[must_use]
    pub const fn is_accepted_at(self, level: AcceptanceLevel) -> bool {
        match level {
            AcceptanceLevel::Division => self.division_accepted(),
            AcceptanceLevel::HeadOffice => self.head_accepted(),
        }
    }

    /// True once either flag is set; such entries are immutable.
    #[must_use]
    pub const fn has_any_acceptance(self) -> bool {
        !matches!(self, Self::Draft)
    }

    /// Returns the string representation of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::DivisionAccepted => "DIVISION_ACCEPTED",
            Self::HeadAccepted => "HEAD_ACCEPTED",
            Self::FullyAccepted => "FULLY_ACCEPTED",
        }
    }

    const fn with_flag(self, level: AcceptanceLevel, value: bool) -> Self {
        match level {
            AcceptanceLevel::Division => Self::from_flags(value, self.head_accepted()),
            AcceptanceLevel::HeadOffice => Self::from_flags(self.division_accepted(), value),
        }
    }
}

impl fmt::Display for AcceptanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acceptance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptanceLevel {
    /// Owning division or branch.
    Division,
    /// Head office.
    HeadOffice,
}

impl AcceptanceLevel {
    /// Returns the string representation of the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Division => "division",
            Self::HeadOffice => "head_office",
        }
    }
}

impl fmt::Display for AcceptanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one acceptance transition, with audit data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceAction {
    /// Entry the transition applies to.
    pub entry: EntryId,
    /// Level that was granted or revoked.
    pub level: AcceptanceLevel,
    /// State before the call.
    pub from: AcceptanceState,
    /// State after the call.
    pub to: AcceptanceState,
    /// User that performed it.
    pub actor: UserId,
    /// When it happened.
    pub at: DateTime<Utc>,
    /// False for an idempotent repeat.
    pub changed: bool,
}

impl AcceptanceAction {
    fn new(
        entry: EntryId,
        level: AcceptanceLevel,
        from: AcceptanceState,
        to: AcceptanceState,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            entry,
            level,
            from,
            to,
            actor,
            at,
            changed: from != to,
        }
    }
}

/// Stateless transition functions of the acceptance workflow.
///
/// Window and ownership checks belong to the caller; these functions only
/// know about the state itself.
pub struct AcceptanceService;

impl AcceptanceService {
    /// Sets the division flag. Repeating it is a no-op.
    #[must_use]
    pub fn accept_by_division(
        entry: EntryId,
        state: AcceptanceState,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> AcceptanceAction {
        let to = state.with_flag(AcceptanceLevel::Division, true);
        AcceptanceAction::new(entry, AcceptanceLevel::Division, state, to, actor, at)
    }

    /// Sets the head-office flag.
    ///
    /// # Errors
    ///
    /// `PrematureAcceptance` whenever the division flag is not set.
    pub fn accept_by_head_office(
        entry: EntryId,
        state: AcceptanceState,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> Result<AcceptanceAction, PlanningError> {
        if !state.division_accepted() {
            return Err(PlanningError::PrematureAcceptance(entry));
        }
        let to = state.with_flag(AcceptanceLevel::HeadOffice, true);
        Ok(AcceptanceAction::new(
            entry,
            AcceptanceLevel::HeadOffice,
            state,
            to,
            actor,
            at,
        ))
    }

    /// Clears the flag for `level`.
    ///
    /// # Errors
    ///
    /// `NotAccepted` if that flag is not set.
    pub fn revoke(
        entry: EntryId,
        state: AcceptanceState,
        level: AcceptanceLevel,
        actor: UserId,
        at: DateTime<Utc>,
    ) -> Result<AcceptanceAction, PlanningError> {
        if !state.is_accepted_at(level) {
            return Err(PlanningError::NotAccepted { entry, level });
        }
        let to = state.with_flag(level, false);
        Ok(AcceptanceAction::new(entry, level, state, to, actor, at))
    }
}
