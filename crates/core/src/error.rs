//! Planning error types.
//!
//! Every failure of the planning workflow is a policy violation reported
//! synchronously to the caller; none of them are retried.

use chrono::{DateTime, Utc};
use planbook_shared::AppError;
use planbook_shared::types::{AccountId, AmountError, BranchId, CategoryId, CurrencyType, EntryId};
use thiserror::Error;

use crate::indicator::IndicatorCode;
use crate::planned::AcceptanceLevel;
use crate::schedule::WindowKind;

/// Errors that can occur during planning workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanningError {
    // ========== Validation Errors ==========
    /// Malformed input (account number, year, rate, amount precision).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A schedule window is malformed.
    #[error("Invalid schedule window: {0}")]
    InvalidWindow(String),

    // ========== Window Errors ==========
    /// Mutation or acceptance attempted outside the relevant window.
    #[error("The {window} window for {year} is closed at {at}")]
    WindowClosed {
        /// Window that had to be open.
        window: WindowKind,
        /// Budgeting year of the plan.
        year: i32,
        /// Instant the operation observed.
        at: DateTime<Utc>,
    },

    // ========== Uniqueness Errors ==========
    /// A ledger entry already exists for the account and year.
    #[error("A planned amount for account {account} in {year} already exists")]
    DuplicateEntry {
        /// Account of the existing entry.
        account: AccountId,
        /// Budgeting year.
        year: i32,
    },

    /// A schedule plan already exists for the year.
    #[error("A schedule plan for {0} already exists")]
    DuplicatePlan(i32),

    /// The account number is already taken.
    #[error("Account number {0} already exists")]
    DuplicateAccount(String),

    /// A unique name or number is already taken.
    #[error("{entity} '{value}' already exists")]
    DuplicateName {
        /// Kind of entity.
        entity: &'static str,
        /// The conflicting value.
        value: String,
    },

    /// The indicator code is already bound to a category.
    #[error("Performance indicator {0} is already bound")]
    DuplicateIndicator(IndicatorCode),

    // ========== Reference Errors ==========
    /// Entity not found.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of entity.
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// Delete or deactivate blocked by live references.
    #[error("Cannot modify {entity} {id}: {reason}")]
    ReferentialIntegrity {
        /// Kind of entity.
        entity: &'static str,
        /// Identifier of the protected entity.
        id: String,
        /// What still references it.
        reason: String,
    },

    /// A referenced entity is inactive.
    #[error("{entity} {id} is inactive")]
    InactiveReference {
        /// Kind of entity.
        entity: &'static str,
        /// Identifier of the inactive entity.
        id: String,
    },

    /// Setting the parent would make the category its own ancestor.
    #[error("Setting {parent} as parent of category {category} creates a cycle")]
    Cycle {
        /// Category being re-parented.
        category: CategoryId,
        /// Proposed parent.
        parent: CategoryId,
    },

    // ========== Acceptance Errors ==========
    /// Head office tried to accept before the division did.
    #[error("Entry {0} must be accepted by the division before the head office")]
    PrematureAcceptance(EntryId),

    /// Edit attempted on an entry that carries an acceptance flag.
    #[error("Entry {0} is accepted and can no longer be changed")]
    ImmutableAfterAcceptance(EntryId),

    /// Revocation of a level that was never granted.
    #[error("Entry {entry} is not accepted at {level} level")]
    NotAccepted {
        /// Entry being revoked.
        entry: EntryId,
        /// Level that was not set.
        level: AcceptanceLevel,
    },

    /// Division acceptance requested by a branch that does not own the entry.
    #[error("Branch {caller} does not own entry {entry}")]
    NotOwner {
        /// Entry being accepted.
        entry: EntryId,
        /// Branch that asked.
        caller: BranchId,
    },

    // ========== Currency & Fact Errors ==========
    /// No rate for the currency in the year.
    #[error("No {currency} rate for {year}")]
    MissingRate {
        /// Currency that was requested.
        currency: CurrencyType,
        /// Budgeting year.
        year: i32,
    },

    /// A previous-year fact was already recorded.
    #[error("A fact for account {account} in {year} is already recorded")]
    AlreadyRecorded {
        /// Account of the fact.
        account: AccountId,
        /// Budgeting year.
        year: i32,
    },
}

impl PlanningError {
    /// Shorthand for [`PlanningError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for [`PlanningError::ReferentialIntegrity`].
    pub fn protected(entity: &'static str, id: impl ToString, reason: impl Into<String>) -> Self {
        Self::ReferentialIntegrity {
            entity,
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InvalidWindow(_) => 400,

            Self::NotOwner { .. } => 403,

            Self::NotFound { .. } | Self::MissingRate { .. } => 404,

            Self::DuplicateEntry { .. }
            | Self::DuplicatePlan(_)
            | Self::DuplicateAccount(_)
            | Self::DuplicateName { .. }
            | Self::DuplicateIndicator(_)
            | Self::AlreadyRecorded { .. }
            | Self::ReferentialIntegrity { .. } => 409,

            Self::WindowClosed { .. }
            | Self::InactiveReference { .. }
            | Self::Cycle { .. }
            | Self::PrematureAcceptance(_)
            | Self::ImmutableAfterAcceptance(_)
            | Self::NotAccepted { .. } => 422,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidWindow(_) => "INVALID_WINDOW",
            Self::WindowClosed { .. } => "WINDOW_CLOSED",
            Self::DuplicateEntry { .. } => "DUPLICATE_ENTRY",
            Self::DuplicatePlan(_) => "DUPLICATE_PLAN",
            Self::DuplicateAccount(_) => "DUPLICATE_ACCOUNT",
            Self::DuplicateName { .. } => "DUPLICATE_NAME",
            Self::DuplicateIndicator(_) => "DUPLICATE_INDICATOR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ReferentialIntegrity { .. } => "REFERENTIAL_INTEGRITY",
            Self::InactiveReference { .. } => "INACTIVE_REFERENCE",
            Self::Cycle { .. } => "CYCLE",
            Self::PrematureAcceptance(_) => "PREMATURE_ACCEPTANCE",
            Self::ImmutableAfterAcceptance(_) => "IMMUTABLE_AFTER_ACCEPTANCE",
            Self::NotAccepted { .. } => "NOT_ACCEPTED",
            Self::NotOwner { .. } => "NOT_OWNER",
            Self::MissingRate { .. } => "MISSING_RATE",
            Self::AlreadyRecorded { .. } => "ALREADY_RECORDED",
        }
    }
}

impl From<AmountError> for PlanningError {
    fn from(err: AmountError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<PlanningError> for AppError {
    fn from(err: PlanningError) -> Self {
        let message = err.to_string();
        match err.status_code() {
            400 => Self::Validation(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            _ => Self::BusinessRule(message),
        }
    }
}
