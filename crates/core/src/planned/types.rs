//! Ledger entry types.

use chrono::{DateTime, Utc};
use planbook_shared::types::{AccountId, BranchId, CurrencyType, EntryId, UserId, normalize_amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::acceptance::{AcceptanceLevel, AcceptanceState};
use crate::error::PlanningError;

/// Months in a budgeting year.
pub const MONTHS: usize = 12;

/// Description stored when none is given.
pub const DEFAULT_DESCRIPTION: &str = "-";

/// Twelve month amounts, January first, each with exactly two fractional digits.
///
/// The total is always recomputed from the months and never stored.
/// Deserialization runs the same validation as [`MonthlyAmounts::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[Decimal; MONTHS]", into = "[Decimal; MONTHS]")]
pub struct MonthlyAmounts([Decimal; MONTHS]);

impl TryFrom<[Decimal; MONTHS]> for MonthlyAmounts {
    type Error = PlanningError;

    fn try_from(months: [Decimal; MONTHS]) -> Result<Self, Self::Error> {
        Self::new(months)
    }
}

impl From<MonthlyAmounts> for [Decimal; MONTHS] {
    fn from(amounts: MonthlyAmounts) -> Self {
        amounts.0
    }
}

impl MonthlyAmounts {
    /// Validates and normalizes every month.
    ///
    /// # Errors
    ///
    /// `Validation` naming the first month that is too precise or too large.
    pub fn new(months: [Decimal; MONTHS]) -> Result<Self, PlanningError> {
        let mut normalized = [Decimal::ZERO; MONTHS];
        for (i, (slot, value)) in normalized.iter_mut().zip(months).enumerate() {
            *slot = normalize_amount(value).map_err(|e| {
                PlanningError::Validation(format!("month {}: {e}", i + 1))
            })?;
        }
        Ok(Self(normalized))
    }

    /// The same amount in every month.
    pub fn uniform(amount: Decimal) -> Result<Self, PlanningError> {
        Self::new([amount; MONTHS])
    }

    /// All months as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Decimal] {
        &self.0
    }

    /// Amount for `month` (1-based); `None` outside `1..=12`.
    #[must_use]
    pub fn month(&self, month: u32) -> Option<Decimal> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        self.0.get(index).copied()
    }

    /// Sum of all twelve months.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.0.iter().copied().sum()
    }

    /// Sum of the first `month` months.
    ///
    /// # Errors
    ///
    /// `Validation` unless `1 <= month <= 12`.
    pub fn total_through(&self, month: u32) -> Result<Decimal, PlanningError> {
        let count = usize::try_from(month).unwrap_or(usize::MAX);
        if !(1..=MONTHS).contains(&count) {
            return Err(PlanningError::Validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        Ok(self.0[..count].iter().copied().sum())
    }
}

/// Who accepted an entry at one level, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceStamp {
    /// User that granted the acceptance.
    pub by: UserId,
    /// When it was granted.
    pub at: DateTime<Utc>,
}

/// Ledger entry: twelve planned amounts for one account in one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedAmount {
    /// Unique identifier.
    pub id: EntryId,
    /// Planned account.
    pub account_id: AccountId,
    /// Budgeting year.
    pub year: i32,
    /// Branch that submitted the entry.
    pub branch_id: BranchId,
    /// Currency the amounts are denominated in.
    pub currency: CurrencyType,
    /// Monthly amounts.
    pub amounts: MonthlyAmounts,
    /// Free-text explanation.
    pub description: String,
    /// Whether the entry was added on top of the original plan.
    pub is_added: bool,
    /// Acceptance state.
    pub state: AcceptanceState,
    /// Division-level acceptance, if granted.
    pub division_stamp: Option<AcceptanceStamp>,
    /// Head-office acceptance, if granted.
    pub head_stamp: Option<AcceptanceStamp>,
    /// Bumped on every successful mutation.
    pub version: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl PlannedAmount {
    /// Sum of the twelve months.
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.amounts.total()
    }

    /// Stamp for the given level.
    #[must_use]
    pub const fn stamp(&self, level: AcceptanceLevel) -> Option<AcceptanceStamp> {
        match level {
            AcceptanceLevel::Division => self.division_stamp,
            AcceptanceLevel::HeadOffice => self.head_stamp,
        }
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }
}

/// Input for creating a ledger entry.
#[derive(Debug, Clone)]
pub struct CreateEntryInput {
    /// Planned account.
    pub account_id: AccountId,
    /// Budgeting year.
    pub year: i32,
    /// Submitting branch.
    pub branch_id: BranchId,
    /// Currency of the amounts.
    pub currency: CurrencyType,
    /// Monthly amounts.
    pub amounts: MonthlyAmounts,
    /// Free-text explanation; blank becomes `-`.
    pub description: String,
    /// Whether the entry is an addition to the original plan.
    pub is_added: bool,
}
