//! Previous-year fact rules.

use chrono::{DateTime, Utc};
use planbook_shared::types::{AccountId, normalize_amount, round_amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PlanningError;

/// Reference amount for one account in one year. Set once, never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousYearFact {
    /// Account the fact belongs to.
    pub account_id: AccountId,
    /// Planning year the fact is the previous-year reference for.
    pub year: i32,
    /// Actual amount, two fractional digits.
    pub amount: Decimal,
    /// When it was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Planned total set against the recorded fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanComparison {
    /// Sum of the account's planned months.
    pub planned_total: Decimal,
    /// Recorded fact.
    pub fact: Decimal,
    /// `planned_total - fact`.
    pub change: Decimal,
    /// Change relative to the fact, in percent.
    pub change_percent: Decimal,
}

/// Stateless service for previous-year facts.
pub struct FactService;

impl FactService {
    /// Validates the amount and builds a fact.
    pub fn build(
        account_id: AccountId,
        year: i32,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<PreviousYearFact, PlanningError> {
        Ok(PreviousYearFact {
            account_id,
            year,
            amount: normalize_amount(amount)?,
            recorded_at: now,
        })
    }

    /// Compares a planned total with the fact.
    ///
    /// The percentage is rounded to two digits and is zero when the fact is zero.
    #[must_use]
    pub fn compare(planned_total: Decimal, fact: &PreviousYearFact) -> PlanComparison {
        let change = planned_total - fact.amount;
        let change_percent = if fact.amount.is_zero() {
            Decimal::ZERO
        } else {
            round_amount(change / fact.amount.abs() * Decimal::ONE_HUNDRED)
        };

        PlanComparison {
            planned_total,
            fact: fact.amount,
            change,
            change_percent,
        }
    }
}
