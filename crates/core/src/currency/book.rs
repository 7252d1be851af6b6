//! Currency book.
//!
//! Rates are entered by operators per (currency, year); nothing is fetched.
//! The book is a read-only snapshot and holds no ledger state, so rate
//! immutability after acceptance is enforced by the ledger side.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use planbook_shared::types::{CurrencyType, round_amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PlanningError;

/// Most fractional digits a rate may carry.
pub const MAX_RATE_SCALE: u32 = 2;

/// Largest accepted rate (exclusive): eight integer digits.
const RATE_LIMIT: i64 = 100_000_000;

/// One operator-entered rate: 1 unit of `currency` = `rate` reporting units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRate {
    /// Currency the rate applies to.
    pub currency: CurrencyType,
    /// Budgeting year.
    pub year: i32,
    /// Conversion factor to the reporting currency.
    pub rate: Decimal,
    /// Last time the rate was set.
    pub updated_at: DateTime<Utc>,
}

impl CurrencyRate {
    /// Validates and builds a rate.
    ///
    /// # Errors
    ///
    /// `Validation` if the rate is not strictly positive, has more than two
    /// fractional digits, or exceeds eight integer digits.
    pub fn new(
        currency: CurrencyType,
        year: i32,
        rate: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Self, PlanningError> {
        if rate <= Decimal::ZERO {
            return Err(PlanningError::Validation(format!(
                "{currency} rate must be positive, got {rate}"
            )));
        }
        if rate.normalize().scale() > MAX_RATE_SCALE {
            return Err(PlanningError::Validation(format!(
                "{currency} rate {rate} has more than {MAX_RATE_SCALE} fractional digits"
            )));
        }
        if rate >= Decimal::from(RATE_LIMIT) {
            return Err(PlanningError::Validation(format!(
                "{currency} rate {rate} is too large"
            )));
        }

        Ok(Self {
            currency,
            year,
            rate,
            updated_at: now,
        })
    }
}

/// Snapshot of rates used to normalize amounts to the reporting currency.
#[derive(Debug, Clone)]
pub struct CurrencyBook {
    reporting: CurrencyType,
    rates: HashMap<(CurrencyType, i32), Decimal>,
}

impl CurrencyBook {
    /// Builds a book for `reporting` from stored rates.
    pub fn new(reporting: CurrencyType, rates: impl IntoIterator<Item = CurrencyRate>) -> Self {
        Self {
            reporting,
            rates: rates
                .into_iter()
                .map(|r| ((r.currency, r.year), r.rate))
                .collect(),
        }
    }

    /// The reporting currency.
    #[must_use]
    pub const fn reporting_currency(&self) -> CurrencyType {
        self.reporting
    }

    /// Rate of `currency` in `year`.
    ///
    /// The reporting currency converts at exactly 1 unless an explicit
    /// entry says otherwise.
    ///
    /// # Errors
    ///
    /// `MissingRate` when no rate is recorded.
    pub fn rate_for(&self, currency: CurrencyType, year: i32) -> Result<Decimal, PlanningError> {
        match self.rates.get(&(currency, year)) {
            Some(rate) => Ok(*rate),
            None if currency == self.reporting => Ok(Decimal::ONE),
            None => Err(PlanningError::MissingRate { currency, year }),
        }
    }

    /// `amount * rate_for(currency, year)`, rounded to two digits with Banker's Rounding.
    ///
    /// # Errors
    ///
    /// `MissingRate` when no rate is recorded, `Validation` when the product
    /// does not fit a decimal.
    pub fn convert_to_reporting(
        &self,
        amount: Decimal,
        currency: CurrencyType,
        year: i32,
    ) -> Result<Decimal, PlanningError> {
        let rate = self.rate_for(currency, year)?;
        let converted = amount.checked_mul(rate).ok_or_else(|| {
            PlanningError::Validation(format!(
                "{amount} {currency} at rate {rate} overflows the reporting currency"
            ))
        })?;
        Ok(round_amount(converted))
    }
}
