//! Currency rate repository.

use std::sync::Arc;

use planbook_core::currency::{CurrencyBook, CurrencyRate};
use planbook_core::{Clock, PlanningError};
use planbook_shared::types::CurrencyType;
use rust_decimal::Decimal;
use tracing::info;

use crate::store::{PlanningStore, RateKey};

/// Operator-entered currency rates.
#[derive(Clone)]
pub struct CurrencyRepository {
    store: Arc<PlanningStore>,
    clock: Arc<dyn Clock>,
    reporting: CurrencyType,
}

impl CurrencyRepository {
    /// Creates a new currency repository.
    #[must_use]
    pub fn new(store: Arc<PlanningStore>, clock: Arc<dyn Clock>, reporting: CurrencyType) -> Self {
        Self {
            store,
            clock,
            reporting,
        }
    }

    /// Sets or replaces the rate of `currency` for `year`.
    ///
    /// # Errors
    ///
    /// `NotFound` without a plan for the year, `Validation` for a
    /// non-positive rate, `ReferentialIntegrity` when replacing a rate that
    /// an accepted entry was converted with.
    pub fn set_rate(
        &self,
        currency: CurrencyType,
        year: i32,
        rate: Decimal,
    ) -> Result<CurrencyRate, PlanningError> {
        let _guard = self.store.write_structure();
        let now = self.clock.now();

        self.store.plans.require(&year)?;
        let rate = CurrencyRate::new(currency, year, rate, now)?;
        let key = RateKey(currency, year);
        if let Some(previous) = self.store.rates.get(&key)
            && previous.rate != rate.rate
            && self.store.entries.any(|e| {
                e.currency == currency && e.year == year && e.state.has_any_acceptance()
            })
        {
            return Err(PlanningError::protected(
                "currency rate",
                key,
                "accepted planned amounts were converted with it",
            ));
        }
        self.store.rates.upsert(key, rate.clone());

        info!(currency = %currency, year, rate = %rate.rate, "Currency rate set");
        Ok(rate)
    }

    /// Stored rates for a year.
    pub fn list_rates(&self, year: i32) -> Vec<CurrencyRate> {
        let mut found = self.store.rates.filter(|r| r.year == year);
        found.sort_by_key(|r| r.currency.as_str());
        found
    }

    /// Protected delete of a rate.
    pub fn delete_rate(&self, currency: CurrencyType, year: i32) -> Result<(), PlanningError> {
        let _guard = self.store.write_structure();

        let key = RateKey(currency, year);
        let entries = self
            .store
            .entries
            .count(|e| e.currency == currency && e.year == year);
        self.store.rates.remove_checked(&key, |_| {
            if entries > 0 {
                return Err(PlanningError::protected(
                    "currency rate",
                    key,
                    format!("{entries} planned amount(s) are denominated in it"),
                ));
            }
            Ok(())
        })?;

        info!(currency = %currency, year, "Currency rate deleted");
        Ok(())
    }

    /// Snapshot of all rates.
    pub fn book(&self) -> CurrencyBook {
        CurrencyBook::new(self.reporting, self.store.rates.values())
    }

    /// Rate of `currency` in `year`.
    pub fn rate_for(&self, currency: CurrencyType, year: i32) -> Result<Decimal, PlanningError> {
        self.book().rate_for(currency, year)
    }

    /// Converts an amount to the reporting currency.
    pub fn convert_to_reporting(
        &self,
        amount: Decimal,
        currency: CurrencyType,
        year: i32,
    ) -> Result<Decimal, PlanningError> {
        self.book().convert_to_reporting(amount, currency, year)
    }
}
