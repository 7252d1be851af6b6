//! Previous-year fact repository.

use std::sync::Arc;

use planbook_core::fact::{FactService, PlanComparison, PreviousYearFact};
use planbook_core::{Clock, PlanningError};
use planbook_shared::types::AccountId;
use rust_decimal::Decimal;
use tracing::info;

use crate::store::{FactKey, PlanningStore};

/// Write-once reference amounts.
#[derive(Clone)]
pub struct FactRepository {
    store: Arc<PlanningStore>,
    clock: Arc<dyn Clock>,
}

impl FactRepository {
    /// Creates a new fact repository.
    #[must_use]
    pub fn new(store: Arc<PlanningStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Records the fact for an account and year.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown account or a year without a plan,
    /// `Validation` for a malformed amount, `AlreadyRecorded` on a second
    /// write for the same key.
    pub fn record(
        &self,
        account_id: AccountId,
        year: i32,
        amount: Decimal,
    ) -> Result<PreviousYearFact, PlanningError> {
        let _guard = self.store.read_structure();
        let now = self.clock.now();

        self.store.accounts.require(&account_id)?;
        self.store.plans.require(&year)?;
        let fact = FactService::build(account_id, year, amount, now)?;
        if !self
            .store
            .facts
            .insert_new(FactKey(account_id, year), fact.clone())
        {
            return Err(PlanningError::AlreadyRecorded {
                account: account_id,
                year,
            });
        }

        info!(account_id = %account_id, year, amount = %fact.amount, "Previous-year fact recorded");
        Ok(fact)
    }

    /// The fact for an account and year.
    pub fn get(&self, account_id: AccountId, year: i32) -> Result<PreviousYearFact, PlanningError> {
        self.store.facts.require(&FactKey(account_id, year))
    }

    /// Compares the account's planned total for `year` with its fact.
    ///
    /// Uses the entry whatever its acceptance state; an account without an
    /// entry plans zero.
    pub fn compare(&self, account_id: AccountId, year: i32) -> Result<PlanComparison, PlanningError> {
        let fact = self.get(account_id, year)?;
        let planned = self
            .store
            .entry_keys
            .get(&(account_id, year))
            .and_then(|id| self.store.entries.get(&id))
            .map_or(Decimal::ZERO, |e| e.total_amount());
        Ok(FactService::compare(planned, &fact))
    }
}
