//! Performance indicator repository.

use std::collections::BTreeMap;
use std::sync::Arc;

use planbook_core::PlanningError;
use planbook_core::category::CategoryTree;
use planbook_core::currency::CurrencyBook;
use planbook_core::indicator::{IndicatorBinding, IndicatorCalculator, IndicatorCode};
use planbook_shared::types::{CategoryId, CurrencyType};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::store::PlanningStore;

/// Indicator bindings and on-demand indicator computation.
#[derive(Clone)]
pub struct IndicatorRepository {
    store: Arc<PlanningStore>,
    reporting: CurrencyType,
}

impl IndicatorRepository {
    /// Creates a new indicator repository.
    #[must_use]
    pub fn new(store: Arc<PlanningStore>, reporting: CurrencyType) -> Self {
        Self { store, reporting }
    }

    /// Binds an indicator code to a category.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown category, `DuplicateIndicator` if the code
    /// is already bound.
    pub fn bind(
        &self,
        code: IndicatorCode,
        category_id: CategoryId,
    ) -> Result<IndicatorBinding, PlanningError> {
        let _guard = self.store.write_structure();

        self.store.categories.require(&category_id)?;
        let binding = IndicatorBinding { code, category_id };
        if !self.store.indicators.insert_new(code, binding) {
            return Err(PlanningError::DuplicateIndicator(code));
        }

        info!(indicator = %code, category_id = %category_id, "Indicator bound");
        Ok(binding)
    }

    /// Moves an existing binding to another category.
    pub fn rebind(
        &self,
        code: IndicatorCode,
        category_id: CategoryId,
    ) -> Result<IndicatorBinding, PlanningError> {
        let _guard = self.store.write_structure();

        self.store.categories.require(&category_id)?;
        let binding = self.store.indicators.update(&code, |b| {
            b.category_id = category_id;
            Ok(*b)
        })?;

        info!(indicator = %code, category_id = %category_id, "Indicator rebound");
        Ok(binding)
    }

    /// Removes a binding.
    pub fn unbind(&self, code: IndicatorCode) -> Result<(), PlanningError> {
        let _guard = self.store.write_structure();

        self.store.indicators.remove_checked(&code, |_| Ok(()))?;

        info!(indicator = %code, "Indicator unbound");
        Ok(())
    }

    /// All bindings ordered by code.
    pub fn list(&self) -> Vec<IndicatorBinding> {
        let mut all = self.store.indicators.values();
        all.sort_by_key(|b| b.code);
        all
    }

    /// Computes every bound indicator for `year` through `through_month`
    /// (all twelve months when `None`).
    ///
    /// Recomputed from the current ledger on every call.
    pub fn compute(
        &self,
        year: i32,
        through_month: Option<u32>,
    ) -> Result<BTreeMap<IndicatorCode, Decimal>, PlanningError> {
        let _guard = self.store.read_structure();

        let through_month = through_month.unwrap_or(12);
        let bindings = self.store.indicators.values();
        let tree = CategoryTree::new(self.store.categories.values());
        let accounts = self.store.accounts.values();
        let entries = self.store.entries.filter(|e| e.year == year);
        let book = CurrencyBook::new(self.reporting, self.store.rates.values());

        let result = IndicatorCalculator::compute(
            &bindings,
            &tree,
            &accounts,
            &entries,
            &book,
            year,
            through_month,
        )?;

        debug!(year, through_month, indicators = result.len(), "Indicators computed");
        Ok(result)
    }
}
