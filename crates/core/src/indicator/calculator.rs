//! Indicator aggregation over fully accepted entries.

use std::collections::{BTreeMap, HashMap};

use planbook_shared::types::{AccountId, CategoryId};
use rust_decimal::Decimal;

use super::types::{IndicatorBinding, IndicatorCode};
use crate::category::CategoryTree;
use crate::chart::Account;
use crate::currency::CurrencyBook;
use crate::error::PlanningError;
use crate::planned::{AcceptanceState, MONTHS, PlannedAmount};

/// Read-only projection from the ledger to indicator values.
///
/// Nothing is cached; callers pass a fresh snapshot every time.
pub struct IndicatorCalculator;

impl IndicatorCalculator {
    /// Computes every bound indicator for `year`, summing months
    /// `1..=through_month`.
    ///
    /// An indicator aggregates the fully accepted entries whose account sits
    /// in the active subtree of its bound category. Each entry is converted
    /// to the reporting currency before summing.
    ///
    /// # Errors
    ///
    /// `Validation` for a month outside `1..=12`, `MissingRate` when a
    /// contributing entry has no rate, `NotFound` for a binding to an
    /// unknown category.
    pub fn compute<'a>(
        bindings: impl IntoIterator<Item = &'a IndicatorBinding>,
        tree: &CategoryTree,
        accounts: impl IntoIterator<Item = &'a Account>,
        entries: impl IntoIterator<Item = &'a PlannedAmount>,
        book: &CurrencyBook,
        year: i32,
        through_month: u32,
    ) -> Result<BTreeMap<IndicatorCode, Decimal>, PlanningError> {
        if !(1..=12).contains(&through_month) {
            return Err(PlanningError::Validation(format!(
                "month must be between 1 and {MONTHS}, got {through_month}"
            )));
        }

        let category_of: HashMap<AccountId, CategoryId> = accounts
            .into_iter()
            .map(|a| (a.id, a.category_id))
            .collect();

        // Per-category reporting totals, so each entry is converted once.
        let mut by_category: HashMap<CategoryId, Decimal> = HashMap::new();
        for entry in entries {
            if entry.year != year || entry.state != AcceptanceState::FullyAccepted {
                continue;
            }
            let Some(category) = category_of.get(&entry.account_id) else {
                continue;
            };
            let planned = entry.amounts.total_through(through_month)?;
            let converted = book.convert_to_reporting(planned, entry.currency, year)?;
            let total = by_category.entry(*category).or_default();
            *total = checked_sum(*total, converted)?;
        }

        let mut result = BTreeMap::new();
        for binding in bindings {
            let total = tree
                .active_subtree(binding.category_id)?
                .iter()
                .filter_map(|id| by_category.get(id))
                .try_fold(Decimal::ZERO, |acc, amount| checked_sum(acc, *amount))?;
            result.insert(binding.code, total);
        }
        Ok(result)
    }
}

fn checked_sum(left: Decimal, right: Decimal) -> Result<Decimal, PlanningError> {
    left.checked_add(right).ok_or_else(|| {
        PlanningError::Validation(format!("indicator total {left} + {right} overflows"))
    })
}
