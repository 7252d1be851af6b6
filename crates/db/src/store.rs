//! Concurrent in-memory tables.
//!
//! Each table is a `DashMap`; a row update runs while holding the row's shard
//! lock, so updates to one entry are serialized without a global lock.
//! Cross-table invariants (references, protected deletes) are guarded by the
//! store's structure lock: administrative writes take it exclusively, ledger
//! operations take it shared.

use std::fmt;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use planbook_core::PlanningError;
use planbook_core::category::Category;
use planbook_core::chart::{Account, Branch, StructuralDivision};
use planbook_core::currency::CurrencyRate;
use planbook_core::fact::PreviousYearFact;
use planbook_core::indicator::{IndicatorBinding, IndicatorCode};
use planbook_core::planned::PlannedAmount;
use planbook_core::schedule::SchedulePlan;
use planbook_shared::types::{
    AccountId, BranchId, CategoryId, CurrencyType, DivisionId, EntryId,
};

/// A keyed table of rows.
pub struct Table<K, V> {
    entity: &'static str,
    rows: DashMap<K, V>,
}

impl<K: Eq + Hash, V> fmt::Debug for Table<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("entity", &self.entity)
            .field("rows", &self.rows.len())
            .finish()
    }
}

impl<K, V> Table<K, V>
where
    K: Eq + Hash + Clone + ToString,
    V: Clone,
{
    /// Creates an empty table; `entity` names the rows in errors.
    #[must_use]
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            rows: DashMap::new(),
        }
    }

    /// Clones the row stored under `key`.
    pub fn get(&self, key: &K) -> Option<V> {
        self.rows.get(key).map(|row| row.value().clone())
    }

    /// Clones the row or fails with `NotFound`.
    pub fn require(&self, key: &K) -> Result<V, PlanningError> {
        self.get(key)
            .ok_or_else(|| PlanningError::not_found(self.entity, key.to_string()))
    }

    /// Returns true if a row exists under `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.rows.contains_key(key)
    }

    /// Inserts a row unless the key is taken; returns false if it was.
    pub fn insert_new(&self, key: K, value: V) -> bool {
        match self.rows.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    /// Inserts or replaces a row, returning the previous one.
    pub fn upsert(&self, key: K, value: V) -> Option<V> {
        self.rows.insert(key, value)
    }

    /// Atomic read-modify-write of one row.
    ///
    /// `f` works on a copy; the copy replaces the row only if `f` succeeds.
    /// The row stays locked for the duration of `f`, which must not touch
    /// this table again.
    pub fn update<T>(
        &self,
        key: &K,
        f: impl FnOnce(&mut V) -> Result<T, PlanningError>,
    ) -> Result<T, PlanningError> {
        let mut row = self
            .rows
            .get_mut(key)
            .ok_or_else(|| PlanningError::not_found(self.entity, key.to_string()))?;
        let mut draft = row.value().clone();
        let out = f(&mut draft)?;
        *row.value_mut() = draft;
        Ok(out)
    }

    /// Protected delete: removes the row only if `check` accepts it.
    pub fn remove_checked(
        &self,
        key: &K,
        check: impl FnOnce(&V) -> Result<(), PlanningError>,
    ) -> Result<V, PlanningError> {
        match self.rows.entry(key.clone()) {
            Entry::Vacant(_) => Err(PlanningError::not_found(self.entity, key.to_string())),
            Entry::Occupied(row) => {
                check(row.get())?;
                Ok(row.remove())
            }
        }
    }

    /// Clones every row matching `pred`.
    pub fn filter(&self, pred: impl Fn(&V) -> bool) -> Vec<V> {
        self.rows
            .iter()
            .filter(|row| pred(row.value()))
            .map(|row| row.value().clone())
            .collect()
    }

    /// Returns true if any row matches `pred`.
    pub fn any(&self, pred: impl Fn(&V) -> bool) -> bool {
        self.rows.iter().any(|row| pred(row.value()))
    }

    /// Number of rows matching `pred`.
    pub fn count(&self, pred: impl Fn(&V) -> bool) -> usize {
        self.rows.iter().filter(|row| pred(row.value())).count()
    }

    /// Clones every row.
    pub fn values(&self) -> Vec<V> {
        self.filter(|_| true)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Unique secondary index mapping a key to the owning row id.
pub struct UniqueIndex<K, Id> {
    keys: DashMap<K, Id>,
}

impl<K: Eq + Hash, Id> fmt::Debug for UniqueIndex<K, Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueIndex")
            .field("keys", &self.keys.len())
            .finish()
    }
}

impl<K, Id> UniqueIndex<K, Id>
where
    K: Eq + Hash,
    Id: Copy + PartialEq,
{
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: DashMap::new(),
        }
    }

    /// Claims `key` for `id`. Fails with the current owner if it is taken
    /// by another id; reclaiming one's own key succeeds.
    pub fn claim(&self, key: K, id: Id) -> Result<(), Id> {
        match self.keys.entry(key) {
            Entry::Occupied(slot) if *slot.get() == id => Ok(()),
            Entry::Occupied(slot) => Err(*slot.get()),
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(())
            }
        }
    }

    /// Releases `key` if `id` holds it.
    pub fn release(&self, key: &K, id: Id) {
        self.keys.remove_if(key, |_, owner| *owner == id);
    }

    /// Current owner of `key`.
    pub fn get(&self, key: &K) -> Option<Id> {
        self.keys.get(key).map(|owner| *owner)
    }
}

impl<K: Eq + Hash, Id: Copy + PartialEq> Default for UniqueIndex<K, Id> {
    fn default() -> Self {
        Self::new()
    }
}

/// Every table of the planning workflow.
#[derive(Debug)]
pub struct PlanningStore {
    structure: RwLock<()>,
    /// Categories.
    pub categories: Table<CategoryId, Category>,
    /// Category names.
    pub category_names: UniqueIndex<String, CategoryId>,
    /// Branches.
    pub branches: Table<BranchId, Branch>,
    /// Structural divisions.
    pub divisions: Table<DivisionId, StructuralDivision>,
    /// Division names.
    pub division_names: UniqueIndex<String, DivisionId>,
    /// Ledger accounts.
    pub accounts: Table<AccountId, Account>,
    /// Account numbers.
    pub account_numbers: UniqueIndex<String, AccountId>,
    /// Schedule plans by year.
    pub plans: Table<i32, SchedulePlan>,
    /// Currency rates by (currency, year).
    pub rates: Table<RateKey, CurrencyRate>,
    /// Ledger entries.
    pub entries: Table<EntryId, PlannedAmount>,
    /// Ledger entries by (account, year).
    pub entry_keys: UniqueIndex<(AccountId, i32), EntryId>,
    /// Indicator bindings by code.
    pub indicators: Table<IndicatorCode, IndicatorBinding>,
    /// Previous-year facts by (account, year).
    pub facts: Table<FactKey, PreviousYearFact>,
}

/// Key of the rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RateKey(pub CurrencyType, pub i32);

impl fmt::Display for RateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, self.1)
    }
}

/// Key of the fact table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FactKey(pub AccountId, pub i32);

impl fmt::Display for FactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, self.1)
    }
}

impl PlanningStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            structure: RwLock::new(()),
            categories: Table::new("category"),
            category_names: UniqueIndex::new(),
            branches: Table::new("branch"),
            divisions: Table::new("division"),
            division_names: UniqueIndex::new(),
            accounts: Table::new("account"),
            account_numbers: UniqueIndex::new(),
            plans: Table::new("schedule plan"),
            rates: Table::new("currency rate"),
            entries: Table::new("planned amount"),
            entry_keys: UniqueIndex::new(),
            indicators: Table::new("performance indicator"),
            facts: Table::new("previous-year fact"),
        }
    }

    /// Shared access for ledger operations.
    pub fn read_structure(&self) -> RwLockReadGuard<'_, ()> {
        self.structure.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access for administrative writes.
    pub fn write_structure(&self) -> RwLockWriteGuard<'_, ()> {
        self.structure.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PlanningStore {
    fn default() -> Self {
        Self::new()
    }
}
