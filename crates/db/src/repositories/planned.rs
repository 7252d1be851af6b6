//! Planned amount repository: ledger entries and the acceptance workflow.

use std::sync::Arc;

use planbook_core::chart::ChartService;
use planbook_core::currency::CurrencyBook;
use planbook_core::planned::{
    AcceptanceAction, AcceptanceLevel, CreateEntryInput, LedgerService, MonthlyAmounts,
    PlannedAmount,
};
use planbook_core::{Clock, PlanningError};
use planbook_shared::types::{AccountId, BranchId, CurrencyType, EntryId, UserId};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::store::PlanningStore;

/// Ledger entries.
///
/// Every mutation of an entry runs as one atomic row update, so an edit and
/// an acceptance of the same entry never interleave.
#[derive(Clone)]
pub struct PlannedAmountRepository {
    store: Arc<PlanningStore>,
    clock: Arc<dyn Clock>,
    reporting: CurrencyType,
}

impl PlannedAmountRepository {
    /// Creates a new planned amount repository.
    #[must_use]
    pub fn new(store: Arc<PlanningStore>, clock: Arc<dyn Clock>, reporting: CurrencyType) -> Self {
        Self {
            store,
            clock,
            reporting,
        }
    }

    /// Creates a draft entry.
    ///
    /// # Errors
    ///
    /// `NotFound` without a plan for the year, `WindowClosed` outside the
    /// edit window, `InactiveReference` for an inactive account or a
    /// non-operating branch, `MissingRate` when the currency has no rate,
    /// `DuplicateEntry` if the account already has an entry for the year.
    pub fn create(&self, input: CreateEntryInput) -> Result<PlannedAmount, PlanningError> {
        let _guard = self.store.read_structure();
        let now = self.clock.now();

        let plan = self.store.plans.require(&input.year)?;
        let account = self.store.accounts.require(&input.account_id)?;
        let branch = self.store.branches.require(&input.branch_id)?;
        let entry = LedgerService::create(input, &plan, now)?;

        if !account.is_active {
            return Err(PlanningError::InactiveReference {
                entity: "account",
                id: account.id.to_string(),
            });
        }
        if !branch.is_operating {
            return Err(PlanningError::InactiveReference {
                entity: "branch",
                id: branch.id.to_string(),
            });
        }
        self.book().rate_for(entry.currency, entry.year)?;

        self.store
            .entry_keys
            .claim((entry.account_id, entry.year), entry.id)
            .map_err(|_| PlanningError::DuplicateEntry {
                account: entry.account_id,
                year: entry.year,
            })?;
        self.store.entries.insert_new(entry.id, entry.clone());

        info!(
            entry_id = %entry.id,
            account = %account.number,
            year = entry.year,
            branch_id = %entry.branch_id,
            currency = %entry.currency,
            total = %entry.total_amount(),
            "Planned amount created"
        );
        Ok(entry)
    }

    /// Gets an entry by id.
    pub fn get(&self, id: EntryId) -> Result<PlannedAmount, PlanningError> {
        self.store.entries.require(&id)
    }

    /// The entry for an account and year, if any.
    pub fn find(&self, account: AccountId, year: i32) -> Option<PlannedAmount> {
        let id = self.store.entry_keys.get(&(account, year))?;
        self.store.entries.get(&id)
    }

    /// Entries of a year, optionally restricted to one branch.
    pub fn list(&self, year: i32, branch: Option<BranchId>) -> Vec<PlannedAmount> {
        let mut found = self
            .store
            .entries
            .filter(|e| e.year == year && branch.is_none_or(|b| e.branch_id == b));
        found.sort_by_key(|e| e.id);
        found
    }

    /// Replaces the monthly amounts of a draft entry.
    ///
    /// # Errors
    ///
    /// `ImmutableAfterAcceptance` once either level accepted the entry,
    /// `WindowClosed` outside the edit window.
    pub fn update_amounts(
        &self,
        id: EntryId,
        amounts: MonthlyAmounts,
    ) -> Result<PlannedAmount, PlanningError> {
        let _guard = self.store.read_structure();
        let now = self.clock.now();

        let entry = self.store.entries.update(&id, |e| {
            let plan = self.store.plans.require(&e.year)?;
            LedgerService::update_amounts(e, &plan, amounts, now)?;
            Ok(e.clone())
        })?;

        info!(entry_id = %id, total = %entry.total_amount(), version = entry.version, "Planned amounts updated");
        Ok(entry)
    }

    /// Sets the "added" flag of a draft entry.
    pub fn set_added(&self, id: EntryId, is_added: bool) -> Result<PlannedAmount, PlanningError> {
        let _guard = self.store.read_structure();
        let now = self.clock.now();

        let entry = self.store.entries.update(&id, |e| {
            let plan = self.store.plans.require(&e.year)?;
            LedgerService::set_added(e, &plan, is_added, now)?;
            Ok(e.clone())
        })?;

        info!(entry_id = %id, is_added, "Planned amount flag changed");
        Ok(entry)
    }

    /// Replaces the description of a draft entry.
    pub fn update_description(
        &self,
        id: EntryId,
        description: &str,
    ) -> Result<PlannedAmount, PlanningError> {
        let _guard = self.store.read_structure();
        let now = self.clock.now();

        let entry = self.store.entries.update(&id, |e| {
            let plan = self.store.plans.require(&e.year)?;
            LedgerService::update_description(e, &plan, description, now)?;
            Ok(e.clone())
        })?;

        info!(entry_id = %id, "Planned amount description updated");
        Ok(entry)
    }

    /// Deletes a draft entry inside the edit window.
    pub fn delete(&self, id: EntryId) -> Result<(), PlanningError> {
        let _guard = self.store.read_structure();
        let now = self.clock.now();

        let removed = self.store.entries.remove_checked(&id, |e| {
            let plan = self.store.plans.require(&e.year)?;
            LedgerService::check_delete(e, &plan, now)
        })?;
        self.store
            .entry_keys
            .release(&(removed.account_id, removed.year), id);

        info!(entry_id = %id, year = removed.year, "Planned amount deleted");
        Ok(())
    }

    /// Division-level acceptance by `caller`.
    ///
    /// The acting user is the owner of the calling branch. Repeating an
    /// acceptance succeeds without changing anything.
    ///
    /// # Errors
    ///
    /// `WindowClosed` outside the acceptance window, `NotOwner` when
    /// `caller` is not entitled to accept the entry.
    pub fn accept_by_division(
        &self,
        id: EntryId,
        caller: BranchId,
    ) -> Result<AcceptanceAction, PlanningError> {
        let _guard = self.store.read_structure();
        let now = self.clock.now();

        let actor = self.store.branches.require(&caller)?.owner;
        let action = self.store.entries.update(&id, |e| {
            let plan = self.store.plans.require(&e.year)?;
            let owner = self.accepting_branch(e)?;
            LedgerService::accept_by_division(e, &plan, caller, owner, actor, now)
        })?;

        log_action(&action);
        Ok(action)
    }

    /// Head-office acceptance.
    ///
    /// # Errors
    ///
    /// `WindowClosed` outside the acceptance window, `PrematureAcceptance`
    /// before division acceptance.
    pub fn accept_by_head_office(
        &self,
        id: EntryId,
        actor: UserId,
    ) -> Result<AcceptanceAction, PlanningError> {
        let _guard = self.store.read_structure();
        let now = self.clock.now();

        let action = self.store.entries.update(&id, |e| {
            let plan = self.store.plans.require(&e.year)?;
            LedgerService::accept_by_head_office(e, &plan, actor, now)
        })?;

        log_action(&action);
        Ok(action)
    }

    /// Administrative revocation of one acceptance level.
    ///
    /// # Errors
    ///
    /// `WindowClosed` outside the acceptance window, `NotAccepted` when the
    /// level is not set.
    pub fn revoke_acceptance(
        &self,
        id: EntryId,
        level: AcceptanceLevel,
        actor: UserId,
    ) -> Result<AcceptanceAction, PlanningError> {
        let _guard = self.store.read_structure();
        let now = self.clock.now();

        let action = self.store.entries.update(&id, |e| {
            let plan = self.store.plans.require(&e.year)?;
            LedgerService::revoke_acceptance(e, &plan, level, actor, now)
        })?;

        log_action(&action);
        Ok(action)
    }

    /// Sum of the twelve months of an entry.
    pub fn total_amount(&self, id: EntryId) -> Result<Decimal, PlanningError> {
        Ok(self.get(id)?.total_amount())
    }

    /// Total of an entry converted to the reporting currency.
    pub fn reporting_total(&self, id: EntryId) -> Result<Decimal, PlanningError> {
        let entry = self.get(id)?;
        self.book()
            .convert_to_reporting(entry.total_amount(), entry.currency, entry.year)
    }

    fn accepting_branch(&self, entry: &PlannedAmount) -> Result<BranchId, PlanningError> {
        let account = self.store.accounts.require(&entry.account_id)?;
        let category = self.store.categories.require(&account.category_id)?;
        let division = self.store.divisions.require(&account.division_id)?;
        Ok(ChartService::accepting_branch(
            entry.branch_id,
            &account,
            &category,
            &division,
        ))
    }

    fn book(&self) -> CurrencyBook {
        CurrencyBook::new(self.reporting, self.store.rates.values())
    }
}

fn log_action(action: &AcceptanceAction) {
    if action.changed {
        info!(
            entry_id = %action.entry,
            level = %action.level,
            from = %action.from,
            to = %action.to,
            actor = %action.actor,
            "Acceptance changed"
        );
    } else {
        debug!(entry_id = %action.entry, level = %action.level, "Acceptance already granted");
    }
}
