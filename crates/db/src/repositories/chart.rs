//! Chart of accounts repository: branches, structural divisions, accounts.

use std::sync::Arc;

use planbook_core::category::CategoryTree;
use planbook_core::chart::{
    Account, Branch, ChartService, CreateAccountInput, RegisterBranchInput,
    RegisterDivisionInput, StructuralDivision,
};
use planbook_core::{Clock, PlanningError};
use planbook_shared::types::{AccountId, BranchId, CategoryId, DivisionId};
use tracing::info;

use crate::store::PlanningStore;

/// Branches, divisions and accounts.
#[derive(Clone)]
pub struct ChartRepository {
    store: Arc<PlanningStore>,
    clock: Arc<dyn Clock>,
}

impl ChartRepository {
    /// Creates a new chart repository.
    #[must_use]
    pub fn new(store: Arc<PlanningStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    // ========== Branches ==========

    /// Registers a branch.
    ///
    /// # Errors
    ///
    /// `Validation` for malformed fields, `DuplicateName` when the number,
    /// owner or a non-empty contact field is already used.
    pub fn register_branch(&self, input: RegisterBranchInput) -> Result<Branch, PlanningError> {
        let _guard = self.store.write_structure();
        let now = self.clock.now();

        let branch = ChartService::build_branch(input, now)?;
        if let Some(conflict) = ChartService::branch_conflict(&self.store.branches.values(), &branch)
        {
            return Err(conflict);
        }
        self.store.branches.insert_new(branch.id, branch.clone());

        info!(
            branch_id = %branch.id,
            branch_number = branch.branch_number,
            structural = branch.is_structural,
            "Branch registered"
        );
        Ok(branch)
    }

    /// Gets a branch by id.
    pub fn get_branch(&self, id: BranchId) -> Result<Branch, PlanningError> {
        self.store.branches.require(&id)
    }

    /// All branches ordered by number.
    pub fn list_branches(&self) -> Vec<Branch> {
        let mut all = self.store.branches.values();
        all.sort_by_key(|b| b.branch_number);
        all
    }

    /// Sets the operating status of a branch.
    pub fn set_branch_operating(
        &self,
        id: BranchId,
        operating: bool,
    ) -> Result<Branch, PlanningError> {
        let _guard = self.store.write_structure();
        let now = self.clock.now();

        let branch = self.store.branches.update(&id, |b| {
            b.is_operating = operating;
            b.updated_at = now;
            Ok(b.clone())
        })?;

        info!(branch_id = %id, operating, "Branch status changed");
        Ok(branch)
    }

    /// Protected delete of a branch.
    ///
    /// # Errors
    ///
    /// `ReferentialIntegrity` while divisions or ledger entries reference it.
    pub fn delete_branch(&self, id: BranchId) -> Result<(), PlanningError> {
        let _guard = self.store.write_structure();

        let divisions = self.store.divisions.count(|d| d.branch_id == id);
        let entries = self.store.entries.count(|e| e.branch_id == id);
        self.store.branches.remove_checked(&id, |_| {
            if divisions > 0 {
                return Err(PlanningError::protected(
                    "branch",
                    id,
                    format!("{divisions} division(s) belong to it"),
                ));
            }
            if entries > 0 {
                return Err(PlanningError::protected(
                    "branch",
                    id,
                    format!("{entries} planned amount(s) reference it"),
                ));
            }
            Ok(())
        })?;

        info!(branch_id = %id, "Branch deleted");
        Ok(())
    }

    // ========== Structural divisions ==========

    /// Registers a structural division.
    ///
    /// # Errors
    ///
    /// `Validation` if the branch is not structural, `DuplicateName` for a
    /// taken name.
    pub fn register_division(
        &self,
        input: RegisterDivisionInput,
    ) -> Result<StructuralDivision, PlanningError> {
        let _guard = self.store.write_structure();
        let now = self.clock.now();

        let branch = self.store.branches.require(&input.branch_id)?;
        let division = ChartService::build_division(input, &branch, now)?;
        self.store
            .division_names
            .claim(division.name.clone(), division.id)
            .map_err(|_| PlanningError::DuplicateName {
                entity: "division name",
                value: division.name.clone(),
            })?;
        self.store.divisions.insert_new(division.id, division.clone());

        info!(
            division_id = %division.id,
            branch_id = %division.branch_id,
            name = %division.name,
            "Structural division registered"
        );
        Ok(division)
    }

    /// Gets a division by id.
    pub fn get_division(&self, id: DivisionId) -> Result<StructuralDivision, PlanningError> {
        self.store.divisions.require(&id)
    }

    /// Divisions of a branch, ordered by name.
    pub fn divisions_of(&self, branch: BranchId) -> Vec<StructuralDivision> {
        let mut found = self.store.divisions.filter(|d| d.branch_id == branch);
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }

    /// Protected delete of a division.
    pub fn delete_division(&self, id: DivisionId) -> Result<(), PlanningError> {
        let _guard = self.store.write_structure();

        let accounts = self.store.accounts.count(|a| a.division_id == id);
        let removed = self.store.divisions.remove_checked(&id, |_| {
            if accounts > 0 {
                return Err(PlanningError::protected(
                    "division",
                    id,
                    format!("{accounts} account(s) belong to it"),
                ));
            }
            Ok(())
        })?;
        self.store.division_names.release(&removed.name, id);

        info!(division_id = %id, "Structural division deleted");
        Ok(())
    }

    // ========== Accounts ==========

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// `Validation` for a malformed number, `NotFound` for unknown
    /// references, `InactiveReference` for an inactive category or a
    /// non-operating branch, `DuplicateAccount` for a taken number.
    pub fn create_account(&self, input: CreateAccountInput) -> Result<Account, PlanningError> {
        let _guard = self.store.write_structure();
        let now = self.clock.now();

        let category = self.store.categories.require(&input.category_id)?;
        let division = self.store.divisions.require(&input.division_id)?;
        let branch = self.store.branches.require(&division.branch_id)?;
        let account = ChartService::build_account(input, &category, &branch, now)?;

        self.store
            .account_numbers
            .claim(account.number.clone(), account.id)
            .map_err(|_| PlanningError::DuplicateAccount(account.number.clone()))?;
        self.store.accounts.insert_new(account.id, account.clone());

        info!(
            account_id = %account.id,
            number = %account.number,
            category_id = %account.category_id,
            division_id = %account.division_id,
            "Account created"
        );
        Ok(account)
    }

    /// Gets an account by id.
    pub fn get_account(&self, id: AccountId) -> Result<Account, PlanningError> {
        self.store.accounts.require(&id)
    }

    /// Looks up an account by its number.
    pub fn find_by_number(&self, number: &str) -> Option<Account> {
        let id = self.store.account_numbers.get(&number.trim().to_string())?;
        self.store.accounts.get(&id)
    }

    /// Activates or deactivates an account.
    pub fn set_account_active(&self, id: AccountId, active: bool) -> Result<Account, PlanningError> {
        let _guard = self.store.write_structure();
        let now = self.clock.now();

        let account = self.store.accounts.update(&id, |a| {
            a.is_active = active;
            a.updated_at = now;
            Ok(a.clone())
        })?;

        info!(account_id = %id, active, "Account activity changed");
        Ok(account)
    }

    /// Protected delete of an account.
    ///
    /// # Errors
    ///
    /// `ReferentialIntegrity` while ledger entries or previous-year facts
    /// reference it.
    pub fn delete_account(&self, id: AccountId) -> Result<(), PlanningError> {
        let _guard = self.store.write_structure();

        let entries = self.store.entries.count(|e| e.account_id == id);
        let facts = self.store.facts.count(|f| f.account_id == id);
        let removed = self.store.accounts.remove_checked(&id, |_| {
            if entries > 0 {
                return Err(PlanningError::protected(
                    "account",
                    id,
                    format!("{entries} planned amount(s) reference it"),
                ));
            }
            if facts > 0 {
                return Err(PlanningError::protected(
                    "account",
                    id,
                    "previous-year facts reference it",
                ));
            }
            Ok(())
        })?;
        self.store.account_numbers.release(&removed.number, id);

        info!(account_id = %id, number = %removed.number, "Account deleted");
        Ok(())
    }

    /// Accounts owned by a division, ordered by number.
    pub fn accounts_for_division(&self, division: DivisionId) -> Vec<Account> {
        let accounts = self.store.accounts.values();
        ChartService::accounts_for_division(&accounts, division)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Accounts under a category, optionally with its descendants.
    pub fn accounts_for_category(
        &self,
        category: CategoryId,
        include_descendants: bool,
    ) -> Result<Vec<Account>, PlanningError> {
        let tree = CategoryTree::new(self.store.categories.values());
        tree.require(category)?;
        let accounts = self.store.accounts.values();
        Ok(
            ChartService::accounts_for_category(&accounts, &tree, category, include_descendants)
                .into_iter()
                .cloned()
                .collect(),
        )
    }
}
