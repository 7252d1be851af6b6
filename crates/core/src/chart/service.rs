//! Validation rules for branches, divisions and accounts.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use planbook_shared::types::{AccountId, BranchId, CategoryId, DivisionId};
use regex::Regex;

use super::types::{
    Account, Branch, CreateAccountInput, RegisterBranchInput, RegisterDivisionInput,
    StructuralDivision,
};
use crate::category::{Category, CategoryTree};
use crate::error::PlanningError;

static ACCOUNT_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{5}(\.[0-9]{5})?$").expect("account number pattern is valid"));

const MAX_BRANCH_TEXT_LEN: usize = 50;
const MAX_PHONE_LEN: usize = 20;
const MAX_DIVISION_NAME_LEN: usize = 50;
const MAX_ACCOUNT_NAME_LEN: usize = 100;

/// Returns true if `number` matches `NNNNN` or `NNNNN.NNNNN`.
#[must_use]
pub fn account_number_is_valid(number: &str) -> bool {
    ACCOUNT_NUMBER.is_match(number)
}

/// Stateless service for chart-of-accounts rules.
pub struct ChartService;

impl ChartService {
    /// Trims and validates an account number.
    pub fn validate_account_number(number: &str) -> Result<String, PlanningError> {
        let trimmed = number.trim();
        if account_number_is_valid(trimmed) {
            Ok(trimmed.to_string())
        } else {
            Err(PlanningError::Validation(format!(
                "account number '{trimmed}' must look like 10001 or 10001.00001"
            )))
        }
    }

    /// Builds a branch after validating field formats.
    ///
    /// Uniqueness against existing branches is checked separately by
    /// [`ChartService::branch_conflict`].
    pub fn build_branch(
        input: RegisterBranchInput,
        now: DateTime<Utc>,
    ) -> Result<Branch, PlanningError> {
        if input.branch_number == 0 {
            return Err(PlanningError::Validation(
                "branch number must be positive".into(),
            ));
        }
        for (field, value, max) in [
            ("name", &input.name, MAX_BRANCH_TEXT_LEN),
            ("head name", &input.head_name, MAX_BRANCH_TEXT_LEN),
            ("address", &input.address, MAX_BRANCH_TEXT_LEN),
            ("email", &input.email, MAX_BRANCH_TEXT_LEN),
            ("phone", &input.phone, MAX_PHONE_LEN),
            ("landline phone", &input.landline_phone, MAX_PHONE_LEN),
        ] {
            if value.trim().chars().count() > max {
                return Err(PlanningError::Validation(format!(
                    "branch {field} is longer than {max} characters"
                )));
            }
        }
        let email = input.email.trim();
        if !email.is_empty() && !email.contains('@') {
            return Err(PlanningError::Validation(format!(
                "'{email}' is not an e-mail address"
            )));
        }

        Ok(Branch {
            id: BranchId::new(),
            branch_number: input.branch_number,
            name: input.name.trim().to_string(),
            head_name: input.head_name.trim().to_string(),
            phone: input.phone.trim().to_string(),
            landline_phone: input.landline_phone.trim().to_string(),
            address: input.address.trim().to_string(),
            email: email.to_string(),
            is_structural: input.is_structural,
            is_operating: true,
            employee_count: input.employee_count,
            owner: input.owner,
            created_at: now,
            updated_at: now,
        })
    }

    /// Finds the first uniqueness violation of `candidate` against `existing`.
    ///
    /// Branch number and owner are always unique; name, head name and both
    /// phone numbers are unique only when non-empty.
    #[must_use]
    pub fn branch_conflict<'a>(
        existing: impl IntoIterator<Item = &'a Branch>,
        candidate: &Branch,
    ) -> Option<PlanningError> {
        let duplicate = |entity: &'static str, value: &str| PlanningError::DuplicateName {
            entity,
            value: value.to_string(),
        };

        for other in existing {
            if other.id == candidate.id {
                continue;
            }
            if other.branch_number == candidate.branch_number {
                return Some(duplicate(
                    "branch number",
                    &candidate.branch_number.to_string(),
                ));
            }
            if other.owner == candidate.owner {
                return Some(duplicate("branch owner", &candidate.owner.to_string()));
            }
            for (entity, mine, theirs) in [
                ("branch name", &candidate.name, &other.name),
                ("branch head", &candidate.head_name, &other.head_name),
                ("branch phone", &candidate.phone, &other.phone),
                (
                    "branch landline phone",
                    &candidate.landline_phone,
                    &other.landline_phone,
                ),
            ] {
                if !mine.is_empty() && mine == theirs {
                    return Some(duplicate(entity, mine));
                }
            }
        }
        None
    }

    /// Builds a structural division.
    ///
    /// # Errors
    ///
    /// `Validation` if the name is blank or too long, or if the branch is
    /// not flagged structural. The write is refused, never dropped.
    pub fn build_division(
        input: RegisterDivisionInput,
        branch: &Branch,
        now: DateTime<Utc>,
    ) -> Result<StructuralDivision, PlanningError> {
        let name = input.name.trim();
        if name.is_empty() || name.chars().count() > MAX_DIVISION_NAME_LEN {
            return Err(PlanningError::Validation(format!(
                "division name must be 1 to {MAX_DIVISION_NAME_LEN} characters"
            )));
        }
        if !branch.is_structural {
            return Err(PlanningError::Validation(format!(
                "branch {} is not structural and cannot own divisions",
                branch.branch_number
            )));
        }

        Ok(StructuralDivision {
            id: DivisionId::new(),
            name: name.to_string(),
            branch_id: branch.id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Builds an account after checking its number and live references.
    ///
    /// # Errors
    ///
    /// `Validation` for a malformed number or name, `InactiveReference` if the
    /// category is inactive or the division's branch is not operating.
    pub fn build_account(
        input: CreateAccountInput,
        category: &Category,
        division_branch: &Branch,
        now: DateTime<Utc>,
    ) -> Result<Account, PlanningError> {
        let number = Self::validate_account_number(&input.number)?;
        let name = input.name.trim();
        if name.is_empty() || name.chars().count() > MAX_ACCOUNT_NAME_LEN {
            return Err(PlanningError::Validation(format!(
                "account name must be 1 to {MAX_ACCOUNT_NAME_LEN} characters"
            )));
        }
        if !category.is_active {
            return Err(PlanningError::InactiveReference {
                entity: "category",
                id: category.id.to_string(),
            });
        }
        if !division_branch.is_operating {
            return Err(PlanningError::InactiveReference {
                entity: "branch",
                id: division_branch.id.to_string(),
            });
        }

        Ok(Account {
            id: AccountId::new(),
            number,
            name: name.to_string(),
            category_id: category.id,
            division_id: input.division_id,
            is_active: true,
            division_planned: input.division_planned,
            created_at: now,
            updated_at: now,
        })
    }

    /// Effective structure-planned flag: the account override, else the category's.
    #[must_use]
    pub fn is_division_planned(account: &Account, category: &Category) -> bool {
        account.division_planned.unwrap_or(category.structure_planned)
    }

    /// Branch entitled to grant division-level acceptance for an entry.
    ///
    /// Division-planned accounts belong to the division's branch; all others
    /// to the branch that submitted the entry.
    #[must_use]
    pub fn accepting_branch(
        entry_branch: BranchId,
        account: &Account,
        category: &Category,
        division: &StructuralDivision,
    ) -> BranchId {
        if Self::is_division_planned(account, category) {
            division.branch_id
        } else {
            entry_branch
        }
    }

    /// Accounts owned by a division.
    pub fn accounts_for_division<'a>(
        accounts: impl IntoIterator<Item = &'a Account>,
        division: DivisionId,
    ) -> Vec<&'a Account> {
        let mut found: Vec<_> = accounts
            .into_iter()
            .filter(|a| a.division_id == division)
            .collect();
        found.sort_by(|a, b| a.number.cmp(&b.number));
        found
    }

    /// Accounts classified under a category, optionally including every
    /// descendant category regardless of its activity.
    pub fn accounts_for_category<'a>(
        accounts: impl IntoIterator<Item = &'a Account>,
        tree: &CategoryTree,
        category: CategoryId,
        include_descendants: bool,
    ) -> Vec<&'a Account> {
        let mut found: Vec<_> = accounts
            .into_iter()
            .filter(|a| {
                a.category_id == category
                    || (include_descendants && tree.is_descendant_of(a.category_id, category))
            })
            .collect();
        found.sort_by(|a, b| a.number.cmp(&b.number));
        found
    }
}
