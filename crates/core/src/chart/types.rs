//! Chart of accounts data types.

use chrono::{DateTime, Utc};
use planbook_shared::types::{AccountId, BranchId, CategoryId, DivisionId, UserId};
use serde::{Deserialize, Serialize};

/// A bank branch (or head-office unit) that submits planned amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch ID.
    pub id: BranchId,
    /// Unique branch number.
    pub branch_number: u32,
    /// Unique display name (may be empty).
    pub name: String,
    /// Full name of the branch head (unique when set).
    pub head_name: String,
    /// Mobile phone number (unique when set).
    pub phone: String,
    /// Landline phone number (unique when set).
    pub landline_phone: String,
    /// Postal address.
    pub address: String,
    /// Contact e-mail.
    pub email: String,
    /// Whether the branch may own structural divisions.
    pub is_structural: bool,
    /// Operating status.
    pub is_operating: bool,
    /// Head count.
    pub employee_count: u32,
    /// The single user that owns the branch.
    pub owner: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a branch.
#[derive(Debug, Clone, Default)]
pub struct RegisterBranchInput {
    /// Unique branch number.
    pub branch_number: u32,
    /// Display name.
    pub name: String,
    /// Branch head.
    pub head_name: String,
    /// Mobile phone.
    pub phone: String,
    /// Landline phone.
    pub landline_phone: String,
    /// Address.
    pub address: String,
    /// E-mail.
    pub email: String,
    /// Structural flag.
    pub is_structural: bool,
    /// Head count.
    pub employee_count: u32,
    /// Owning user.
    pub owner: UserId,
}

/// A sub-unit of a structural branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralDivision {
    /// Division ID.
    pub id: DivisionId,
    /// Unique name.
    pub name: String,
    /// Owning branch; always a structural one.
    pub branch_id: BranchId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a structural division.
#[derive(Debug, Clone)]
pub struct RegisterDivisionInput {
    /// Unique name.
    pub name: String,
    /// Owning branch.
    pub branch_id: BranchId,
}

/// A ledger account of the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Unique number, `NNNNN` or `NNNNN.NNNNN`.
    pub number: String,
    /// Account name.
    pub name: String,
    /// Category the account is classified under.
    pub category_id: CategoryId,
    /// Owning structural division.
    pub division_id: DivisionId,
    /// Activity flag.
    pub is_active: bool,
    /// Overrides the category's structure-planned flag when set.
    pub division_planned: Option<bool>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Account number.
    pub number: String,
    /// Account name.
    pub name: String,
    /// Category.
    pub category_id: CategoryId,
    /// Owning division.
    pub division_id: DivisionId,
    /// Optional override of the category's structure-planned flag.
    pub division_planned: Option<bool>,
}
