//! Branches, structural divisions and the chart of ledger accounts.

pub mod service;
pub mod types;

pub use service::{ChartService, account_number_is_valid};
pub use types::{
    Account, Branch, CreateAccountInput, RegisterBranchInput, RegisterDivisionInput,
    StructuralDivision,
};
