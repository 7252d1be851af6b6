//! Planned amount ledger and its two-stage acceptance workflow.

pub mod acceptance;
pub mod service;
pub mod types;

#[cfg(test)]
mod acceptance_props;

pub use acceptance::{AcceptanceAction, AcceptanceLevel, AcceptanceService, AcceptanceState};
pub use service::LedgerService;
pub use types::{
    AcceptanceStamp, CreateEntryInput, DEFAULT_DESCRIPTION, MONTHS, MonthlyAmounts, PlannedAmount,
};
