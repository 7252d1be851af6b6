//! Planning workflow engine for Planbook.
//!
//! This crate contains pure business logic with ZERO storage dependencies.
//! All domain types, validation rules, window gating, and calculations live here.
//!
//! # Modules
//!
//! - `category` - Hierarchical account categories (arena tree)
//! - `chart` - Branches, structural divisions and ledger accounts
//! - `schedule` - Per-year edit and acceptance windows
//! - `currency` - Per-year currency rates and reporting conversion
//! - `planned` - Twelve-month planned amounts and the acceptance state machine
//! - `indicator` - Performance indicators over fully accepted totals
//! - `fact` - Write-once previous-year facts and plan comparison

pub mod category;
pub mod chart;
pub mod clock;
pub mod currency;
pub mod error;
pub mod fact;
pub mod indicator;
pub mod planned;
pub mod schedule;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::PlanningError;
