//! Write-once previous-year facts and plan-versus-fact comparison.

pub mod service;

pub use service::{FactService, PlanComparison, PreviousYearFact};
