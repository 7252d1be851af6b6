//! Performance indicators derived from accepted planned amounts.

pub mod calculator;
pub mod types;

pub use calculator::IndicatorCalculator;
pub use types::{IndicatorBinding, IndicatorCode};
