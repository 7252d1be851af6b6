//! Per-year currency rates and conversion to the reporting currency.

pub mod book;

pub use book::{CurrencyBook, CurrencyRate, MAX_RATE_SCALE};
