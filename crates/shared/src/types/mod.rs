//! Common types used across the application.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{
    AMOUNT_SCALE, AmountError, CurrencyType, MAX_AMOUNT_DIGITS, normalize_amount, round_amount,
};
