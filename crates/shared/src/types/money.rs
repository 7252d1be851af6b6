//! Amount and currency primitives.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every planned amount carries exactly two fractional digits and is stored
//! as a `rust_decimal::Decimal`.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of fractional digits carried by every amount.
pub const AMOUNT_SCALE: u32 = 2;

/// Maximum number of significant digits (integer + fractional) of an amount.
pub const MAX_AMOUNT_DIGITS: u32 = 15;

/// Errors produced while normalizing an amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The amount has more than two fractional digits.
    #[error("Amount {0} has more than two fractional digits")]
    TooPrecise(Decimal),

    /// The amount does not fit into fifteen significant digits.
    #[error("Amount {0} exceeds fifteen significant digits")]
    TooLarge(Decimal),
}

/// Validates an amount and rescales it to exactly two fractional digits.
///
/// Trailing zeros beyond the second digit are accepted (`1.500` becomes `1.50`),
/// anything that would need rounding is rejected.
pub fn normalize_amount(value: Decimal) -> Result<Decimal, AmountError> {
    if value.normalize().scale() > AMOUNT_SCALE {
        return Err(AmountError::TooPrecise(value));
    }

    let mut scaled = value;
    scaled.rescale(AMOUNT_SCALE);

    if scaled.mantissa().unsigned_abs() >= 10u128.pow(MAX_AMOUNT_DIGITS) {
        return Err(AmountError::TooLarge(value));
    }

    Ok(scaled)
}

/// Rounds a computed value to two fractional digits using Banker's Rounding.
#[must_use]
pub fn round_amount(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(AMOUNT_SCALE);
    rounded
}

/// Currencies in which branches may denominate their planned amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyType {
    /// Russian ruble.
    Rub,
    /// US dollar.
    Dollar,
    /// Euro.
    Euro,
    /// Kyrgyz som.
    #[default]
    Som,
    /// Chinese yuan.
    Yuan,
    /// Kazakh tenge.
    Tenge,
    /// Turkish lira.
    Lira,
    /// Korean won.
    Won,
}

impl CurrencyType {
    /// All supported currencies.
    pub const ALL: [Self; 8] = [
        Self::Rub,
        Self::Dollar,
        Self::Euro,
        Self::Som,
        Self::Yuan,
        Self::Tenge,
        Self::Lira,
        Self::Won,
    ];

    /// Returns the string representation of the currency.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rub => "rub",
            Self::Dollar => "dollar",
            Self::Euro => "euro",
            Self::Som => "som",
            Self::Yuan => "yuan",
            Self::Tenge => "tenge",
            Self::Lira => "lira",
            Self::Won => "won",
        }
    }
}

impl std::fmt::Display for CurrencyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CurrencyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| format!("Unknown currency: {s}"))
    }
}

#[cfg(test)]
#[path = "money_tests.rs"]
mod tests;
