//! Indicator codes and bindings.

use std::fmt;
use std::str::FromStr;

use planbook_shared::types::CategoryId;
use serde::{Deserialize, Serialize};

use crate::error::PlanningError;

/// The twelve fixed performance indicators, ordered by code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorCode {
    /// 1: loan portfolio.
    LoanPortfolio,
    /// 2: fixed assets.
    FixedAssets,
    /// 3: deposits.
    Deposits,
    /// 4: term deposits.
    TermDeposits,
    /// 5: interest expense.
    InterestExpense,
    /// 6: interest expense on term deposits.
    InterestExpenseOnTermDeposits,
    /// 7: loan interest income.
    LoanInterestIncome,
    /// 8: loan-loss provisions.
    Rppu,
    /// 9: securities interest income.
    SecuritiesInterestIncome,
    /// 10: interest income.
    InterestIncome,
    /// 11: securities.
    Securities,
    /// 12: administrative expense.
    AdministrativeExpense,
}

impl IndicatorCode {
    /// All codes in order.
    pub const ALL: [Self; 12] = [
        Self::LoanPortfolio,
        Self::FixedAssets,
        Self::Deposits,
        Self::TermDeposits,
        Self::InterestExpense,
        Self::InterestExpenseOnTermDeposits,
        Self::LoanInterestIncome,
        Self::Rppu,
        Self::SecuritiesInterestIncome,
        Self::InterestIncome,
        Self::Securities,
        Self::AdministrativeExpense,
    ];

    /// Numeric code, 1 to 12.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8 + 1
    }

    /// Looks up a code by its number.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code).checked_sub(1)?).copied()
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LoanPortfolio => "Loan portfolio",
            Self::FixedAssets => "Fixed assets",
            Self::Deposits => "Deposits",
            Self::TermDeposits => "Term deposits",
            Self::InterestExpense => "Interest expense",
            Self::InterestExpenseOnTermDeposits => "Interest expense on term deposits",
            Self::LoanInterestIncome => "Loan interest income",
            Self::Rppu => "RPPU",
            Self::SecuritiesInterestIncome => "Securities interest income",
            Self::InterestIncome => "Interest income",
            Self::Securities => "Securities",
            Self::AdministrativeExpense => "Administrative expense",
        }
    }
}

impl fmt::Display for IndicatorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.label())
    }
}

impl FromStr for IndicatorCode {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Self::from_code)
            .ok_or_else(|| PlanningError::Validation(format!("unknown indicator code '{s}'")))
    }
}

/// Binds one indicator code to the category it is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorBinding {
    /// Indicator code, unique across bindings.
    pub code: IndicatorCode,
    /// Root of the aggregated category subtree.
    pub category_id: CategoryId,
}
