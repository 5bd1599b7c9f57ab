//! Income/expense sign shared by categories and operations.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{EngineError, Money};

/// Whether money flows into (`Income`) or out of (`Expense`) an account.
///
/// Stored as its sign: `1` for income, `-1` for expense.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Expense,
    Income,
}

impl Kind {
    /// `+1` for income, `-1` for expense.
    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            Self::Income => 1,
            Self::Expense => -1,
        }
    }

    #[must_use]
    pub const fn is_income(self) -> bool {
        matches!(self, Self::Income)
    }

    #[must_use]
    pub const fn is_expense(self) -> bool {
        matches!(self, Self::Expense)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Applies the sign to a positive amount.
    #[must_use]
    pub fn signed(self, amount: Money) -> Money {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<i32> for Kind {
    type Error = EngineError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Income),
            -1 => Ok(Self::Expense),
            other => Err(EngineError::InvalidKind(format!(
                "expected 1 (income) or -1 (expense), got {other}"
            ))),
        }
    }
}

impl From<Kind> for i32 {
    fn from(value: Kind) -> Self {
        value.sign()
    }
}

impl FromStr for Kind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "1" | "+1" => Ok(Self::Income),
            "expense" | "-1" => Ok(Self::Expense),
            other => Err(EngineError::InvalidKind(format!("unknown kind: {other}"))),
        }
    }
}
