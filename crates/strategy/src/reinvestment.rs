use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::StrategyError;

/// Rule deciding which interest streams land in the secondary instrument and
/// in what order relative to its own compounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReinvestmentPolicy {
    /// Deposit the high-yield interest, then credit growth earned on the
    /// opening balance.
    #[default]
    HighYieldOnly,
    /// Deposit the high-yield interest together with the secondary interest,
    /// on top of the opening-balance growth the secondary already credits.
    Combined,
    /// Deposit the high-yield interest first, then compound the post-deposit
    /// balance.
    DepositThenCompound,
}

pub const ALL_POLICIES: [ReinvestmentPolicy; 3] = [
    ReinvestmentPolicy::HighYieldOnly,
    ReinvestmentPolicy::Combined,
    ReinvestmentPolicy::DepositThenCompound,
];

/// Secondary balance movement for one month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondaryStep {
    /// Interest on the balance carried in from the previous month.
    pub opening_interest: f64,
    /// High-yield interest deposited as new principal.
    pub deposit: f64,
    /// Growth credited on top of the deposit.
    pub growth: f64,
    pub closing_balance: f64,
}

impl ReinvestmentPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighYieldOnly => "high-yield-only",
            Self::Combined => "combined",
            Self::DepositThenCompound => "deposit-then-compound",
        }
    }

    pub fn apply(
        self,
        opening_balance: f64,
        high_yield_interest: f64,
        monthly_secondary_rate: f64,
    ) -> SecondaryStep {
        let opening_interest = opening_balance * monthly_secondary_rate;

        let (growth, closing_balance) = match self {
            Self::HighYieldOnly => {
                let mut balance = opening_balance + high_yield_interest;
                balance += opening_interest;
                (opening_interest, balance)
            }
            Self::Combined => {
                let own_growth = opening_interest;
                let deposited = high_yield_interest + opening_interest;
                let balance = opening_balance + own_growth + deposited;
                (own_growth + opening_interest, balance)
            }
            Self::DepositThenCompound => {
                let after_deposit = opening_balance + high_yield_interest;
                let growth = after_deposit * monthly_secondary_rate;
                (growth, after_deposit + growth)
            }
        };

        SecondaryStep {
            opening_interest,
            deposit: high_yield_interest,
            growth,
            closing_balance,
        }
    }
}

impl fmt::Display for ReinvestmentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReinvestmentPolicy {
    type Err = StrategyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "high-yield-only" | "a" | "A" => Ok(Self::HighYieldOnly),
            "combined" | "b" | "B" => Ok(Self::Combined),
            "deposit-then-compound" | "c" | "C" => Ok(Self::DepositThenCompound),
            other => Err(StrategyError::UnknownPolicy(other.to_owned())),
        }
    }
}
