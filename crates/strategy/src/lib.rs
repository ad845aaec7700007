pub mod financing;
pub mod reinvestment;

use thiserror::Error;

pub use financing::{borrowed_for_leverage, LoanBalance, LoanModel, ALL_LOAN_MODELS};
pub use reinvestment::{ReinvestmentPolicy, SecondaryStep, ALL_POLICIES};

const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("unknown reinvestment policy `{0}`; expected high-yield-only, combined or deposit-then-compound")]
    UnknownPolicy(String),
    #[error("unknown loan model `{0}`; expected compounding or simple-interest")]
    UnknownLoanModel(String),
    #[error("leverage ratio must be finite and non-negative")]
    InvalidLeverageRatio,
}

/// Pro-rates a nominal annual percentage to a monthly fraction.
pub fn monthly_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / 100.0 / MONTHS_PER_YEAR
}
