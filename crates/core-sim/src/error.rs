use strategy::StrategyError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateKind {
    HighYield,
    Secondary,
    Borrow,
}

impl RateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighYield => "high_yield_annual_rate",
            Self::Secondary => "secondary_annual_rate",
            Self::Borrow => "borrow_annual_rate",
        }
    }
}

/// Reasons a configuration is refused before any month is simulated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigIssue {
    #[error("initial_capital must be finite and greater than zero")]
    NonPositiveCapital,
    #[error("borrowed_amount must be finite and non-negative")]
    InvalidBorrowedAmount,
    #[error("{} must be a finite, non-negative percentage", .0.as_str())]
    InvalidRate(RateKind),
    #[error("horizon_months must be greater than zero")]
    ZeroHorizon,
    #[error("a horizon of {0} years does not fit in horizon_months")]
    HorizonTooLong(u32),
    #[error("balances would exceed the representable range within {0} months")]
    BalanceOverflow(u32),
    #[error(transparent)]
    Strategy(#[from] StrategyError),
}

/// Undefined arithmetic in the post-run summary.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DomainError {
    #[error("division by zero: initial capital is {capital}")]
    DivisionByZero { capital: f64 },
    #[error("cannot annualize a negative growth ratio ({ratio})")]
    NegativeGrowthBase { ratio: f64 },
    #[error("summary metric is not a finite number")]
    NonFiniteResult,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigIssue),
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
}

impl From<StrategyError> for SimError {
    fn from(err: StrategyError) -> Self {
        Self::InvalidConfiguration(ConfigIssue::Strategy(err))
    }
}
