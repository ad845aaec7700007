use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::StrategyError;

/// How unpaid interest on the borrowed amount builds up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanModel {
    /// Interest accrues on principal plus previously accrued interest.
    #[default]
    Compounding,
    /// Interest accrues on the original principal only.
    SimpleInterest,
}

pub const ALL_LOAN_MODELS: [LoanModel; 2] = [LoanModel::Compounding, LoanModel::SimpleInterest];

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoanBalance {
    pub principal: f64,
    pub accrued_interest: f64,
}

impl LoanBalance {
    pub fn new(principal: f64) -> Self {
        Self {
            principal,
            accrued_interest: 0.0,
        }
    }

    pub fn outstanding(&self) -> f64 {
        self.principal + self.accrued_interest
    }
}

impl LoanModel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compounding => "compounding",
            Self::SimpleInterest => "simple-interest",
        }
    }

    /// Accrues one month of interest and returns the cost charged.
    pub fn accrue(self, loan: &mut LoanBalance, monthly_borrow_rate: f64) -> f64 {
        let base = match self {
            Self::Compounding => loan.outstanding(),
            Self::SimpleInterest => loan.principal,
        };
        let cost = base * monthly_borrow_rate;
        loan.accrued_interest += cost;
        cost
    }
}

impl fmt::Display for LoanModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanModel {
    type Err = StrategyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "compounding" => Ok(Self::Compounding),
            "simple-interest" | "simple" => Ok(Self::SimpleInterest),
            other => Err(StrategyError::UnknownLoanModel(other.to_owned())),
        }
    }
}

/// Borrowed amount for a capital base scaled by `leverage_ratio`.
pub fn borrowed_for_leverage(initial_capital: f64, leverage_ratio: f64) -> Result<f64, StrategyError> {
    if !leverage_ratio.is_finite() || leverage_ratio < 0.0 {
        return Err(StrategyError::InvalidLeverageRatio);
    }

    let borrowed = initial_capital * leverage_ratio;
    if !borrowed.is_finite() {
        return Err(StrategyError::InvalidLeverageRatio);
    }

    Ok(borrowed)
}

#[cfg(test)]
mod tests {
    use super::{borrowed_for_leverage, LoanBalance, LoanModel};
    use crate::StrategyError;

    #[test]
    fn compounding_loan_charges_interest_on_accrued_interest() {
        let mut loan = LoanBalance::new(100_000.0);

        let first = LoanModel::Compounding.accrue(&mut loan, 0.01);
        let second = LoanModel::Compounding.accrue(&mut loan, 0.01);

        assert_eq!(first, 1_000.0);
        assert!((second - 1_010.0).abs() < 1e-9);
        assert!((loan.outstanding() - 102_010.0).abs() < 1e-9);
    }

    #[test]
    fn simple_interest_loan_charges_principal_only() {
        let mut loan = LoanBalance::new(100_000.0);

        for _ in 0..3 {
            let cost = LoanModel::SimpleInterest.accrue(&mut loan, 0.01);
            assert_eq!(cost, 1_000.0);
        }

        assert_eq!(loan.principal, 100_000.0);
        assert_eq!(loan.accrued_interest, 3_000.0);
        assert_eq!(loan.outstanding(), 103_000.0);
    }

    #[test]
    fn zero_principal_never_accrues() {
        let mut loan = LoanBalance::new(0.0);

        let cost = LoanModel::Compounding.accrue(&mut loan, 0.05);

        assert_eq!(cost, 0.0);
        assert_eq!(loan.outstanding(), 0.0);
    }

    #[test]
    fn leverage_ratio_scales_capital() {
        assert_eq!(borrowed_for_leverage(100_000.0, 1.0).unwrap(), 100_000.0);
        assert_eq!(borrowed_for_leverage(100_000.0, 2.5).unwrap(), 250_000.0);
        assert_eq!(borrowed_for_leverage(100_000.0, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn rejects_negative_or_non_finite_leverage_ratio() {
        assert_eq!(
            borrowed_for_leverage(100_000.0, -1.0).unwrap_err(),
            StrategyError::InvalidLeverageRatio
        );
        assert_eq!(
            borrowed_for_leverage(100_000.0, f64::NAN).unwrap_err(),
            StrategyError::InvalidLeverageRatio
        );
    }

    #[test]
    fn parses_loan_model_names() {
        assert_eq!("compounding".parse::<LoanModel>().unwrap(), LoanModel::Compounding);
        assert_eq!("simple".parse::<LoanModel>().unwrap(), LoanModel::SimpleInterest);
        assert!(matches!(
            "balloon".parse::<LoanModel>(),
            Err(StrategyError::UnknownLoanModel(_))
        ));
    }
}
