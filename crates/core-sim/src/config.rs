use serde::{Deserialize, Serialize};
use strategy::{borrowed_for_leverage, monthly_rate, LoanModel, ReinvestmentPolicy};

use crate::error::{ConfigIssue, RateKind, SimError};

/// Parameters for one projection run. Rates are nominal annual percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub initial_capital: f64,
    pub borrowed_amount: f64,
    pub high_yield_annual_rate: f64,
    pub secondary_annual_rate: f64,
    pub borrow_annual_rate: f64,
    pub horizon_months: u32,
    pub reinvestment_policy: ReinvestmentPolicy,
    #[serde(default)]
    pub loan_model: LoanModel,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            borrowed_amount: 100_000.0,
            high_yield_annual_rate: 14.0,
            secondary_annual_rate: 12.0,
            borrow_annual_rate: 10.0,
            horizon_months: 60,
            reinvestment_policy: ReinvestmentPolicy::HighYieldOnly,
            loan_model: LoanModel::Compounding,
        }
    }
}

impl SimulationConfig {
    /// Sets the borrowed amount to `initial_capital * leverage_ratio`.
    pub fn with_leverage_ratio(mut self, leverage_ratio: f64) -> Result<Self, SimError> {
        self.borrowed_amount = borrowed_for_leverage(self.initial_capital, leverage_ratio)?;
        Ok(self)
    }

    pub fn with_horizon_years(mut self, years: u32) -> Result<Self, SimError> {
        if years == 0 {
            return Err(ConfigIssue::ZeroHorizon.into());
        }
        self.horizon_months = years
            .checked_mul(12)
            .ok_or(ConfigIssue::HorizonTooLong(years))?;
        Ok(self)
    }

    pub fn with_policy(mut self, reinvestment_policy: ReinvestmentPolicy) -> Self {
        self.reinvestment_policy = reinvestment_policy;
        self
    }

    pub fn with_loan_model(mut self, loan_model: LoanModel) -> Self {
        self.loan_model = loan_model;
        self
    }

    pub fn years(&self) -> f64 {
        f64::from(self.horizon_months) / 12.0
    }

    pub fn validate(&self) -> Result<(), ConfigIssue> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(ConfigIssue::NonPositiveCapital);
        }
        if !self.borrowed_amount.is_finite() || self.borrowed_amount < 0.0 {
            return Err(ConfigIssue::InvalidBorrowedAmount);
        }
        for (kind, rate) in [
            (RateKind::HighYield, self.high_yield_annual_rate),
            (RateKind::Secondary, self.secondary_annual_rate),
            (RateKind::Borrow, self.borrow_annual_rate),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(ConfigIssue::InvalidRate(kind));
            }
        }
        if self.horizon_months == 0 {
            return Err(ConfigIssue::ZeroHorizon);
        }

        let ceiling = (f64::MAX / 4.0).ln();
        let (secondary, loan) = self.log_balance_bounds();
        if !(self.initial_capital.ln() <= ceiling && secondary <= ceiling && loan <= ceiling) {
            return Err(ConfigIssue::BalanceOverflow(self.horizon_months));
        }
        Ok(())
    }

    /// Natural logs of upper bounds on the secondary and loan balances at the
    /// horizon. No policy grows the secondary balance faster than
    /// `(o + h)(1 + 2r)` a month and no loan model outgrows `P(1 + b)^n`, so
    /// staying under a quarter of `f64::MAX` keeps every snapshot field finite.
    fn log_balance_bounds(&self) -> (f64, f64) {
        let rates = MonthlyRates::from_config(self);
        let months = f64::from(self.horizon_months);
        let high_yield_interest = self.initial_capital * rates.high_yield;

        let secondary = (self.borrowed_amount + months * high_yield_interest).ln()
            + months * (2.0 * rates.secondary).ln_1p();
        let loan = self.borrowed_amount.ln() + months * rates.borrow.ln_1p();
        (secondary, loan)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyRates {
    pub high_yield: f64,
    pub secondary: f64,
    pub borrow: f64,
}

impl MonthlyRates {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            high_yield: monthly_rate(config.high_yield_annual_rate),
            secondary: monthly_rate(config.secondary_annual_rate),
            borrow: monthly_rate(config.borrow_annual_rate),
        }
    }
}
