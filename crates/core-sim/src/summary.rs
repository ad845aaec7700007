use serde::{Deserialize, Serialize};

use crate::{engine::Projection, error::DomainError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub months: u32,
    pub initial_capital: f64,
    pub borrowed_amount: f64,
    pub final_total_assets: f64,
    pub final_borrowed_balance: f64,
    pub final_net_value: f64,
    pub total_high_yield_interest: f64,
    pub total_secondary_growth: f64,
    pub total_borrowing_cost: f64,
    pub total_return: f64,
    /// Compound annual growth of net value, as a fraction.
    pub annualized_return: f64,
}

impl SummaryMetrics {
    pub fn from_projection(projection: &Projection) -> Result<Self, DomainError> {
        let config = projection.config();
        let last = projection
            .final_snapshot()
            .ok_or(DomainError::NonFiniteResult)?;

        let (total_high_yield_interest, total_secondary_growth, total_borrowing_cost) = projection
            .snapshots()
            .iter()
            .fold((0.0, 0.0, 0.0), |(hy, growth, cost), snapshot| {
                (
                    hy + snapshot.high_yield_interest,
                    growth + snapshot.secondary_growth,
                    cost + snapshot.borrowing_cost,
                )
            });

        Ok(Self {
            months: last.month,
            initial_capital: config.initial_capital,
            borrowed_amount: config.borrowed_amount,
            final_total_assets: last.total_assets,
            final_borrowed_balance: last.borrowed_balance,
            final_net_value: last.net_value,
            total_high_yield_interest,
            total_secondary_growth,
            total_borrowing_cost,
            total_return: total_return(last.net_value, config.initial_capital),
            annualized_return: annualized_return(
                last.net_value,
                config.initial_capital,
                config.horizon_months,
            )?,
        })
    }

    pub fn annualized_return_pct(&self) -> f64 {
        self.annualized_return * 100.0
    }
}

pub fn total_return(final_net_value: f64, initial_capital: f64) -> f64 {
    final_net_value - initial_capital
}

/// `(final / initial)^(12 / months) - 1`. A negative growth ratio is refused
/// rather than raised to a fractional power.
pub fn annualized_return(
    final_net_value: f64,
    initial_capital: f64,
    horizon_months: u32,
) -> Result<f64, DomainError> {
    if initial_capital <= 0.0 || horizon_months == 0 {
        return Err(DomainError::DivisionByZero {
            capital: initial_capital,
        });
    }

    let ratio = final_net_value / initial_capital;
    if ratio < 0.0 {
        return Err(DomainError::NegativeGrowthBase { ratio });
    }

    let years = f64::from(horizon_months) / 12.0;
    let annualized = ratio.powf(1.0 / years) - 1.0;
    if !annualized.is_finite() {
        return Err(DomainError::NonFiniteResult);
    }

    Ok(annualized)
}
