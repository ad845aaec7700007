use serde::{Deserialize, Serialize};
use strategy::LoanBalance;

use crate::config::SimulationConfig;

/// Balances carried from one month into the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimState {
    pub month: u32,
    pub high_yield_principal: f64,
    pub secondary_principal: f64,
    pub loan: LoanBalance,
}

impl SimState {
    /// State before month one: the capital sits in the high-yield instrument
    /// and the borrowed amount funds the secondary one.
    pub fn opening(config: &SimulationConfig) -> Self {
        Self {
            month: 0,
            high_yield_principal: config.initial_capital,
            secondary_principal: config.borrowed_amount,
            loan: LoanBalance::new(config.borrowed_amount),
        }
    }
}

/// One emitted month. Never modified after it is produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodSnapshot {
    pub month: u32,
    pub high_yield_principal: f64,
    pub high_yield_interest: f64,
    pub secondary_principal: f64,
    pub secondary_interest: f64,
    pub secondary_growth: f64,
    pub borrowed_balance: f64,
    pub borrowing_cost: f64,
    pub cumulative_loan_interest: f64,
    pub total_assets: f64,
    pub net_value: f64,
}
