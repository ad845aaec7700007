use std::iter::FusedIterator;

use serde::Serialize;

use crate::{
    config::{MonthlyRates, SimulationConfig},
    error::SimError,
    state::{PeriodSnapshot, SimState},
    summary::SummaryMetrics,
};

/// Month-by-month projection. Each call to `next` advances exactly one month,
/// so long horizons can be abandoned between months.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    rates: MonthlyRates,
    state: SimState,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;

        Ok(Self {
            rates: MonthlyRates::from_config(&config),
            state: SimState::opening(&config),
            config,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    fn step(&mut self) -> PeriodSnapshot {
        let state = &mut self.state;
        state.month += 1;

        let high_yield_interest = state.high_yield_principal * self.rates.high_yield;
        let secondary = self.config.reinvestment_policy.apply(
            state.secondary_principal,
            high_yield_interest,
            self.rates.secondary,
        );
        state.secondary_principal = secondary.closing_balance;

        let borrowing_cost = self.config.loan_model.accrue(&mut state.loan, self.rates.borrow);
        let borrowed_balance = state.loan.outstanding();

        let total_assets = state.high_yield_principal + state.secondary_principal;

        PeriodSnapshot {
            month: state.month,
            high_yield_principal: state.high_yield_principal,
            high_yield_interest,
            secondary_principal: state.secondary_principal,
            secondary_interest: secondary.opening_interest,
            secondary_growth: secondary.growth,
            borrowed_balance,
            borrowing_cost,
            cumulative_loan_interest: state.loan.accrued_interest,
            total_assets,
            net_value: total_assets - borrowed_balance,
        }
    }
}

impl Iterator for Simulation {
    type Item = PeriodSnapshot;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.month >= self.config.horizon_months {
            return None;
        }
        Some(self.step())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.config.horizon_months.saturating_sub(self.state.month) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Simulation {}

impl FusedIterator for Simulation {}

/// Completed run: the config it came from and every month, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    config: SimulationConfig,
    snapshots: Vec<PeriodSnapshot>,
}

impl Projection {
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn snapshots(&self) -> &[PeriodSnapshot] {
        &self.snapshots
    }

    pub fn into_snapshots(self) -> Vec<PeriodSnapshot> {
        self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn final_snapshot(&self) -> Option<&PeriodSnapshot> {
        self.snapshots.last()
    }

    /// Trailing window of at most `months` snapshots.
    pub fn last_months(&self, months: usize) -> &[PeriodSnapshot] {
        let start = self.snapshots.len().saturating_sub(months);
        &self.snapshots[start..]
    }

    pub fn summary(&self) -> Result<SummaryMetrics, SimError> {
        Ok(SummaryMetrics::from_projection(self)?)
    }
}

/// Runs the full horizon in one pass.
pub fn simulate(config: &SimulationConfig) -> Result<Projection, SimError> {
    let simulation = Simulation::new(*config)?;
    let snapshots = simulation.collect();

    Ok(Projection {
        config: *config,
        snapshots,
    })
}
