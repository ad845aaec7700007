//! Monthly compounding engine for a leveraged two-bond reinvestment plan.
//!
//! Capital sits in a high-yield bond whose interest is withdrawn each month
//! and reinvested into a secondary bond funded by borrowed money. The engine
//! is a pure function of [`SimulationConfig`]: no I/O, no shared state.

mod config;
mod engine;
mod error;
mod state;
mod summary;

pub use config::{MonthlyRates, SimulationConfig};
pub use engine::{simulate, Projection, Simulation};
pub use error::{ConfigIssue, DomainError, RateKind, SimError};
pub use state::{PeriodSnapshot, SimState};
pub use strategy::{LoanModel, ReinvestmentPolicy};
pub use summary::{annualized_return, total_return, SummaryMetrics};
