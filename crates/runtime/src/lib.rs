pub mod benchmark;
pub mod engine;
pub mod logging;
pub mod report;

pub use engine::{ProjectionEngine, RunError, RunOutcome};

/// Simulated months per second a single core is expected to sustain.
pub const TARGET_PERIODS_PER_SEC: u64 = 1_000_000;
