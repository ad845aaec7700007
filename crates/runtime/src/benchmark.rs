use std::time::{Duration, Instant};

use core_sim::{SimError, Simulation, SimulationConfig};

/// Months projected over one timed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThroughputSample {
    pub months: u64,
    pub elapsed: Duration,
}

impl ThroughputSample {
    pub fn new(months: u64, elapsed: Duration) -> Self {
        Self { months, elapsed }
    }

    /// Times a full run of `config`, stepping the iterator directly so no
    /// snapshot vector is allocated.
    pub fn measure(config: SimulationConfig) -> Result<Self, SimError> {
        let simulation = Simulation::new(config)?;
        let started = Instant::now();
        let months = simulation.map(std::hint::black_box).count() as u64;
        Ok(Self::new(months, started.elapsed()))
    }

    /// Zero when no time elapsed; saturates at `u64::MAX`.
    pub fn periods_per_sec(&self) -> u64 {
        let nanos = self.elapsed.as_nanos();
        if nanos == 0 {
            return 0;
        }
        let per_sec = u128::from(self.months).saturating_mul(1_000_000_000) / nanos;
        u64::try_from(per_sec).unwrap_or(u64::MAX)
    }

    pub fn meets_target(&self, target_periods_per_sec: u64) -> bool {
        self.periods_per_sec() >= target_periods_per_sec
    }
}
