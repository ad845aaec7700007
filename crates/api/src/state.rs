use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use core_sim::{PeriodSnapshot, SimError, SimulationConfig, SummaryMetrics};
use runtime::{logging::TracingRunLogWriter, ProjectionEngine, RunOutcome};
use tokio::sync::RwLock;

/// Longest horizon the API will project in one request (1000 years).
pub const MAX_HORIZON_MONTHS: u32 = 12_000;

/// Completed runs kept for `GET /projections/:run_id`. Older runs are evicted.
pub const DEFAULT_RUN_CAPACITY: usize = 64;

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ProjectionResponse {
    pub run_id: u64,
    pub config: SimulationConfig,
    pub snapshots: Vec<PeriodSnapshot>,
    pub summary: Option<SummaryMetrics>,
    pub summary_error: Option<String>,
}

impl From<RunOutcome> for ProjectionResponse {
    fn from(outcome: RunOutcome) -> Self {
        let config = *outcome.projection.config();
        let (summary, summary_error) = match outcome.summary {
            Ok(summary) => (Some(summary), None),
            Err(err) => (None, Some(err.to_string())),
        };

        Self {
            run_id: outcome.run_id,
            config,
            snapshots: outcome.projection.into_snapshots(),
            summary,
            summary_error,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StartRunError {
    RunIdOverflow,
    HorizonTooLong(u32),
    Simulation(SimError),
}

#[derive(Clone, Debug)]
pub struct AppState {
    next_run_id: Arc<AtomicU64>,
    runs: Arc<RwLock<BTreeMap<u64, Arc<ProjectionResponse>>>>,
    run_capacity: usize,
    defaults: SimulationConfig,
    engine: ProjectionEngine,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl AppState {
    pub fn new(defaults: SimulationConfig) -> Self {
        Self::with_run_capacity(defaults, DEFAULT_RUN_CAPACITY)
    }

    /// Keeps at most `run_capacity` runs (at least one), dropping the lowest
    /// run id first.
    pub fn with_run_capacity(defaults: SimulationConfig, run_capacity: usize) -> Self {
        Self {
            next_run_id: Arc::new(AtomicU64::new(0)),
            runs: Arc::new(RwLock::new(BTreeMap::new())),
            run_capacity: run_capacity.max(1),
            defaults,
            engine: ProjectionEngine::new(),
        }
    }

    pub fn defaults(&self) -> &SimulationConfig {
        &self.defaults
    }

    fn next_run_id(&self) -> Result<u64, StartRunError> {
        let previous = self
            .next_run_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                current.checked_add(1)
            })
            .map_err(|_| StartRunError::RunIdOverflow)?;

        Ok(previous + 1)
    }

    pub async fn start_run(
        &self,
        config: SimulationConfig,
    ) -> Result<Arc<ProjectionResponse>, StartRunError> {
        if config.horizon_months > MAX_HORIZON_MONTHS {
            return Err(StartRunError::HorizonTooLong(config.horizon_months));
        }

        let run_id = self.next_run_id()?;
        let outcome = self
            .engine
            .run(run_id, &config, &mut TracingRunLogWriter)
            .map_err(StartRunError::Simulation)?;
        let response = Arc::new(ProjectionResponse::from(outcome));

        let mut runs = self.runs.write().await;
        runs.insert(run_id, Arc::clone(&response));
        while runs.len() > self.run_capacity {
            let Some((evicted, _)) = runs.pop_first() else {
                break;
            };
            tracing::debug!(run_id = evicted, "evicted stored projection");
        }
        Ok(response)
    }

    pub async fn get_run(&self, run_id: u64) -> Option<Arc<ProjectionResponse>> {
        self.runs.read().await.get(&run_id).cloned()
    }

    #[cfg(test)]
    pub(crate) fn with_next_run_id_for_test(next_run_id: u64) -> Self {
        let state = Self::default();
        state.next_run_id.store(next_run_id, Ordering::Relaxed);
        state
    }
}
