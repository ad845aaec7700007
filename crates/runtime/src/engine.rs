use core_sim::{simulate, DomainError, Projection, SimError, SimulationConfig, SummaryMetrics};
use thiserror::Error;

use crate::logging::{RunLogEvent, RunLogEventKind, RunLogWriter, TracingRunLogWriter};

/// A finished projection. The summary can fail on its own without
/// invalidating the month-by-month series.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub run_id: u64,
    pub projection: Projection,
    pub summary: Result<SummaryMetrics, DomainError>,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Simulation(#[from] SimError),
    #[error("projection task for run {run_id} did not complete: {source}")]
    TaskFailed {
        run_id: u64,
        #[source]
        source: tokio::task::JoinError,
    },
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectionEngine;

impl ProjectionEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn run(
        &self,
        run_id: u64,
        config: &SimulationConfig,
        run_log_writer: &mut dyn RunLogWriter,
    ) -> Result<RunOutcome, SimError> {
        run_log_writer.write(RunLogEvent::new(run_id, RunLogEventKind::RunStarted, None));

        let projection = match simulate(config) {
            Ok(projection) => projection,
            Err(err) => {
                tracing::warn!(run_id, error = %err, "projection config rejected");
                run_log_writer.write(RunLogEvent::new(
                    run_id,
                    RunLogEventKind::ConfigRejected,
                    None,
                ));
                return Err(err);
            }
        };
        run_log_writer.write(RunLogEvent::new(
            run_id,
            RunLogEventKind::PeriodsProjected,
            Some(config.horizon_months),
        ));

        let summary = SummaryMetrics::from_projection(&projection);
        let kind = match &summary {
            Ok(_) => RunLogEventKind::SummaryComputed,
            Err(err) => {
                tracing::warn!(run_id, error = %err, "summary metrics unavailable");
                RunLogEventKind::SummaryFailed
            }
        };
        run_log_writer.write(RunLogEvent::new(run_id, kind, Some(config.horizon_months)));

        Ok(RunOutcome {
            run_id,
            projection,
            summary,
        })
    }

    /// Runs independent configs side by side. Results keep the input order and
    /// run ids count up from `first_run_id`.
    pub async fn run_batch(
        &self,
        first_run_id: u64,
        configs: Vec<SimulationConfig>,
    ) -> Vec<Result<RunOutcome, RunError>> {
        let engine = *self;
        let handles: Vec<_> = configs
            .into_iter()
            .enumerate()
            .map(|(offset, config)| {
                let run_id = first_run_id.saturating_add(offset as u64);
                let handle = tokio::task::spawn_blocking(move || {
                    engine.run(run_id, &config, &mut TracingRunLogWriter)
                });
                (run_id, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (run_id, handle) in handles {
            let outcome = match handle.await {
                Ok(result) => result.map_err(RunError::from),
                Err(source) => Err(RunError::TaskFailed { run_id, source }),
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}
