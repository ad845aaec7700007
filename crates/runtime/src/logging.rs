#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLogEventKind {
    RunStarted,
    ConfigRejected,
    PeriodsProjected,
    SummaryComputed,
    SummaryFailed,
    ExportWritten,
}

impl RunLogEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RunStarted => "run_started",
            Self::ConfigRejected => "config_rejected",
            Self::PeriodsProjected => "periods_projected",
            Self::SummaryComputed => "summary_computed",
            Self::SummaryFailed => "summary_failed",
            Self::ExportWritten => "export_written",
        }
    }

    fn is_failure(self) -> bool {
        matches!(self, Self::ConfigRejected | Self::SummaryFailed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLogEvent {
    pub run_id: u64,
    pub kind: RunLogEventKind,
    pub periods: Option<u32>,
}

impl RunLogEvent {
    pub fn new(run_id: u64, kind: RunLogEventKind, periods: Option<u32>) -> Self {
        Self {
            run_id,
            kind,
            periods,
        }
    }
}

pub trait RunLogWriter {
    fn write(&mut self, event: RunLogEvent);
}

#[derive(Debug, Default)]
pub struct InMemoryRunLogWriter {
    events: Vec<RunLogEvent>,
}

impl InMemoryRunLogWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[RunLogEvent] {
        &self.events
    }

    pub fn kinds(&self) -> Vec<RunLogEventKind> {
        self.events.iter().map(|event| event.kind).collect()
    }
}

impl RunLogWriter for InMemoryRunLogWriter {
    fn write(&mut self, event: RunLogEvent) {
        self.events.push(event);
    }
}

/// Forwards run events to the installed `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRunLogWriter;

impl RunLogWriter for TracingRunLogWriter {
    fn write(&mut self, event: RunLogEvent) {
        if event.kind.is_failure() {
            tracing::warn!(
                run_id = event.run_id,
                kind = event.kind.as_str(),
                periods = ?event.periods,
                "projection run event"
            );
        } else {
            tracing::info!(
                run_id = event.run_id,
                kind = event.kind.as_str(),
                periods = ?event.periods,
                "projection run event"
            );
        }
    }
}
