use std::io::{self, Write};

use core_sim::PeriodSnapshot;

use crate::logging::{RunLogEvent, RunLogEventKind, RunLogWriter};

pub const PROJECTION_CSV_HEADER: &str = "month,high_yield_principal,high_yield_interest,\
secondary_principal,secondary_interest,secondary_growth,borrowed_balance,borrowing_cost,\
cumulative_loan_interest,total_assets,net_value\n";

/// Writes snapshots as CSV. Floats use Rust's shortest round-trip formatting,
/// so parsing a row back yields the exact same values.
pub struct ProjectionCsvWriter<W: Write> {
    writer: W,
}

impl<W: Write> ProjectionCsvWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_header(&mut self) -> io::Result<()> {
        self.writer.write_all(PROJECTION_CSV_HEADER.as_bytes())
    }

    pub fn append_snapshots(&mut self, snapshots: &[PeriodSnapshot]) -> io::Result<()> {
        for row in snapshots {
            writeln!(
                self.writer,
                "{},{},{},{},{},{},{},{},{},{},{}",
                row.month,
                row.high_yield_principal,
                row.high_yield_interest,
                row.secondary_principal,
                row.secondary_interest,
                row.secondary_growth,
                row.borrowed_balance,
                row.borrowing_cost,
                row.cumulative_loan_interest,
                row.total_assets,
                row.net_value,
            )?;
        }
        Ok(())
    }

    /// Writes a full export and flushes it before recording the run event.
    pub fn write_projection_and_log(
        &mut self,
        run_id: u64,
        snapshots: &[PeriodSnapshot],
        run_log_writer: &mut dyn RunLogWriter,
    ) -> io::Result<()> {
        self.write_header()?;
        self.append_snapshots(snapshots)?;
        self.writer.flush()?;
        run_log_writer.write(RunLogEvent::new(
            run_id,
            RunLogEventKind::ExportWritten,
            u32::try_from(snapshots.len()).ok(),
        ));
        Ok(())
    }
}
