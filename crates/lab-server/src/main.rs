mod config;
mod wiring;

use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use core_sim::SimulationConfig;
use runtime::{
    logging::{RunLogWriter, TracingRunLogWriter},
    report::ProjectionCsvWriter,
    ProjectionEngine,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Run id reserved for the projection exported at startup.
const STARTUP_RUN_ID: u64 = 0;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = config::Config::from_env()?;
    write_default_projection(
        &config.projection_output_path,
        &config.simulation,
        &mut TracingRunLogWriter,
    )?;

    let listener = TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "lab server listening");

    axum::serve(listener, wiring::build_app(config.simulation)).await?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn write_default_projection(
    path: &str,
    simulation: &SimulationConfig,
    run_log_writer: &mut dyn RunLogWriter,
) -> Result<(), Box<dyn Error>> {
    let outcome = ProjectionEngine::new().run(STARTUP_RUN_ID, simulation, run_log_writer)?;
    match &outcome.summary {
        Ok(summary) => tracing::info!(
            months = summary.months,
            final_net_value = summary.final_net_value,
            final_borrowed_balance = summary.final_borrowed_balance,
            annualized_return_pct = summary.annualized_return_pct(),
            "default projection summary"
        ),
        Err(err) => tracing::warn!(error = %err, "default projection has no summary"),
    }

    let output_path = Path::new(path);
    if let Some(parent) = output_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        fs::create_dir_all(parent)?;
    }

    let file = BufWriter::new(File::create(output_path)?);
    let mut csv_writer = ProjectionCsvWriter::new(file);
    csv_writer.write_projection_and_log(
        outcome.run_id,
        outcome.projection.snapshots(),
        run_log_writer,
    )?;
    Ok(())
}
