mod args;
mod csv;

use std::{fs::File, process::ExitCode};

use air_quality_dashboard::{energy::EnergySummary, format::format_value};
use anyhow::{Context as _, Result};
use args::Args;
use clap::Parser as _;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

use crate::csv::read_energy_usages;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "energy_report=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        tracing::error!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

fn run() -> Result<()> {
    let args = Args::parse();

    let file =
        File::open(&args.file).with_context(|| format!("failed to open file: {:?}", args.file))?;
    let usages = read_energy_usages(file).context("failed to read energy usage")?;
    tracing::info!(days = usages.len(), "loaded energy usage");

    let summary = EnergySummary::from_usages(&usages);

    println!(
        "Average HVAC Usage  {} kWh",
        format_value(summary.average_hvac_usage_kwh)
    );
    println!(
        "Total Energy Saved  {} kWh",
        format_value(summary.total_energy_saved_kwh)
    );
    println!(
        "Energy Efficiency   {} %",
        format_value(summary.efficiency_percent)
    );

    Ok(())
}
