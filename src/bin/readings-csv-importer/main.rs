mod args;
mod csv;

use std::{fs::File, io::BufReader, process::ExitCode};

use air_quality_dashboard::{
    db::{bulk_insert_readings, new_pool},
    sensor::NewReading,
};
use anyhow::{Context as _, Result};
use args::Args;
use clap::Parser as _;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

use crate::csv::CsvReadingIter;

const BULK_INSERT_SIZE: usize = 1000;

#[derive(Debug, Default)]
struct ImportStats {
    // Rows sent to the database; duplicates are dropped there.
    submitted: usize,
    batches: usize,
    skipped: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "air_quality_dashboard=info,readings_csv_importer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let file =
        File::open(&args.file).with_context(|| format!("failed to open file: {:?}", args.file))?;
    let readings = CsvReadingIter::new(BufReader::new(file), args.device_id.clone(), args.timezone)
        .context("failed to create CSV reading iterator")?;

    let pool = new_pool(&args.database_url).await?;

    let stats = import(&pool, readings).await?;

    tracing::info!(
        submitted = stats.submitted,
        batches = stats.batches,
        skipped = stats.skipped,
        device_id = %args.device_id,
        file = ?args.file,
        "imported sensor readings"
    );

    Ok(())
}

async fn import(
    pool: &PgPool,
    readings: impl Iterator<Item = Result<NewReading>>,
) -> Result<ImportStats> {
    let mut stats = ImportStats::default();
    let mut batch = Vec::with_capacity(BULK_INSERT_SIZE);

    for (line, result) in readings.enumerate() {
        let reading = result.with_context(|| format!("failed to parse CSV row {}", line + 1))?;

        if !reading.has_metrics() {
            tracing::warn!(
                row = line + 1,
                timestamp = %reading.timestamp,
                "skipping row without metric values"
            );
            stats.skipped += 1;
            continue;
        }

        batch.push(reading);
        if batch.len() == BULK_INSERT_SIZE {
            flush(pool, &mut batch, &mut stats).await?;
        }
    }

    flush(pool, &mut batch, &mut stats).await?;

    Ok(stats)
}

async fn flush(
    pool: &PgPool,
    batch: &mut Vec<NewReading>,
    stats: &mut ImportStats,
) -> Result<()> {
    if batch.is_empty() {
        return Ok(());
    }

    bulk_insert_readings(pool, &batch[..])
        .await
        .with_context(|| format!("failed to insert batch {}", stats.batches + 1))?;

    stats.submitted += batch.len();
    stats.batches += 1;
    tracing::debug!(batch = stats.batches, submitted = stats.submitted, "inserted batch");
    batch.clear();

    Ok(())
}
