mod args;
mod render;

use std::{fs::File, path::Path, process::ExitCode, sync::Arc};

use air_quality_dashboard::{
    db::new_pool,
    repository::{PgReadingRepository, ReadingRepository},
    sensor::Device,
    session::Session,
    threshold::ThresholdTable,
    window::SharedWindow,
};
use anyhow::{Context as _, Result};
use args::Args;
use clap::Parser as _;
use indexmap::IndexMap;
use tokio::sync::Notify;
use tokio_stream::StreamExt as _;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

use crate::render::{render_devices, render_window};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "air_quality_dashboard=info,dashboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        tracing::error!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::from(0)
}

fn load_thresholds(path: Option<&Path>) -> Result<ThresholdTable> {
    let Some(path) = path else {
        return Ok(ThresholdTable::default());
    };

    let file =
        File::open(path).with_context(|| format!("failed to open thresholds file: {path:?}"))?;
    ThresholdTable::from_csv_reader(file)
        .with_context(|| format!("failed to load thresholds from {path:?}"))
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let thresholds = load_thresholds(args.thresholds.as_deref())?;

    let pool = new_pool(&args.database_url).await?;
    let repository = PgReadingRepository::new(pool);

    if let Some(user_id) = args.user_id {
        let session = Session::new(user_id);
        let devices: IndexMap<String, Device> = repository
            .fetch_devices(&session)
            .await
            .context("failed to get devices")?
            .into_iter()
            .map(|d| (d.device_id.clone(), d))
            .collect();

        if let Some(device_id) = &args.device_id
            && !devices.contains_key(device_id)
        {
            tracing::warn!(%device_id, %user_id, "device is not registered to this user");
        }

        println!("{}", render_devices(devices.values(), args.timezone));
    }

    let window = SharedWindow::default();

    // Subscribe before the bulk fetch so nothing inserted in between is lost;
    // readings delivered by both are pushed once.
    let stream = if args.follow {
        Some(
            repository
                .subscribe_readings()
                .await
                .context("failed to subscribe to sensor readings")?,
        )
    } else {
        None
    };

    let readings = repository
        .fetch_readings(args.device_id.as_deref())
        .await
        .context("failed to fetch sensor readings")?;
    tracing::info!(count = readings.len(), "fetched sensor readings");
    window.extend_most_recent_first(readings);

    println!(
        "{}",
        render_window(&window.snapshot(), &thresholds, args.timezone)
    );

    let Some(mut stream) = stream else {
        return Ok(());
    };

    let updated = Arc::new(Notify::new());
    let mut ingest = {
        let window = window.clone();
        let updated = updated.clone();
        let device_id = args.device_id.clone();
        tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                let reading = match item {
                    Ok(r) => r,
                    Err(err) => {
                        tracing::warn!("sensor reading subscription error: {err:#}");
                        continue;
                    }
                };

                if let Some(device_id) = &device_id
                    && &reading.device_id != device_id
                {
                    continue;
                }

                let id = reading.id;
                if !window.push_new(reading) {
                    tracing::debug!(%id, "reading already in window");
                    continue;
                }
                tracing::debug!(%id, "received reading");
                updated.notify_one();
            }
        })
    };

    loop {
        tokio::select! {
            _ = updated.notified() => {
                println!(
                    "{}",
                    render_window(&window.snapshot(), &thresholds, args.timezone)
                );
            }
            _ = &mut ingest => {
                tracing::warn!("sensor reading subscription ended");
                break;
            }
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for shutdown signal")?;
                tracing::info!("shutting down");
                break;
            }
        }
    }

    ingest.abort();

    Ok(())
}
