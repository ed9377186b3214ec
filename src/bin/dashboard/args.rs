use std::path::PathBuf;

use chrono_tz::Tz;
use clap::Parser;
use uuid::Uuid;

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, env = "TZ")]
    pub timezone: Tz,

    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Only show readings from this device.
    #[arg(long)]
    pub device_id: Option<String>,

    /// Signed-in user whose devices are listed.
    #[arg(long, env = "DASHBOARD_USER_ID")]
    pub user_id: Option<Uuid>,

    /// CSV file with `metric,warning,danger` rows overriding the defaults.
    #[arg(long, env = "THRESHOLDS_FILE")]
    pub thresholds: Option<PathBuf>,

    /// Keep running and re-render on every new reading.
    #[arg(long)]
    pub follow: bool,
}
