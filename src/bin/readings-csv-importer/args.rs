use std::path::PathBuf;

use chrono_tz::Tz;
use clap::Parser;

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long)]
    pub device_id: String,

    #[arg(long)]
    pub file: PathBuf,

    /// Zone the CSV timestamps were recorded in.
    #[arg(long, env = "TZ")]
    pub timezone: Tz,

    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,
}
