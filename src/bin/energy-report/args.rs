use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
pub struct Args {
    /// CSV with `date,energy_saved_kwh,hvac_usage_kwh` rows.
    #[arg(long)]
    pub file: PathBuf,
}
