use std::io::Read;

use air_quality_dashboard::energy::EnergyUsage;
use anyhow::{Context as _, Result, bail};
use chrono::NaiveDate;
use csv::Reader;

const DATE_INDEX: usize = 0;
const ENERGY_SAVED_INDEX: usize = 1;
const HVAC_USAGE_INDEX: usize = 2;

pub fn read_energy_usages<R: Read>(reader: R) -> Result<Vec<EnergyUsage>> {
    let mut reader = Reader::from_reader(reader);
    let mut usages = Vec::new();

    for row in reader.records() {
        let row = row.context("failed to read CSV record")?;
        if row.len() < 3 {
            bail!(
                "energy row too short: expected 3 columns, got {}",
                row.len()
            );
        }

        let date = NaiveDate::parse_from_str(row[DATE_INDEX].trim(), "%Y-%m-%d")
            .with_context(|| format!("failed to parse date: {}", &row[DATE_INDEX]))?;
        let energy_saved_kwh = row[ENERGY_SAVED_INDEX].trim().parse().with_context(|| {
            format!("failed to parse energy saved: {}", &row[ENERGY_SAVED_INDEX])
        })?;
        let hvac_usage_kwh = row[HVAC_USAGE_INDEX].trim().parse().with_context(|| {
            format!("failed to parse HVAC usage: {}", &row[HVAC_USAGE_INDEX])
        })?;

        usages.push(EnergyUsage {
            date,
            energy_saved_kwh,
            hvac_usage_kwh,
        });
    }

    Ok(usages)
}
