use std::io::Read;

use air_quality_dashboard::sensor::{Metric, NewReading};
use anyhow::{Context as _, Result, anyhow, bail};
use chrono::{LocalResult, NaiveDateTime, Utc};
use chrono_tz::Tz;
use csv::{Reader, StringRecord};

const TIMESTAMP_COLUMN: &str = "timestamp";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Where each column lives in the file. Metric columns are optional; a
/// file from a CO₂-only sensor simply has no `pm25` column.
#[derive(Debug, Clone, Copy)]
struct Columns {
    timestamp: usize,
    co2: Option<usize>,
    pm25: Option<usize>,
    co: Option<usize>,
    temperature: Option<usize>,
    humidity: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self> {
        let find = |name: &str| header.iter().position(|h| h.trim() == name);

        Ok(Self {
            timestamp: find(TIMESTAMP_COLUMN)
                .ok_or_else(|| anyhow!("CSV header has no {TIMESTAMP_COLUMN} column"))?,
            co2: find(Metric::Co2.as_str()),
            pm25: find(Metric::Pm25.as_str()),
            co: find(Metric::Co.as_str()),
            temperature: find(Metric::Temperature.as_str()),
            humidity: find(Metric::Humidity.as_str()),
        })
    }
}

#[derive(Debug)]
pub struct CsvReadingIter<R> {
    reader: Reader<R>,
    columns: Columns,
    device_id: String,
    timezone: Tz,
}

impl<R: Read> CsvReadingIter<R> {
    pub fn new(reader: R, device_id: String, timezone: Tz) -> Result<Self> {
        let mut reader = Reader::from_reader(reader);
        let header = reader.headers().context("failed to read CSV header")?;
        let columns = Columns::from_header(header)?;

        Ok(Self {
            reader,
            columns,
            device_id,
            timezone,
        })
    }

    fn parse_row(&self, row: &StringRecord) -> Result<NewReading> {
        let raw_timestamp = row
            .get(self.columns.timestamp)
            .ok_or_else(|| anyhow!("row has no timestamp"))?;
        let naive = NaiveDateTime::parse_from_str(raw_timestamp, TIMESTAMP_FORMAT)
            .with_context(|| format!("failed to parse timestamp: {raw_timestamp}"))?;
        let timestamp = match naive.and_local_timezone(self.timezone) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(dt, _) => dt,
            LocalResult::None => bail!("invalid timestamp: {raw_timestamp}"),
        };

        Ok(NewReading {
            device_id: self.device_id.clone(),
            timestamp: timestamp.with_timezone(&Utc),
            co2: parse_metric(row, self.columns.co2, Metric::Co2)?,
            pm25: parse_metric(row, self.columns.pm25, Metric::Pm25)?,
            co: parse_metric(row, self.columns.co, Metric::Co)?,
            temperature: parse_metric(row, self.columns.temperature, Metric::Temperature)?,
            humidity: parse_metric(row, self.columns.humidity, Metric::Humidity)?,
        })
    }
}

/// An absent column or an empty cell is a missing value, not zero.
fn parse_metric(row: &StringRecord, index: Option<usize>, metric: Metric) -> Result<Option<f64>> {
    let Some(raw) = index.and_then(|i| row.get(i)).map(str::trim) else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }

    let value = raw
        .parse()
        .with_context(|| format!("failed to parse {metric}: {raw}"))?;
    Ok(Some(value))
}

impl<R: Read> Iterator for CsvReadingIter<R> {
    type Item = Result<NewReading>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.reader.records().next()? {
            Ok(row) => row,
            Err(e) => return Some(Err(e.into())),
        };

        Some(self.parse_row(&row))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn iter(csv: &str) -> CsvReadingIter<&[u8]> {
        CsvReadingIter::new(csv.as_bytes(), "dev-1".to_string(), chrono_tz::Asia::Tokyo).unwrap()
    }

    #[test]
    fn parses_rows_in_local_time() {
        let readings: Vec<_> = iter("timestamp,co2,humidity\n2025-02-01 09:30,640,41.5\n")
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(
            readings,
            vec![NewReading {
                device_id: "dev-1".to_string(),
                timestamp: Utc.with_ymd_and_hms(2025, 2, 1, 0, 30, 0).unwrap(),
                co2: Some(640.0),
                pm25: None,
                co: None,
                temperature: None,
                humidity: Some(41.5),
            }]
        );
    }

    #[test]
    fn empty_cells_are_missing() {
        let reading = iter("timestamp,co2,pm25\n2025-02-01 09:30,,12\n")
            .next()
            .unwrap()
            .unwrap();

        assert_eq!(reading.co2, None);
        assert_eq!(reading.pm25, Some(12.0));
    }

    #[test]
    fn header_without_timestamp_is_rejected() {
        assert!(
            CsvReadingIter::new("co2\n400\n".as_bytes(), "dev-1".to_string(), chrono_tz::UTC)
                .is_err()
        );
    }

    #[test]
    fn bad_number_is_an_error() {
        let result = iter("timestamp,co\n2025-02-01 09:30,high\n").next().unwrap();
        assert!(result.is_err());
    }
}
