use std::{fmt, io::Read};

use anyhow::{Context as _, Result, bail};
use csv::Reader;

use crate::sensor::Metric;

const METRIC_INDEX: usize = 0;
const WARNING_INDEX: usize = 1;
const DANGER_INDEX: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Good,
    Warning,
    Danger,
    /// The value was not a finite number.
    Unknown,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Good => "good",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
            Severity::Unknown => "unknown",
        }
    }

    /// Whether the severity should be shown to the user as a warning.
    pub fn is_alerting(&self) -> bool {
        matches!(self, Severity::Warning | Severity::Danger)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the scale is dangerous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub warning: f64,
    pub danger: f64,
    pub polarity: Polarity,
}

impl Threshold {
    pub const fn high(warning: f64, danger: f64) -> Self {
        Self {
            warning,
            danger,
            polarity: Polarity::High,
        }
    }

    pub const fn low(warning: f64, danger: f64) -> Self {
        Self {
            warning,
            danger,
            polarity: Polarity::Low,
        }
    }

    /// Both levels must be finite, with warning strictly on the safe side
    /// of danger.
    pub fn validate(&self) -> Result<()> {
        if !self.warning.is_finite() || !self.danger.is_finite() {
            bail!(
                "threshold levels must be finite: warning {}, danger {}",
                self.warning,
                self.danger
            );
        }

        match self.polarity {
            Polarity::High if self.warning >= self.danger => bail!(
                "warning level {} must be below danger level {}",
                self.warning,
                self.danger
            ),
            Polarity::Low if self.warning <= self.danger => bail!(
                "warning level {} must be above danger level {}",
                self.warning,
                self.danger
            ),
            _ => Ok(()),
        }
    }

    pub fn classify(&self, value: f64) -> Severity {
        if !value.is_finite() {
            return Severity::Unknown;
        }

        match self.polarity {
            Polarity::High => {
                if value >= self.danger {
                    Severity::Danger
                } else if value >= self.warning {
                    Severity::Warning
                } else {
                    Severity::Good
                }
            }
            Polarity::Low => {
                if value <= self.danger {
                    Severity::Danger
                } else if value <= self.warning {
                    Severity::Warning
                } else {
                    Severity::Good
                }
            }
        }
    }
}

/// Per-metric thresholds. Humidity is the only low-polarity metric; high
/// humidity is not classified.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    pub co2: Threshold,
    pub pm25: Threshold,
    pub co: Threshold,
    pub temperature: Threshold,
    pub humidity: Threshold,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            co2: Threshold::high(1000.0, 2000.0),
            pm25: Threshold::high(35.0, 50.0),
            co: Threshold::high(5.0, 10.0),
            temperature: Threshold::high(27.0, 30.0),
            humidity: Threshold::low(30.0, 20.0),
        }
    }
}

impl ThresholdTable {
    pub fn get(&self, metric: Metric) -> &Threshold {
        match metric {
            Metric::Co2 => &self.co2,
            Metric::Pm25 => &self.pm25,
            Metric::Co => &self.co,
            Metric::Temperature => &self.temperature,
            Metric::Humidity => &self.humidity,
        }
    }

    fn get_mut(&mut self, metric: Metric) -> &mut Threshold {
        match metric {
            Metric::Co2 => &mut self.co2,
            Metric::Pm25 => &mut self.pm25,
            Metric::Co => &mut self.co,
            Metric::Temperature => &mut self.temperature,
            Metric::Humidity => &mut self.humidity,
        }
    }

    pub fn classify(&self, metric: Metric, value: f64) -> Severity {
        self.get(metric).classify(value)
    }

    /// Classifies by metric identifier. An unknown identifier is an error,
    /// never a guessed threshold.
    pub fn classify_named(&self, metric: &str, value: f64) -> Result<Severity> {
        let metric: Metric = metric.parse()?;
        Ok(self.classify(metric, value))
    }

    /// Loads a table from CSV with a `metric,warning,danger` header.
    ///
    /// Rows override the defaults; the polarity of a metric never changes.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut table = Self::default();
        let mut reader = Reader::from_reader(reader);

        for (i, row) in reader.records().enumerate() {
            let row = row.with_context(|| format!("failed to read threshold row {}", i + 1))?;
            if row.len() < 3 {
                bail!(
                    "threshold row {} too short: expected 3 columns, got {}",
                    i + 1,
                    row.len()
                );
            }

            let metric: Metric = row[METRIC_INDEX]
                .trim()
                .parse()
                .with_context(|| format!("invalid metric in threshold row {}", i + 1))?;
            let warning: f64 = row[WARNING_INDEX].trim().parse().with_context(|| {
                format!("failed to parse warning level: {}", &row[WARNING_INDEX])
            })?;
            let danger: f64 = row[DANGER_INDEX].trim().parse().with_context(|| {
                format!("failed to parse danger level: {}", &row[DANGER_INDEX])
            })?;

            let threshold = table.get_mut(metric);
            threshold.warning = warning;
            threshold.danger = danger;
            threshold
                .validate()
                .with_context(|| format!("invalid {metric} levels in threshold row {}", i + 1))?;
        }

        Ok(table)
    }
}
