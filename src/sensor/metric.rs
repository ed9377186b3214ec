use std::{fmt, str::FromStr};

use anyhow::{Error, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Co2,
    Pm25,
    Co,
    Temperature,
    Humidity,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Co2,
        Metric::Pm25,
        Metric::Co,
        Metric::Temperature,
        Metric::Humidity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Co2 => "co2",
            Metric::Pm25 => "pm25",
            Metric::Co => "co",
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Co2 => "CO₂",
            Metric::Pm25 => "PM2.5",
            Metric::Co => "CO",
            Metric::Temperature => "Temperature",
            Metric::Humidity => "Humidity",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Co2 => "ppm",
            Metric::Pm25 => "µg/m³",
            Metric::Co => "ppm",
            Metric::Temperature => "°C",
            Metric::Humidity => "%",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "co2" => Ok(Metric::Co2),
            "pm25" => Ok(Metric::Pm25),
            "co" => Ok(Metric::Co),
            "temperature" => Ok(Metric::Temperature),
            "humidity" => Ok(Metric::Humidity),
            _ => bail!("unknown metric: {}", s),
        }
    }
}
