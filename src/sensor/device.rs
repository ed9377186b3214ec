use std::str::FromStr;

use anyhow::{Error, bail};
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    Active,
    Inactive,
    Error,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Active => "active",
            DeviceStatus::Inactive => "inactive",
            DeviceStatus::Error => "error",
        }
    }
}

impl FromStr for DeviceStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(DeviceStatus::Active),
            "inactive" => Ok(DeviceStatus::Inactive),
            "error" => Ok(DeviceStatus::Error),
            _ => bail!("unknown device status: {}", s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Device {
    pub id: Uuid,

    /// Hardware identifier reported in `Reading::device_id`.
    pub device_id: String,

    pub name: String,

    pub location: String,

    pub status: DeviceStatus,

    pub battery_level: Option<f64>,

    pub firmware_version: Option<String>,

    pub last_transmission: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_identifier() {
        for status in [
            DeviceStatus::Active,
            DeviceStatus::Inactive,
            DeviceStatus::Error,
        ] {
            assert_eq!(status.as_str().parse::<DeviceStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_an_error() {
        assert!("retired".parse::<DeviceStatus>().is_err());
    }
}
