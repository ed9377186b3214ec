use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::sensor::Metric;

/// A single sensor observation as stored in `sensor_data`.
///
/// Metric values are kept as delivered. A missing or non-finite value is
/// not a valid observation for that metric; see [`Reading::valid_value`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub id: Uuid,

    pub device_id: String,

    pub timestamp: DateTime<Utc>,

    pub co2: Option<f64>,

    pub pm25: Option<f64>,

    pub co: Option<f64>,

    pub temperature: Option<f64>,

    pub humidity: Option<f64>,
}

impl Reading {
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Co2 => self.co2,
            Metric::Pm25 => self.pm25,
            Metric::Co => self.co,
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
        }
    }

    /// The metric value if it is present and finite.
    pub fn valid_value(&self, metric: Metric) -> Option<f64> {
        self.value(metric).filter(|v| v.is_finite())
    }
}

/// A reading that has not been stored yet, so it has no id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub device_id: String,

    pub timestamp: DateTime<Utc>,

    pub co2: Option<f64>,

    pub pm25: Option<f64>,

    pub co: Option<f64>,

    pub temperature: Option<f64>,

    pub humidity: Option<f64>,
}

impl NewReading {
    /// Whether at least one metric carries a value.
    pub fn has_metrics(&self) -> bool {
        [
            self.co2,
            self.pm25,
            self.co,
            self.temperature,
            self.humidity,
        ]
        .iter()
        .any(Option::is_some)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn reading() -> Reading {
        Reading {
            id: Uuid::nil(),
            device_id: "AIRIS_ESP32_0001".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap(),
            co2: Some(612.0),
            pm25: Some(f64::NAN),
            co: None,
            temperature: Some(f64::INFINITY),
            humidity: Some(41.5),
        }
    }

    #[test]
    fn value_maps_each_metric_to_its_field() {
        let r = reading();
        assert_eq!(r.value(Metric::Co2), Some(612.0));
        assert_eq!(r.value(Metric::Co), None);
        assert_eq!(r.value(Metric::Humidity), Some(41.5));
    }

    #[test]
    fn new_reading_without_values_has_no_metrics() {
        let empty = NewReading {
            device_id: "AIRIS_ESP32_0001".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap(),
            co2: None,
            pm25: None,
            co: None,
            temperature: None,
            humidity: None,
        };
        assert!(!empty.has_metrics());

        let humidity_only = NewReading {
            humidity: Some(40.0),
            ..empty
        };
        assert!(humidity_only.has_metrics());
    }

    #[test]
    fn valid_value_drops_missing_and_non_finite() {
        let r = reading();
        assert_eq!(r.valid_value(Metric::Co2), Some(612.0));
        assert_eq!(r.valid_value(Metric::Pm25), None);
        assert_eq!(r.valid_value(Metric::Co), None);
        assert_eq!(r.valid_value(Metric::Temperature), None);
    }
}
