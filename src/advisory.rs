use crate::sensor::{Metric, Reading};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advisory {
    pub metric: Metric,
    pub title: &'static str,
    pub description: &'static str,
}

struct Rule {
    metric: Metric,
    limit: f64,
    title: &'static str,
    description: &'static str,
}

const RULES: [Rule; 3] = [
    Rule {
        metric: Metric::Co2,
        limit: 1000.0,
        title: "High CO₂ Levels",
        description: "Open windows to improve ventilation",
    },
    Rule {
        metric: Metric::Pm25,
        limit: 25.0,
        title: "High PM2.5 Levels",
        description: "Activate air purifier",
    },
    Rule {
        metric: Metric::Co,
        limit: 9.0,
        title: "High CO Levels",
        description: "Check ventilation system immediately",
    },
];

/// Actionable warnings for a reading. A value must exceed its limit; an
/// absent or non-finite value never triggers one.
pub fn advisories(reading: &Reading) -> Vec<Advisory> {
    RULES
        .iter()
        .filter(|rule| {
            reading
                .valid_value(rule.metric)
                .is_some_and(|v| v > rule.limit)
        })
        .map(|rule| Advisory {
            metric: rule.metric,
            title: rule.title,
            description: rule.description,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn reading(co2: f64, pm25: f64, co: f64) -> Reading {
        Reading {
            id: Uuid::nil(),
            device_id: "dev-1".to_string(),
            timestamp: Utc::now(),
            co2: Some(co2),
            pm25: Some(pm25),
            co: Some(co),
            temperature: Some(22.0),
            humidity: Some(45.0),
        }
    }

    #[test]
    fn limits_are_exclusive() {
        assert!(advisories(&reading(1000.0, 25.0, 9.0)).is_empty());
    }

    #[test]
    fn reports_each_exceeded_limit_in_order() {
        let metrics: Vec<_> = advisories(&reading(1000.1, 30.0, 12.0))
            .into_iter()
            .map(|a| a.metric)
            .collect();
        assert_eq!(metrics, vec![Metric::Co2, Metric::Pm25, Metric::Co]);
    }

    #[test]
    fn non_finite_values_are_ignored() {
        let r = Reading {
            co2: Some(f64::INFINITY),
            co: None,
            ..reading(0.0, 40.0, 0.0)
        };
        let advisories = advisories(&r);
        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0].title, "High PM2.5 Levels");
    }
}
