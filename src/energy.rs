use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct EnergyUsage {
    pub date: NaiveDate,

    pub energy_saved_kwh: f64,

    pub hvac_usage_kwh: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergySummary {
    pub average_hvac_usage_kwh: f64,
    pub total_energy_saved_kwh: f64,
    pub efficiency_percent: f64,
}

impl EnergySummary {
    /// Empty input, or no HVAC usage at all, yields zeros rather than NaN.
    pub fn from_usages(usages: &[EnergyUsage]) -> Self {
        if usages.is_empty() {
            return Self::default();
        }

        let total_hvac: f64 = usages.iter().map(|u| u.hvac_usage_kwh).sum();
        let total_saved: f64 = usages.iter().map(|u| u.energy_saved_kwh).sum();

        let efficiency_percent = if total_hvac == 0.0 {
            0.0
        } else {
            total_saved / total_hvac * 100.0
        };

        Self {
            average_hvac_usage_kwh: total_hvac / usages.len() as f64,
            total_energy_saved_kwh: total_saved,
            efficiency_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(day: u32, saved: f64, hvac: f64) -> EnergyUsage {
        EnergyUsage {
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            energy_saved_kwh: saved,
            hvac_usage_kwh: hvac,
        }
    }

    #[test]
    fn summarizes_daily_usage() {
        let summary = EnergySummary::from_usages(&[usage(1, 2.0, 40.0), usage(2, 3.0, 60.0)]);
        assert_eq!(
            summary,
            EnergySummary {
                average_hvac_usage_kwh: 50.0,
                total_energy_saved_kwh: 5.0,
                efficiency_percent: 5.0,
            }
        );
    }

    #[test]
    fn empty_input_is_all_zero() {
        assert_eq!(EnergySummary::from_usages(&[]), EnergySummary::default());
    }

    #[test]
    fn zero_hvac_usage_has_zero_efficiency() {
        let summary = EnergySummary::from_usages(&[usage(1, 1.5, 0.0)]);
        assert_eq!(summary.efficiency_percent, 0.0);
        assert_eq!(summary.total_energy_saved_kwh, 1.5);
    }
}
