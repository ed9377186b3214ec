use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// One decimal place, the precision every dashboard figure is shown at.
pub fn format_value(value: f64) -> String {
    format!("{value:.1}")
}

pub fn format_timestamp(timestamp: DateTime<Utc>, timezone: Tz) -> String {
    timestamp
        .with_timezone(&timezone)
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(format_value(600.0), "600.0");
        assert_eq!(format_value(21.349), "21.3");
        assert_eq!(format_value(-0.26), "-0.3");
    }

    #[test]
    fn renders_in_the_given_timezone() {
        let ts = Utc.with_ymd_and_hms(2025, 2, 1, 3, 4, 5).unwrap();
        assert_eq!(
            format_timestamp(ts, chrono_tz::Asia::Tokyo),
            "2025-02-01 12:04:05 JST"
        );
    }
}
