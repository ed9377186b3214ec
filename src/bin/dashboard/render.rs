use std::fmt::Write as _;

use air_quality_dashboard::{
    advisory::advisories,
    format::{format_timestamp, format_value},
    sensor::{Device, Metric},
    threshold::{Severity, ThresholdTable},
    window::ReadingWindow,
};
use chrono_tz::Tz;

pub fn render_devices<'a>(devices: impl IntoIterator<Item = &'a Device>, timezone: Tz) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Devices");
    for device in devices {
        let last_seen = device
            .last_transmission
            .map(|t| format_timestamp(t, timezone))
            .unwrap_or_else(|| "never".to_string());
        let _ = writeln!(
            out,
            "  {:<24} {:<20} {:<16} {:<8} last seen {}",
            device.device_id,
            device.name,
            device.location,
            device.status.as_str(),
            last_seen
        );
    }

    out
}

pub fn render_window(window: &ReadingWindow, thresholds: &ThresholdTable, timezone: Tz) -> String {
    let mut out = String::new();

    let Some(latest) = window.latest() else {
        let _ = writeln!(out, "No sensor data available");
        return out;
    };

    let _ = writeln!(
        out,
        "Latest reading from {} at {}",
        latest.device_id,
        format_timestamp(latest.timestamp, timezone)
    );
    for metric in Metric::ALL {
        let (value, severity) = match latest.value(metric) {
            Some(v) => (format_value(v), thresholds.classify(metric, v)),
            None => ("-".to_string(), Severity::Unknown),
        };
        let _ = writeln!(
            out,
            "  {:<12} {:>8} {:<6} {}",
            metric.label(),
            value,
            metric.unit(),
            severity
        );
    }

    for advisory in advisories(latest) {
        let _ = writeln!(out, "! {}: {}", advisory.title, advisory.description);
    }

    let _ = writeln!(out, "Summary of the last {} readings", window.len());
    for metric in Metric::ALL {
        let summary = window.summary(metric);
        let _ = writeln!(
            out,
            "  {:<12} avg {:>8} max {:>8} min {:>8} {}",
            metric.label(),
            format_value(summary.avg),
            format_value(summary.max),
            format_value(summary.min),
            metric.unit()
        );
    }

    out
}
