//! Behaviour of the reading window and classifier as the dashboard relies
//! on it.

use std::thread;

use air_quality_dashboard::{
    sensor::{Metric, Reading},
    threshold::{Severity, ThresholdTable},
    window::{ReadingWindow, SharedWindow, Summary},
};
use chrono::{DateTime, TimeDelta, TimeZone as _, Utc};
use uuid::Uuid;

fn at(second: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap() + TimeDelta::seconds(second)
}

fn empty(second: i64) -> Reading {
    Reading {
        id: Uuid::from_u128(second as u128),
        device_id: "AIRIS_ESP32_0001".to_string(),
        timestamp: at(second),
        co2: None,
        pm25: None,
        co: None,
        temperature: None,
        humidity: None,
    }
}

#[test]
fn keeps_last_hundred_of_one_hundred_fifty() {
    let mut window = ReadingWindow::new();
    for second in 0..150 {
        window.push(empty(second));
    }

    assert_eq!(window.len(), 100);
    let timestamps: Vec<_> = window.iter().map(|r| r.timestamp).collect();
    let expected: Vec<_> = (50..150).map(at).collect();
    assert_eq!(timestamps, expected);
    assert!(timestamps[0] <= timestamps[99]);
}

#[test]
fn empty_window_summaries_are_zero() {
    let window = ReadingWindow::new();
    for metric in Metric::ALL {
        assert_eq!(
            window.summary(metric),
            Summary {
                avg: 0.0,
                max: 0.0,
                min: 0.0
            }
        );
    }
}

#[test]
fn co2_summary() {
    let mut window = ReadingWindow::new();
    for (second, value) in [(0, 400.0), (1, 600.0), (2, 800.0)] {
        window.push(Reading {
            co2: Some(value),
            ..empty(second)
        });
    }

    assert_eq!(
        window.summary(Metric::Co2),
        Summary {
            avg: 600.0,
            max: 800.0,
            min: 400.0
        }
    );
}

#[test]
fn nan_is_excluded_not_zeroed() {
    let mut window = ReadingWindow::new();
    for (second, value) in [(0, f64::NAN), (1, 10.0), (2, 20.0)] {
        window.push(Reading {
            pm25: Some(value),
            ..empty(second)
        });
    }

    assert_eq!(
        window.summary(Metric::Pm25),
        Summary {
            avg: 15.0,
            max: 20.0,
            min: 10.0
        }
    );
}

#[test]
fn only_invalid_values_gives_zero_summary() {
    let mut window = ReadingWindow::new();
    window.push(Reading {
        co: Some(f64::NAN),
        ..empty(0)
    });
    window.push(empty(1));

    assert_eq!(window.summary(Metric::Co), Summary::default());
}

#[test]
fn repeated_summary_is_bit_identical() {
    let mut window = ReadingWindow::new();
    for (second, value) in [(0, 21.1), (1, 22.7), (2, 19.3), (3, 0.1)] {
        window.push(Reading {
            temperature: Some(value),
            ..empty(second)
        });
    }

    let first = window.summary(Metric::Temperature);
    let second = window.summary(Metric::Temperature);
    assert_eq!(first.avg.to_bits(), second.avg.to_bits());
    assert_eq!(first.max.to_bits(), second.max.to_bits());
    assert_eq!(first.min.to_bits(), second.min.to_bits());
}

#[test]
fn nan_never_classifies_as_a_level() {
    let table = ThresholdTable::default();
    let severity = table.classify(Metric::Co2, f64::NAN);
    assert_eq!(severity, Severity::Unknown);
    assert!(!matches!(
        severity,
        Severity::Good | Severity::Warning | Severity::Danger
    ));
}

#[test]
fn shared_window_accepts_concurrent_pushes() {
    let shared = SharedWindow::default();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let shared = shared.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    shared.push(Reading {
                        co2: Some(500.0),
                        ..empty(worker * 50 + i)
                    });
                    let summary = shared.summary(Metric::Co2);
                    assert_eq!(summary.avg, 500.0);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(shared.len(), 100);
    assert_eq!(shared.snapshot().capacity(), 100);
}
