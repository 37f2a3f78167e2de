//! Shared test fixtures for integration tests.

use chrono::NaiveDate;

use wattplan::device::{Device, DeviceKind, Frequency};
use wattplan::plan::types::{EmissionLevels, WeatherExclusions};

/// Default horizon start (2026-08-03, a Monday).
pub fn default_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 3).expect("valid date")
}

/// Builds a general device with daily frequency.
pub fn device(id: &str, wattage: f64, priority: u8, hours_per_day: f64) -> Device {
    Device {
        id: id.to_string(),
        name: id.to_string(),
        wattage,
        priority,
        frequency: Frequency::Daily,
        kind: DeviceKind::General,
        hours_per_day,
    }
}

/// Default five-device household fleet.
pub fn default_fleet() -> Vec<Device> {
    vec![
        Device {
            kind: DeviceKind::Refrigeration,
            ..device("fridge", 150.0, 5, 24.0)
        },
        device("ac", 2000.0, 4, 6.0),
        Device {
            frequency: Frequency::Frequently,
            ..device("washer", 800.0, 3, 1.5)
        },
        device("tv", 120.0, 2, 4.0),
        Device {
            frequency: Frequency::Weekends,
            ..device("console", 180.0, 1, 3.0)
        },
    ]
}

/// Default emission levels for the fleet (AC is the worst polluter).
pub fn default_emissions() -> EmissionLevels {
    let mut levels = EmissionLevels::none();
    levels.set("ac", 5);
    levels.set("washer", 3);
    levels.set("fridge", 2);
    levels
}

/// No weather exclusions.
pub fn no_exclusions() -> WeatherExclusions {
    WeatherExclusions::none()
}
