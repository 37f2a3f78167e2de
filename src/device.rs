//! Device records and input validation for the planning engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How often a device is expected to run, gating which calendar days it is
/// eligible at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Eligible every day of the horizon.
    Daily,
    /// Eligible only on Saturdays and Sundays.
    Weekends,
    /// Eligible on a fixed 3-of-10-days cadence.
    Frequently,
    /// Eligible on a fixed 1-of-10-days cadence.
    Rarely,
}

/// Device class, distinguishing appliances that must run continuously.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Ordinary appliance with no minimum-runtime requirement.
    #[default]
    General,
    /// Refrigeration-class appliance; receives a minimum-hours reservation
    /// before any other allocation happens.
    Refrigeration,
}

/// One physical appliance under management.
///
/// Plain data: the engine never mutates a `Device`, it only reads the fleet
/// when building a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Opaque stable identifier, unique within a fleet.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Power draw in watts (must be > 0).
    pub wattage: f64,
    /// 1–5; 5 = must-run, 1 = optional.
    pub priority: u8,
    /// Usage-cadence class gating day eligibility.
    pub frequency: Frequency,
    /// Device class; refrigeration gets the minimum-hours reservation.
    #[serde(default)]
    pub kind: DeviceKind,
    /// Typical daily usage in hours; the allocator never exceeds this even
    /// with surplus budget. Must be in [0, 24].
    pub hours_per_day: f64,
}

impl Device {
    /// Returns `true` for appliances that must keep running and therefore
    /// get the phase-1 minimum reservation.
    pub fn requires_continuous_operation(&self) -> bool {
        self.kind == DeviceKind::Refrigeration
    }
}

/// Invalid-input error with field path and constraint description.
///
/// Raised by the plan entry points before any allocation runs; malformed
/// input is never silently clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputError {
    /// Dotted field path (e.g., `"devices[2].wattage"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl InputError {
    pub(crate) fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid input: {} — {}", self.field, self.message)
    }
}

impl std::error::Error for InputError {}

/// Validates a device fleet and the shared pricing figure.
///
/// Checks, in order: non-empty fleet, unique ids, positive wattage,
/// priority in 1–5, `hours_per_day` in [0, 24], and positive
/// `price_per_kwh`. Returns the first violation found.
///
/// # Errors
///
/// Returns an `InputError` naming the offending field.
pub fn validate_fleet(devices: &[Device], price_per_kwh: f64) -> Result<(), InputError> {
    if devices.is_empty() {
        return Err(InputError::new("devices", "device list must not be empty"));
    }

    for (i, d) in devices.iter().enumerate() {
        if d.wattage <= 0.0 {
            return Err(InputError::new(
                format!("devices[{i}].wattage"),
                format!("must be > 0, got {} (\"{}\")", d.wattage, d.id),
            ));
        }
        if !(1..=5).contains(&d.priority) {
            return Err(InputError::new(
                format!("devices[{i}].priority"),
                format!("must be in 1..=5, got {} (\"{}\")", d.priority, d.id),
            ));
        }
        if !(0.0..=24.0).contains(&d.hours_per_day) {
            return Err(InputError::new(
                format!("devices[{i}].hours_per_day"),
                format!("must be in [0, 24], got {} (\"{}\")", d.hours_per_day, d.id),
            ));
        }
        if devices[..i].iter().any(|other| other.id == d.id) {
            return Err(InputError::new(
                format!("devices[{i}].id"),
                format!("duplicate device id \"{}\"", d.id),
            ));
        }
    }

    if price_per_kwh <= 0.0 {
        return Err(InputError::new(
            "price_per_kwh",
            format!("must be > 0, got {price_per_kwh}"),
        ));
    }

    Ok(())
}
