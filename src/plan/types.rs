//! Core plan types: per-day allocations, schedules, and plan aggregates.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// Which objective a plan optimizes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    /// Minimum spend under the monthly budget cap.
    Cost,
    /// Minimum environmental impact via emission-level hour reduction.
    Eco,
    /// Priority-aware balance between the other two.
    Comfort,
}

impl PlanKind {
    /// Stable lowercase name, used in CLI flags, CSV rows, and API paths.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cost => "cost",
            Self::Eco => "eco",
            Self::Comfort => "comfort",
        }
    }

    /// Parses a lowercase plan-kind name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "cost" => Some(Self::Cost),
            "eco" => Some(Self::Eco),
            "comfort" => Some(Self::Comfort),
            _ => None,
        }
    }
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Days on which specific devices are weather-excluded.
///
/// BTree-backed so iteration order is deterministic, which keeps plan
/// output bit-for-bit reproducible.
#[derive(Debug, Clone, Default)]
pub struct WeatherExclusions {
    days: BTreeMap<u32, BTreeSet<String>>,
}

impl WeatherExclusions {
    /// Empty exclusion set (no device is ever excluded).
    pub fn none() -> Self {
        Self::default()
    }

    /// Marks `device_id` as excluded on `day_number`.
    pub fn exclude(&mut self, day_number: u32, device_id: impl Into<String>) {
        self.days.entry(day_number).or_default().insert(device_id.into());
    }

    /// Whether `device_id` is excluded on `day_number`.
    pub fn is_excluded(&self, day_number: u32, device_id: &str) -> bool {
        self.days
            .get(&day_number)
            .is_some_and(|ids| ids.contains(device_id))
    }
}

/// Per-device emission classification (1–5, 5 = worst polluter).
///
/// Devices missing from the map default to level 1.
#[derive(Debug, Clone, Default)]
pub struct EmissionLevels {
    levels: BTreeMap<String, u8>,
}

impl EmissionLevels {
    /// Empty map; every device defaults to level 1.
    pub fn none() -> Self {
        Self::default()
    }

    /// Sets the emission level for `device_id`.
    pub fn set(&mut self, device_id: impl Into<String>, level: u8) {
        self.levels.insert(device_id.into(), level);
    }

    /// Emission level for `device_id`, defaulting to 1 when absent.
    pub fn level(&self, device_id: &str) -> u8 {
        self.levels.get(device_id).copied().unwrap_or(1)
    }
}

/// Hours and cost granted to one device on one day.
///
/// Created fresh each day; never mutated once placed in a [`DaySchedule`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceHours {
    /// Device identifier.
    pub device_id: String,
    /// Power draw in watts, copied from the device record.
    pub wattage: f64,
    /// Device priority (1–5).
    pub priority: u8,
    /// Granted runtime in hours (1 decimal).
    pub hours: f64,
    /// Energy for the granted hours (kWh, 2 decimals).
    pub kwh: f64,
    /// Projected cost for the granted hours (2 decimals).
    pub cost: f64,
    /// Emission level applied when costing (1–5; 1 outside the Eco plan).
    pub emission_level: u8,
}

/// One calendar day of a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySchedule {
    /// 1-based day index within the horizon.
    pub day_number: u32,
    /// Calendar date of this day.
    pub date: NaiveDate,
    /// Whether the date is a Saturday or Sunday.
    pub is_weekend: bool,
    /// Every fleet device, in input order; zero hours when not scheduled.
    pub devices: Vec<DeviceHours>,
    /// Sum of device costs (2 decimals each).
    pub total_cost: f64,
    /// Sum of device energies (2 decimals each).
    pub total_kwh: f64,
}

impl fmt::Display for DaySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let active = self.devices.iter().filter(|d| d.hours > 0.0).count();
        write!(
            f,
            "day {:>2} ({}{}) | {:>2} active | {:>6.2} kWh | {:>6.2}",
            self.day_number,
            self.date,
            if self.is_weekend { ", weekend" } else { "" },
            active,
            self.total_kwh,
            self.total_cost,
        )
    }
}

/// A fully computed 30-day schedule optimized for one objective.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    /// Optimization objective.
    pub kind: PlanKind,
    /// First calendar day of the horizon.
    pub start_date: NaiveDate,
    /// Per-day spending ceiling used while building the plan.
    pub daily_budget: f64,
    /// Tariff used for all costing.
    pub price_per_kwh: f64,
    /// One entry per day, ascending `day_number`.
    pub schedule: Vec<DaySchedule>,
    /// Sum of daily costs across the horizon.
    pub total_monthly_cost: f64,
    /// Sum of daily energies across the horizon.
    pub total_monthly_kwh: f64,
}

/// Eco plan: the base plan plus emission metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EcoPlan {
    /// The underlying 30-day plan.
    #[serde(flatten)]
    pub plan: Plan,
    /// Mean applied reduction across all scheduled device-days, as a whole
    /// percentage.
    pub avg_emission_reduction_pct: u8,
    /// Days where the trim loop hit its iteration cap with the day still
    /// over budget. Observable, not an error.
    pub infeasible_days: Vec<u32>,
}
