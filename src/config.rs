//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::device::{Device, DeviceKind, Frequency};
use crate::plan::calendar::HORIZON_DAYS;
use crate::plan::types::{EmissionLevels, WeatherExclusions};

/// Top-level scenario configuration parsed from TOML.
///
/// Load from TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`] for the built-in default household.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Household-wide pricing and horizon parameters.
    #[serde(default)]
    pub household: HouseholdConfig,
    /// Monthly budget figures.
    #[serde(default)]
    pub budget: BudgetConfig,
    /// Device fleet under management.
    #[serde(default, rename = "device")]
    pub devices: Vec<DeviceConfig>,
    /// Weather-driven per-day device exclusions.
    #[serde(default, rename = "weather_exclusion")]
    pub weather_exclusions: Vec<WeatherExclusionConfig>,
}

/// Household-wide pricing and horizon parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HouseholdConfig {
    /// Electricity tariff per kWh (must be > 0).
    pub price_per_kwh: f64,
    /// First day of the horizon; defaults to today when absent.
    pub start_date: Option<NaiveDate>,
}

impl Default for HouseholdConfig {
    fn default() -> Self {
        Self {
            price_per_kwh: 0.22,
            start_date: None,
        }
    }
}

/// Monthly budget figures.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BudgetConfig {
    /// Monthly spending cap driving the Cost plan.
    pub monthly_limit: f64,
    /// Historical average monthly cost; drives the Eco plan's daily
    /// budget and the savings metric.
    pub avg_monthly_cost: f64,
    /// Preferred monthly spend recorded on the Comfort plan.
    pub preferred_monthly: f64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            monthly_limit: 75.0,
            avg_monthly_cost: 80.0,
            preferred_monthly: 70.0,
        }
    }
}

/// One device entry of the fleet.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    /// Stable identifier, unique within the fleet.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Power draw in watts (must be > 0).
    pub wattage: f64,
    /// 1–5; 5 = must-run.
    pub priority: u8,
    /// Usage-cadence class: `daily`, `weekends`, `frequently`, `rarely`.
    pub frequency: Frequency,
    /// Device class; defaults to `general`.
    #[serde(default)]
    pub kind: DeviceKind,
    /// Typical daily usage in hours (0–24).
    pub hours_per_day: f64,
    /// Emission level 1–5 (5 = worst); defaults to 1 when absent.
    pub emission_level: Option<u8>,
}

/// Weather-driven exclusion of devices on one day.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeatherExclusionConfig {
    /// 1-based day index within the horizon.
    pub day: u32,
    /// Device ids excluded on that day.
    pub devices: Vec<String>,
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"household.price_per_kwh"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

fn baseline_devices() -> Vec<DeviceConfig> {
    let entry = |id: &str,
                 name: &str,
                 wattage: f64,
                 priority: u8,
                 frequency: Frequency,
                 kind: DeviceKind,
                 hours_per_day: f64,
                 emission_level: u8| DeviceConfig {
        id: id.to_string(),
        name: name.to_string(),
        wattage,
        priority,
        frequency,
        kind,
        hours_per_day,
        emission_level: Some(emission_level),
    };
    vec![
        entry(
            "fridge",
            "Refrigerator",
            150.0,
            5,
            Frequency::Daily,
            DeviceKind::Refrigeration,
            24.0,
            2,
        ),
        entry(
            "washer",
            "Washing machine",
            800.0,
            3,
            Frequency::Frequently,
            DeviceKind::General,
            1.5,
            3,
        ),
        entry(
            "dishwasher",
            "Dishwasher",
            1200.0,
            3,
            Frequency::Daily,
            DeviceKind::General,
            1.5,
            3,
        ),
        entry(
            "ac",
            "Air conditioner",
            2000.0,
            4,
            Frequency::Daily,
            DeviceKind::General,
            6.0,
            5,
        ),
        entry(
            "tv",
            "Living room TV",
            120.0,
            2,
            Frequency::Daily,
            DeviceKind::General,
            4.0,
            1,
        ),
        entry(
            "console",
            "Game console",
            180.0,
            1,
            Frequency::Weekends,
            DeviceKind::General,
            3.0,
            2,
        ),
    ]
}

impl ScenarioConfig {
    /// Returns the baseline scenario: a six-device household with a
    /// moderate budget.
    pub fn baseline() -> Self {
        Self {
            household: HouseholdConfig::default(),
            budget: BudgetConfig::default(),
            devices: baseline_devices(),
            weather_exclusions: Vec::new(),
        }
    }

    /// Returns the tight-budget preset: the baseline fleet against a
    /// budget well below its typical spend.
    pub fn tight_budget() -> Self {
        Self {
            budget: BudgetConfig {
                monthly_limit: 35.0,
                avg_monthly_cost: 40.0,
                preferred_monthly: 32.0,
            },
            ..Self::baseline()
        }
    }

    /// Returns the high-impact preset: a polluter-heavy fleet where the
    /// Eco plan has real work to do.
    pub fn high_impact() -> Self {
        let mut cfg = Self::baseline();
        cfg.budget = BudgetConfig {
            monthly_limit: 110.0,
            avg_monthly_cost: 120.0,
            preferred_monthly: 100.0,
        };
        cfg.devices.push(DeviceConfig {
            id: "heater".to_string(),
            name: "Space heater".to_string(),
            wattage: 2500.0,
            priority: 3,
            frequency: Frequency::Daily,
            kind: DeviceKind::General,
            hours_per_day: 5.0,
            emission_level: Some(5),
        });
        cfg.devices.push(DeviceConfig {
            id: "dryer".to_string(),
            name: "Tumble dryer".to_string(),
            wattage: 2400.0,
            priority: 2,
            frequency: Frequency::Frequently,
            kind: DeviceKind::General,
            hours_per_day: 1.0,
            emission_level: Some(4),
        });
        cfg
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "tight_budget", "high_impact"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "tight_budget" => Ok(Self::tight_budget()),
            "high_impact" => Ok(Self::high_impact()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is
    /// invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown
    /// fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.household.price_per_kwh <= 0.0 {
            errors.push(ConfigError {
                field: "household.price_per_kwh".into(),
                message: "must be > 0".into(),
            });
        }

        let b = &self.budget;
        for (field, value) in [
            ("budget.monthly_limit", b.monthly_limit),
            ("budget.avg_monthly_cost", b.avg_monthly_cost),
            ("budget.preferred_monthly", b.preferred_monthly),
        ] {
            if value < 0.0 {
                errors.push(ConfigError {
                    field: field.into(),
                    message: "must be >= 0".into(),
                });
            }
        }

        if self.devices.is_empty() {
            errors.push(ConfigError {
                field: "device".into(),
                message: "at least one device is required".into(),
            });
        }

        for (i, d) in self.devices.iter().enumerate() {
            if d.wattage <= 0.0 {
                errors.push(ConfigError {
                    field: format!("device[{i}].wattage"),
                    message: "must be > 0".into(),
                });
            }
            if !(1..=5).contains(&d.priority) {
                errors.push(ConfigError {
                    field: format!("device[{i}].priority"),
                    message: "must be in 1..=5".into(),
                });
            }
            if !(0.0..=24.0).contains(&d.hours_per_day) {
                errors.push(ConfigError {
                    field: format!("device[{i}].hours_per_day"),
                    message: "must be in [0, 24]".into(),
                });
            }
            if let Some(level) = d.emission_level {
                if !(1..=5).contains(&level) {
                    errors.push(ConfigError {
                        field: format!("device[{i}].emission_level"),
                        message: "must be in 1..=5".into(),
                    });
                }
            }
            if self.devices[..i].iter().any(|other| other.id == d.id) {
                errors.push(ConfigError {
                    field: format!("device[{i}].id"),
                    message: format!("duplicate device id \"{}\"", d.id),
                });
            }
        }

        for (i, ex) in self.weather_exclusions.iter().enumerate() {
            if !(1..=HORIZON_DAYS).contains(&ex.day) {
                errors.push(ConfigError {
                    field: format!("weather_exclusion[{i}].day"),
                    message: format!("must be in 1..={HORIZON_DAYS}"),
                });
            }
            for id in &ex.devices {
                if !self.devices.iter().any(|d| &d.id == id) {
                    errors.push(ConfigError {
                        field: format!("weather_exclusion[{i}].devices"),
                        message: format!("unknown device id \"{id}\""),
                    });
                }
            }
        }

        errors
    }

    /// Materializes the device fleet for the engine.
    pub fn fleet(&self) -> Vec<Device> {
        self.devices
            .iter()
            .map(|d| Device {
                id: d.id.clone(),
                name: d.name.clone(),
                wattage: d.wattage,
                priority: d.priority,
                frequency: d.frequency,
                kind: d.kind,
                hours_per_day: d.hours_per_day,
            })
            .collect()
    }

    /// Materializes the emission-level map for the engine.
    pub fn emissions(&self) -> EmissionLevels {
        let mut levels = EmissionLevels::none();
        for d in &self.devices {
            if let Some(level) = d.emission_level {
                levels.set(d.id.clone(), level);
            }
        }
        levels
    }

    /// Materializes the weather-exclusion map for the engine.
    pub fn exclusions(&self) -> WeatherExclusions {
        let mut exclusions = WeatherExclusions::none();
        for ex in &self.weather_exclusions {
            for id in &ex.devices {
                exclusions.exclude(ex.day, id.clone());
            }
        }
        exclusions
    }

    /// Horizon start date: the configured one, or today.
    pub fn start_date(&self) -> NaiveDate {
        self.household
            .start_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}
