//! Drives the day classifier and budget allocator across the horizon to
//! build the Cost plan, and owns the rollup helpers shared by all plan
//! variants.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::device::{Device, InputError, validate_fleet};
use crate::plan::allocator::allocate_budget;
use crate::plan::calendar::{HORIZON_DAYS, date_of, is_weekend, runs_on_day};
use crate::plan::cost::{energy_kwh, round_cost, round_kwh};
use crate::plan::types::{DaySchedule, DeviceHours, Plan, PlanKind, WeatherExclusions};

/// Per-day spending ceiling: the monthly figure spread evenly over the
/// horizon.
pub fn daily_budget_of(monthly: f64) -> f64 {
    monthly / f64::from(HORIZON_DAYS)
}

/// Sums day totals into `(total_monthly_cost, total_monthly_kwh)`.
pub fn roll_up(schedule: &[DaySchedule]) -> (f64, f64) {
    let cost = round_cost(schedule.iter().map(|d| d.total_cost).sum());
    let kwh = round_kwh(schedule.iter().map(|d| d.total_kwh).sum());
    (cost, kwh)
}

/// Builds the 30-day Cost plan.
///
/// Each day, devices ineligible by frequency class or weather exclusion
/// sit out with zero hours; the budget allocator splits
/// `monthly_budget / 30` across the rest.
///
/// # Errors
///
/// Returns an `InputError` for a malformed fleet, non-positive price, or
/// negative `monthly_budget`.
pub fn generate_cost_plan(
    devices: &[Device],
    monthly_budget: f64,
    price_per_kwh: f64,
    exclusions: &WeatherExclusions,
    start_date: NaiveDate,
) -> Result<Plan, InputError> {
    validate_fleet(devices, price_per_kwh)?;
    if monthly_budget < 0.0 {
        return Err(InputError::new(
            "monthly_budget",
            format!("must be >= 0, got {monthly_budget}"),
        ));
    }

    let daily_budget = daily_budget_of(monthly_budget);
    let mut schedule = Vec::with_capacity(HORIZON_DAYS as usize);

    for day_number in 1..=HORIZON_DAYS {
        let eligible: Vec<Device> = devices
            .iter()
            .filter(|d| {
                runs_on_day(d.frequency, start_date, day_number)
                    && !exclusions.is_excluded(day_number, &d.id)
            })
            .cloned()
            .collect();

        let mut granted: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        if !eligible.is_empty() {
            let allocation = allocate_budget(&eligible, daily_budget, price_per_kwh)?;
            for entry in allocation.entries {
                granted.insert(entry.device_id, (entry.hours, entry.cost));
            }
        }

        let entries: Vec<DeviceHours> = devices
            .iter()
            .map(|d| {
                let (hours, cost) = granted.get(&d.id).copied().unwrap_or((0.0, 0.0));
                DeviceHours {
                    device_id: d.id.clone(),
                    wattage: d.wattage,
                    priority: d.priority,
                    hours,
                    kwh: round_kwh(energy_kwh(d.wattage, hours)),
                    cost,
                    emission_level: 1,
                }
            })
            .collect();

        let total_cost = round_cost(entries.iter().map(|e| e.cost).sum());
        let total_kwh = round_kwh(entries.iter().map(|e| e.kwh).sum());
        let date = date_of(start_date, day_number);
        schedule.push(DaySchedule {
            day_number,
            date,
            is_weekend: is_weekend(date),
            devices: entries,
            total_cost,
            total_kwh,
        });
    }

    let (total_monthly_cost, total_monthly_kwh) = roll_up(&schedule);
    Ok(Plan {
        kind: PlanKind::Cost,
        start_date,
        daily_budget,
        price_per_kwh,
        schedule,
        total_monthly_cost,
        total_monthly_kwh,
    })
}
