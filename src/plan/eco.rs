//! Eco plan generation: emission-driven hour reduction plus a
//! priority-dependent trim pass when a day still exceeds its budget.

use chrono::NaiveDate;
use tracing::warn;

use crate::device::{Device, InputError, validate_fleet};
use crate::plan::assembler::{daily_budget_of, roll_up};
use crate::plan::calendar::{HORIZON_DAYS, date_of, is_weekend, runs_on_day};
use crate::plan::cost::{energy_kwh, floor_hours, round_cost, round_hours, round_kwh, running_cost};
use crate::plan::types::{
    DaySchedule, DeviceHours, EcoPlan, EmissionLevels, Plan, PlanKind, WeatherExclusions,
};

/// Safety cap on the per-day trim loop. Hitting it means the budget is
/// infeasible for the day; the partially-trimmed schedule is still used.
const MAX_TRIM_ITERATIONS: u32 = 100;

/// Hour-reduction fraction for an emission level.
///
/// Fixed table: the worst polluters lose the most runtime. Levels outside
/// 1–5 reduce nothing.
pub fn emission_reduction(level: u8) -> f64 {
    match level {
        5 => 0.30,
        4 => 0.20,
        3 => 0.15,
        2 => 0.10,
        1 => 0.05,
        _ => 0.0,
    }
}

/// Trim fraction applied per iteration to the day's most expensive device.
///
/// Must-run devices shrink gently, optional ones aggressively.
fn trim_fraction(priority: u8) -> f64 {
    match priority {
        5 => 0.10,
        4 => 0.15,
        3 => 0.20,
        2 => 0.30,
        _ => 0.50,
    }
}

/// Builds the 30-day Eco plan.
///
/// Each day starts every eligible device at its emission-reduced hours
/// (`hours_per_day × (1 − reduction)`); if the day's total cost still
/// exceeds `avg_monthly_cost / 30`, the trim pass repeatedly shrinks the
/// most expensive device until the day fits or the iteration cap is hit.
/// Capped days are reported in `infeasible_days` and logged — they are
/// not errors.
///
/// # Errors
///
/// Returns an `InputError` for a malformed fleet, non-positive price, or
/// negative `avg_monthly_cost`.
pub fn generate_eco_plan(
    devices: &[Device],
    avg_monthly_cost: f64,
    price_per_kwh: f64,
    exclusions: &WeatherExclusions,
    emissions: &EmissionLevels,
    start_date: NaiveDate,
) -> Result<EcoPlan, InputError> {
    validate_fleet(devices, price_per_kwh)?;
    if avg_monthly_cost < 0.0 {
        return Err(InputError::new(
            "avg_monthly_cost",
            format!("must be >= 0, got {avg_monthly_cost}"),
        ));
    }

    let daily_budget = daily_budget_of(avg_monthly_cost);
    let mut schedule = Vec::with_capacity(HORIZON_DAYS as usize);
    let mut infeasible_days = Vec::new();
    let mut reduction_sum = 0.0_f64;
    let mut reduction_count = 0_u64;

    for day_number in 1..=HORIZON_DAYS {
        let mut entries: Vec<DeviceHours> = devices
            .iter()
            .map(|d| {
                let level = emissions.level(&d.id);
                let eligible = runs_on_day(d.frequency, start_date, day_number)
                    && !exclusions.is_excluded(day_number, &d.id);
                let hours = if eligible {
                    let reduction = emission_reduction(level);
                    reduction_sum += reduction;
                    reduction_count += 1;
                    round_hours(d.hours_per_day * (1.0 - reduction))
                } else {
                    0.0
                };
                DeviceHours {
                    device_id: d.id.clone(),
                    wattage: d.wattage,
                    priority: d.priority,
                    hours,
                    kwh: round_kwh(energy_kwh(d.wattage, hours)),
                    cost: round_cost(running_cost(d.wattage, hours, price_per_kwh)),
                    emission_level: level,
                }
            })
            .collect();

        if !trim_to_budget(&mut entries, daily_budget, price_per_kwh) {
            warn!(
                day_number,
                daily_budget, "trim cap reached, day remains over budget"
            );
            infeasible_days.push(day_number);
        }

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
    let avg_emission_reduction_pct = if reduction_count == 0 {
        0
    } else {
        (reduction_sum / reduction_count as f64 * 100.0).round() as u8
    };

    Ok(EcoPlan {
        plan: Plan {
            kind: PlanKind::Eco,
            start_date,
            daily_budget,
            price_per_kwh,
            schedule,
            total_monthly_cost,
            total_monthly_kwh,
        },
        avg_emission_reduction_pct,
        infeasible_days,
    })
}

/// Shrinks the most expensive device until the day fits the budget.
///
/// Returns `false` when the iteration cap was reached with the day still
/// over budget.
fn trim_to_budget(entries: &mut [DeviceHours], daily_budget: f64, price_per_kwh: f64) -> bool {
    for _ in 0..MAX_TRIM_ITERATIONS {
        let total: f64 = entries.iter().map(|e| e.cost).sum();
        if round_cost(total) <= daily_budget {
            return true;
        }

        let Some(target) = entries
            .iter_mut()
            .filter(|e| e.cost > 0.0)
            .max_by(|a, b| a.cost.total_cmp(&b.cost))
        else {
            return true;
        };

        let trimmed = floor_hours(target.hours * (1.0 - trim_fraction(target.priority)));
        target.hours = trimmed;
        target.kwh = round_kwh(energy_kwh(target.wattage, trimmed));
        target.cost = round_cost(running_cost(target.wattage, trimmed, price_per_kwh));
    }

    let total: f64 = entries.iter().map(|e| e.cost).sum();
    round_cost(total) <= daily_budget
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceKind, Frequency};

    fn start() -> NaiveDate {
        // 2026-08-03 is a Monday
        NaiveDate::from_ymd_opt(2026, 8, 3).expect("valid date")
    }

    fn device(id: &str, wattage: f64, priority: u8, hours_per_day: f64) -> Device {
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

    #[test]
    fn reduction_table_matches_levels() {
        assert_eq!(emission_reduction(5), 0.30);
        assert_eq!(emission_reduction(4), 0.20);
        assert_eq!(emission_reduction(3), 0.15);
        assert_eq!(emission_reduction(2), 0.10);
        assert_eq!(emission_reduction(1), 0.05);
        assert_eq!(emission_reduction(0), 0.0);
        assert_eq!(emission_reduction(9), 0.0);
    }

    #[test]
    fn worst_polluter_never_exceeds_seventy_percent() {
        let devices = vec![device("heater", 1000.0, 3, 10.0)];
        let mut emissions = EmissionLevels::none();
        emissions.set("heater", 5);

        // Generous budget so no trimming interferes.
        let eco = generate_eco_plan(
            &devices,
            300.0,
            0.20,
            &WeatherExclusions::none(),
            &emissions,
            start(),
        )
        .expect("valid input");

        for day in &eco.plan.schedule {
            let h = day.devices[0].hours;
            assert!(h <= 7.0, "day {}: {h} h exceeds 70%", day.day_number);
            assert_eq!(h, 7.0); // 10 h × (1 − 0.30)
        }
        assert_eq!(eco.avg_emission_reduction_pct, 30);
    }

    #[test]
    fn unknown_devices_default_to_level_one() {
        let devices = vec![device("lamp", 60.0, 2, 4.0)];
        let eco = generate_eco_plan(
            &devices,
            60.0,
            0.20,
            &WeatherExclusions::none(),
            &EmissionLevels::none(),
            start(),
        )
        .expect("valid input");

        let first = &eco.plan.schedule[0].devices[0];
        assert_eq!(first.emission_level, 1);
        assert_eq!(first.hours, 3.8); // 4 h × 0.95
        assert_eq!(eco.avg_emission_reduction_pct, 5);
    }

    #[test]
    fn weather_excluded_device_sits_out_that_day_only() {
        let devices = vec![device("ac", 2000.0, 4, 6.0)];
        let mut exclusions = WeatherExclusions::none();
        exclusions.exclude(2, "ac");

        let eco = generate_eco_plan(
            &devices,
            300.0,
            0.20,
            &exclusions,
            &EmissionLevels::none(),
            start(),
        )
        .expect("valid input");

        assert_eq!(eco.plan.schedule[1].devices[0].hours, 0.0);
        assert!(eco.plan.schedule[0].devices[0].hours > 0.0);
        assert!(eco.plan.schedule[2].devices[0].hours > 0.0);
    }

    #[test]
    fn frequency_gating_applies() {
        let devices = vec![device("mower", 1200.0, 2, 1.0)];
        let mut fleet = devices;
        fleet[0].frequency = Frequency::Rarely;

        let eco = generate_eco_plan(
            &fleet,
            300.0,
            0.20,
            &WeatherExclusions::none(),
            &EmissionLevels::none(),
            start(),
        )
        .expect("valid input");

        let active_days: Vec<u32> = eco
            .plan
            .schedule
            .iter()
            .filter(|d| d.devices[0].hours > 0.0)
            .map(|d| d.day_number)
            .collect();
        assert_eq!(active_days, vec![1, 11, 21]);
    }

    #[test]
    fn trim_pass_brings_day_under_budget() {
        // Untrimmed: 10 h × 2 kW × 0.20 = 4.00/day against a 1.00 budget.
        let devices = vec![device("heater", 2000.0, 1, 10.0)];
        let eco = generate_eco_plan(
            &devices,
            30.0,
            0.20,
            &WeatherExclusions::none(),
            &EmissionLevels::none(),
            start(),
        )
        .expect("valid input");

        assert!(eco.infeasible_days.is_empty());
        for day in &eco.plan.schedule {
            assert!(
                day.total_cost <= 1.0 + 1e-9,
                "day {} over budget: {}",
                day.day_number,
                day.total_cost
            );
        }
    }

    #[test]
    fn zero_budget_collapses_hours_within_the_cap() {
        let devices = vec![device("heater", 2000.0, 5, 10.0)];
        let eco = generate_eco_plan(
            &devices,
            0.0,
            0.20,
            &WeatherExclusions::none(),
            &EmissionLevels::none(),
            start(),
        )
        .expect("valid input");

        // Priority 5 trims 10% per iteration; 100 iterations collapse the
        // hours to zero, so every day lands exactly on the zero budget.
        for day in &eco.plan.schedule {
            assert_eq!(day.total_cost, 0.0);
        }
        assert!(eco.infeasible_days.is_empty());
    }

    #[test]
    fn trim_cap_reports_infeasible_days() {
        // Four heavy must-run devices against a near-zero budget: the
        // gentle 10% priority-5 trim cannot empty all of them within the
        // iteration cap, so every day is reported infeasible while the
        // partially-trimmed schedule is still returned.
        let devices = vec![
            device("h1", 2000.0, 5, 24.0),
            device("h2", 2000.0, 5, 24.0),
            device("h3", 2000.0, 5, 24.0),
            device("h4", 2000.0, 5, 24.0),
        ];
        let eco = generate_eco_plan(
            &devices,
            0.30,
            0.20,
            &WeatherExclusions::none(),
            &EmissionLevels::none(),
            start(),
        )
        .expect("valid input");

        assert_eq!(eco.infeasible_days.len(), 30);
        assert!(eco.plan.schedule[0].total_cost > 0.01);
    }

    #[test]
    fn monthly_totals_sum_days() {
        let devices = vec![device("tv", 120.0, 2, 5.0)];
        let eco = generate_eco_plan(
            &devices,
            60.0,
            0.20,
            &WeatherExclusions::none(),
            &EmissionLevels::none(),
            start(),
        )
        .expect("valid input");

        let cost_sum: f64 = eco.plan.schedule.iter().map(|d| d.total_cost).sum();
        assert!((eco.plan.total_monthly_cost - cost_sum).abs() < 1e-9);
        assert_eq!(eco.plan.schedule.len(), 30);
    }

    #[test]
    fn negative_average_cost_rejected() {
        let devices = vec![device("tv", 120.0, 2, 5.0)];
        let err = generate_eco_plan(
            &devices,
            -1.0,
            0.20,
            &WeatherExclusions::none(),
            &EmissionLevels::none(),
            start(),
        )
        .unwrap_err();
        assert_eq!(err.field, "avg_monthly_cost");
    }

    #[test]
    fn eco_plan_is_deterministic() {
        let devices = vec![
            device("heater", 2000.0, 3, 8.0),
            device("tv", 120.0, 1, 5.0),
        ];
        let mut emissions = EmissionLevels::none();
        emissions.set("heater", 4);

        let a = generate_eco_plan(
            &devices,
            45.0,
            0.22,
            &WeatherExclusions::none(),
            &emissions,
            start(),
        )
        .expect("valid input");
        let b = generate_eco_plan(
            &devices,
            45.0,
            0.22,
            &WeatherExclusions::none(),
            &emissions,
            start(),
        )
        .expect("valid input");
        assert_eq!(a, b);
    }
}
