//! Comfort plan generation: a priority-aware blend of an already-built
//! Cost plan and Eco plan.
//!
//! High-priority devices lean toward the Cost plan's hours (availability
//! favored), low-priority devices toward the Eco plan's. The binding
//! contract is that the blended plan's monthly cost stays inside the
//! envelope spanned by the two source plans; when the biased blend drifts
//! outside, every device-day is interpolated toward the far plan by the
//! closed-form factor that lands the total back inside.

use tracing::debug;

use crate::device::InputError;
use crate::plan::assembler::{daily_budget_of, roll_up};
use crate::plan::cost::{energy_kwh, round_cost, round_hours, round_kwh, running_cost};
use crate::plan::types::{DaySchedule, DeviceHours, Plan, PlanKind};

/// Cost-plan weight for devices at or above the priority threshold.
const COST_BIAS_HIGH: f64 = 0.7;
/// Cost-plan weight for devices below the priority threshold.
const COST_BIAS_LOW: f64 = 0.3;
/// Priority at which a device starts leaning toward the Cost plan.
const HIGH_PRIORITY_THRESHOLD: u8 = 3;
/// Correction passes before snapping to the nearer bound plan.
const MAX_CORRECTION_PASSES: u32 = 8;
/// Fraction of the envelope kept as margin when correcting back inside,
/// so 1-decimal hour rounding cannot tip the total back out.
const CORRECTION_MARGIN: f64 = 0.05;
/// Envelopes narrower than this are degenerate; the blend collapses to
/// the nearer bound plan.
const DEGENERATE_ENVELOPE: f64 = 0.02;

/// Builds the Comfort plan from a finished Cost plan and Eco plan.
///
/// # Errors
///
/// Returns an `InputError` for non-positive price, negative budget
/// figures, or mismatched plan shapes (different horizons, days, or
/// device sequences).
pub fn generate_comfort_plan(
    cost_plan: &Plan,
    eco_plan: &Plan,
    avg_monthly_cost: f64,
    preferred_monthly_budget: f64,
    price_per_kwh: f64,
) -> Result<Plan, InputError> {
    if price_per_kwh <= 0.0 {
        return Err(InputError::new(
            "price_per_kwh",
            format!("must be > 0, got {price_per_kwh}"),
        ));
    }
    if avg_monthly_cost < 0.0 {
        return Err(InputError::new(
            "avg_monthly_cost",
            format!("must be >= 0, got {avg_monthly_cost}"),
        ));
    }
    if preferred_monthly_budget < 0.0 {
        return Err(InputError::new(
            "preferred_monthly_budget",
            format!("must be >= 0, got {preferred_monthly_budget}"),
        ));
    }
    check_shapes(cost_plan, eco_plan)?;

    // Biased per-device blend, kept as raw hours until the envelope check.
    let mut hours: Vec<Vec<f64>> = cost_plan
        .schedule
        .iter()
        .zip(&eco_plan.schedule)
        .map(|(cost_day, eco_day)| {
            cost_day
                .devices
                .iter()
                .zip(&eco_day.devices)
                .map(|(c, e)| {
                    let bias = if c.priority >= HIGH_PRIORITY_THRESHOLD {
                        COST_BIAS_HIGH
                    } else {
                        COST_BIAS_LOW
                    };
                    bias * c.hours + (1.0 - bias) * e.hours
                })
                .collect()
        })
        .collect();

    let lo_total = cost_plan.total_monthly_cost.min(eco_plan.total_monthly_cost);
    let hi_total = cost_plan.total_monthly_cost.max(eco_plan.total_monthly_cost);

    let mut schedule = build_schedule(&hours, cost_plan, eco_plan, price_per_kwh);
    let (mut total, _) = roll_up(&schedule);

    if (total < lo_total || total > hi_total) && hi_total - lo_total < DEGENERATE_ENVELOPE {
        // Degenerate envelope: both source plans cost the same; adopt the
        // nearer one wholesale.
        schedule = nearer_plan_by_total(cost_plan, eco_plan, total).schedule.clone();
    } else {
        let mut passes = 0;
        while (total < lo_total || total > hi_total) && passes < MAX_CORRECTION_PASSES {
            let margin = CORRECTION_MARGIN * (hi_total - lo_total);
            let (target, far_plan) = if total > hi_total {
                (hi_total - margin, nearer_plan_by_total(cost_plan, eco_plan, lo_total))
            } else {
                (lo_total + margin, nearer_plan_by_total(cost_plan, eco_plan, hi_total))
            };
            let far_total = far_plan.total_monthly_cost;
            if (total - far_total).abs() < f64::EPSILON {
                break;
            }
            let gamma = ((total - target) / (total - far_total)).clamp(0.0, 1.0);
            debug!(total, target, gamma, "correcting comfort blend into the cost envelope");

            for (day_hours, far_day) in hours.iter_mut().zip(&far_plan.schedule) {
                for (h, far_entry) in day_hours.iter_mut().zip(&far_day.devices) {
                    *h += gamma * (far_entry.hours - *h);
                }
            }
            schedule = build_schedule(&hours, cost_plan, eco_plan, price_per_kwh);
            total = roll_up(&schedule).0;
            passes += 1;
        }

        if total < lo_total || total > hi_total {
            schedule = nearer_plan_by_total(cost_plan, eco_plan, total).schedule.clone();
        }
    }

    let (total_monthly_cost, total_monthly_kwh) = roll_up(&schedule);
    Ok(Plan {
        kind: PlanKind::Comfort,
        start_date: cost_plan.start_date,
        daily_budget: daily_budget_of(preferred_monthly_budget),
        price_per_kwh,
        schedule,
        total_monthly_cost,
        total_monthly_kwh,
    })
}

/// The source plan whose monthly total is closest to `total`.
fn nearer_plan_by_total<'a>(cost_plan: &'a Plan, eco_plan: &'a Plan, total: f64) -> &'a Plan {
    if (cost_plan.total_monthly_cost - total).abs() <= (eco_plan.total_monthly_cost - total).abs() {
        cost_plan
    } else {
        eco_plan
    }
}

/// Materializes a rounded schedule from a raw hours matrix, copying day
/// and device metadata from the source plans.
fn build_schedule(
    hours: &[Vec<f64>],
    cost_plan: &Plan,
    eco_plan: &Plan,
    price_per_kwh: f64,
) -> Vec<DaySchedule> {
    hours
        .iter()
        .zip(&cost_plan.schedule)
        .zip(&eco_plan.schedule)
        .map(|((day_hours, cost_day), eco_day)| {
            let devices: Vec<DeviceHours> = day_hours
                .iter()
                .zip(&cost_day.devices)
                .zip(&eco_day.devices)
                .map(|((&h, c), e)| {
                    let h = round_hours(h.max(0.0));
                    DeviceHours {
                        device_id: c.device_id.clone(),
                        wattage: c.wattage,
                        priority: c.priority,
                        hours: h,
                        kwh: round_kwh(energy_kwh(c.wattage, h)),
                        cost: round_cost(running_cost(c.wattage, h, price_per_kwh)),
                        emission_level: e.emission_level,
                    }
                })
                .collect();
            let total_cost = round_cost(devices.iter().map(|d| d.cost).sum());
            let total_kwh = round_kwh(devices.iter().map(|d| d.kwh).sum());
            DaySchedule {
                day_number: cost_day.day_number,
                date: cost_day.date,
                is_weekend: cost_day.is_weekend,
                devices,
                total_cost,
                total_kwh,
            }
        })
        .collect()
}

/// Rejects plan pairs that do not describe the same fleet and horizon.
fn check_shapes(cost_plan: &Plan, eco_plan: &Plan) -> Result<(), InputError> {
    if cost_plan.schedule.len() != eco_plan.schedule.len() {
        return Err(InputError::new(
            "eco_plan.schedule",
            format!(
                "horizon mismatch: cost plan has {} days, eco plan {}",
                cost_plan.schedule.len(),
                eco_plan.schedule.len()
            ),
        ));
    }
    if cost_plan.start_date != eco_plan.start_date {
        return Err(InputError::new(
            "eco_plan.start_date",
            "plans cover different horizons".to_string(),
        ));
    }
    for (cost_day, eco_day) in cost_plan.schedule.iter().zip(&eco_plan.schedule) {
        if cost_day.devices.len() != eco_day.devices.len()
            || cost_day
                .devices
                .iter()
                .zip(&eco_day.devices)
                .any(|(c, e)| c.device_id != e.device_id)
        {
            return Err(InputError::new(
                format!("eco_plan.schedule[{}].devices", cost_day.day_number - 1),
                "device sequence differs between plans".to_string(),
            ));
        }
    }
    Ok(())
}
