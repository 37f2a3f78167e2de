//! Budget-constrained hour allocation for a single day.
//!
//! Three phases, in order: minimum-viable reservation for continuous
//! (refrigeration-class) devices, priority-weighted fill for everything
//! else, then top-up of the reserved devices with whatever budget is left.
//! Devices the budget never reaches are still recorded, with zero hours.

use crate::device::{Device, InputError, validate_fleet};
use crate::plan::cost::{floor_hours, round_cost, round_hours, running_cost};

/// Fixed minimum reservation for continuous-operation devices, in hours.
pub const CONTINUOUS_MIN_HOURS: f64 = 4.0;

/// Grants below this are not worth scheduling and collapse to zero.
pub const MIN_GRANT_HOURS: f64 = 0.1;

/// Hours and cost granted to one device by [`allocate_budget`].
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceAllocation {
    /// Device identifier.
    pub device_id: String,
    /// Granted runtime in hours (1 decimal).
    pub hours: f64,
    /// Projected cost of the granted runtime (2 decimals).
    pub cost: f64,
}

/// One day's allocation: every input device, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetAllocation {
    /// Per-device grants, exactly one per input device.
    pub entries: Vec<DeviceAllocation>,
}

impl BudgetAllocation {
    /// Looks up the grant for a device id.
    pub fn get(&self, device_id: &str) -> Option<&DeviceAllocation> {
        self.entries.iter().find(|e| e.device_id == device_id)
    }

    /// Sum of all grant costs (2 decimals).
    pub fn total_cost(&self) -> f64 {
        round_cost(self.entries.iter().map(|e| e.cost).sum())
    }
}

/// Result of the post-hoc budget check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetCheck {
    /// Whether the allocation respects the budget (within rounding).
    pub valid: bool,
    /// Summed allocation cost (2 decimals).
    pub total_cost: f64,
}

/// Rounding tolerance for the budget bound: one cent.
const BUDGET_EPSILON: f64 = 0.01;

/// Allocates daily runtime hours to a device fleet under a spending cap.
///
/// Guarantees: every input device appears exactly once in the result (in
/// input order), summed cost stays within `daily_budget` plus rounding
/// tolerance, and no device exceeds its `hours_per_day`. A budget too
/// small for anything yields zero-hour grants, not an error.
///
/// # Errors
///
/// Returns an `InputError` for an empty fleet, non-positive wattage,
/// priority outside 1–5, `hours_per_day` outside [0, 24], negative
/// budget, or non-positive price. Nothing is allocated on error.
pub fn allocate_budget(
    devices: &[Device],
    daily_budget: f64,
    price_per_kwh: f64,
) -> Result<BudgetAllocation, InputError> {
    validate_fleet(devices, price_per_kwh)?;
    if daily_budget < 0.0 {
        return Err(InputError::new(
            "daily_budget",
            format!("must be >= 0, got {daily_budget}"),
        ));
    }

    let mut hours = vec![0.0_f64; devices.len()];
    let mut costs = vec![0.0_f64; devices.len()];
    let mut remaining = daily_budget;

    // Phase 1: minimum-viable reservation for continuous devices.
    for (i, d) in devices.iter().enumerate() {
        if !d.requires_continuous_operation() {
            continue;
        }
        let min_hours = floor_hours(CONTINUOUS_MIN_HOURS.min(d.hours_per_day));
        let min_cost = round_cost(running_cost(d.wattage, min_hours, price_per_kwh));
        if min_cost <= remaining {
            hours[i] = min_hours;
            costs[i] = min_cost;
            remaining -= min_cost;
        } else {
            // Partial reservation: the maximum affordable fraction of the
            // minimum, and this device drains the rest of the budget.
            let affordable = remaining * 1000.0 / (d.wattage * price_per_kwh);
            let granted = floor_hours(affordable.min(min_hours));
            hours[i] = granted;
            costs[i] = round_cost(running_cost(d.wattage, granted, price_per_kwh));
            remaining = 0.0;
        }
    }

    // Phase 2: priority-weighted fill. Non-reserved devices first, then
    // top-up of the continuous ones; within each group, highest priority
    // wins and lower wattage breaks ties (fewer watts per unit of budget).
    let mut order: Vec<usize> = (0..devices.len()).collect();
    order.sort_by(|&a, &b| {
        let da = &devices[a];
        let db = &devices[b];
        da.requires_continuous_operation()
            .cmp(&db.requires_continuous_operation())
            .then(db.priority.cmp(&da.priority))
            .then(da.wattage.total_cmp(&db.wattage))
    });

    for &i in &order {
        if remaining <= 0.0 {
            break;
        }
        let d = &devices[i];
        let headroom = d.hours_per_day - hours[i];
        if headroom <= 0.0 {
            continue;
        }
        let affordable = remaining * 1000.0 / (d.wattage * price_per_kwh);
        let grant = floor_hours(affordable.min(headroom));
        if grant < MIN_GRANT_HOURS {
            continue;
        }
        let grant_cost = round_cost(running_cost(d.wattage, grant, price_per_kwh));
        hours[i] = round_hours(hours[i] + grant);
        costs[i] = round_cost(costs[i] + grant_cost);
        remaining -= grant_cost;
    }

    // Phase 3: completion — untouched devices keep their explicit zeros.
    let entries = devices
        .iter()
        .enumerate()
        .map(|(i, d)| DeviceAllocation {
            device_id: d.id.clone(),
            hours: hours[i],
            cost: costs[i],
        })
        .collect();

    Ok(BudgetAllocation { entries })
}

/// Post-hoc check that an allocation respects the budget.
///
/// Used by callers and tests; the allocator is expected to already
/// satisfy the bound, so this is a verification step, not a retry hook.
pub fn validate_budget(allocation: &BudgetAllocation, daily_budget: f64) -> BudgetCheck {
    let total_cost = allocation.total_cost();
    BudgetCheck {
        valid: total_cost <= daily_budget + BUDGET_EPSILON,
        total_cost,
    }
}
