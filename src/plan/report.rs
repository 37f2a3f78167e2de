//! Post-hoc summary metrics for a computed plan.

use std::fmt;

use crate::plan::cost::round_cost;
use crate::plan::types::{Plan, PlanKind};

/// Aggregate metrics derived from a complete plan.
///
/// Computed post-hoc from the finished schedule so reported figures always
/// agree with the per-day data.
#[derive(Debug, Clone)]
pub struct PlanReport {
    /// Which plan the report describes.
    pub kind: PlanKind,
    /// Monthly cost total.
    pub total_monthly_cost: f64,
    /// Monthly energy total (kWh).
    pub total_monthly_kwh: f64,
    /// Mean cost per day across the horizon.
    pub avg_daily_cost: f64,
    /// Most expensive day's cost.
    pub peak_day_cost: f64,
    /// 1-based index of the most expensive day (0 when the plan is empty).
    pub peak_day_number: u32,
    /// Device-days with non-zero hours.
    pub active_device_days: usize,
    /// Device-days recorded with zero hours (ineligible or unfunded).
    pub idle_device_days: usize,
    /// Spend delta against the household's historical average monthly
    /// cost; positive means the plan saves money.
    pub projected_savings: f64,
}

impl PlanReport {
    /// Computes all metrics from a finished plan.
    pub fn from_plan(plan: &Plan, avg_monthly_cost: f64) -> Self {
        let days = plan.schedule.len();
        let mut peak_day_cost = 0.0_f64;
        let mut peak_day_number = 0_u32;
        let mut active = 0_usize;
        let mut idle = 0_usize;

        for day in &plan.schedule {
            if day.total_cost > peak_day_cost {
                peak_day_cost = day.total_cost;
                peak_day_number = day.day_number;
            }
            for device in &day.devices {
                if device.hours > 0.0 {
                    active += 1;
                } else {
                    idle += 1;
                }
            }
        }

        let avg_daily_cost = if days > 0 {
            round_cost(plan.total_monthly_cost / days as f64)
        } else {
            0.0
        };

        Self {
            kind: plan.kind,
            total_monthly_cost: plan.total_monthly_cost,
            total_monthly_kwh: plan.total_monthly_kwh,
            avg_daily_cost,
            peak_day_cost,
            peak_day_number,
            active_device_days: active,
            idle_device_days: idle,
            projected_savings: round_cost(avg_monthly_cost - plan.total_monthly_cost),
        }
    }
}

impl fmt::Display for PlanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- {} plan ---", self.kind)?;
        writeln!(f, "Monthly cost:        {:.2}", self.total_monthly_cost)?;
        writeln!(f, "Monthly energy:      {:.2} kWh", self.total_monthly_kwh)?;
        writeln!(f, "Average daily cost:  {:.2}", self.avg_daily_cost)?;
        writeln!(
            f,
            "Peak day:            day {} ({:.2})",
            self.peak_day_number, self.peak_day_cost
        )?;
        writeln!(
            f,
            "Device-days:         {} active, {} idle",
            self.active_device_days, self.idle_device_days
        )?;
        write!(f, "Projected savings:   {:.2}", self.projected_savings)
    }
}
