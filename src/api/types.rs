//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::plan::cost::round_cost;
use crate::plan::types::Plan;

/// Compact per-plan summary for the plan listing endpoint.
#[derive(Debug, Serialize)]
pub struct PlanSummary {
    /// Plan kind name (`cost`, `eco`, or `comfort`).
    pub kind: String,
    /// Monthly cost total.
    pub total_monthly_cost: f64,
    /// Monthly energy total (kWh).
    pub total_monthly_kwh: f64,
    /// Per-day spending ceiling the plan was built against.
    pub daily_budget: f64,
    /// Spend delta against the household's average monthly cost.
    pub projected_savings: f64,
}

impl PlanSummary {
    /// Builds a summary from a plan and the household's average monthly
    /// cost.
    pub fn new(plan: &Plan, avg_monthly_cost: f64) -> Self {
        Self {
            kind: plan.kind.as_str().to_string(),
            total_monthly_cost: plan.total_monthly_cost,
            total_monthly_kwh: plan.total_monthly_kwh,
            daily_budget: plan.daily_budget,
            projected_savings: round_cost(avg_monthly_cost - plan.total_monthly_cost),
        }
    }
}

/// Optional day-range query parameters for the schedule endpoint.
#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    /// Start day number (inclusive).
    pub from: Option<u32>,
    /// End day number (inclusive).
    pub to: Option<u32>,
}

/// Error response body for 4xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
