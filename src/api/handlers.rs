//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::AppState;
use super::types::{ErrorResponse, PlanSummary, ScheduleQuery};
use crate::plan::types::{Plan, PlanKind};

/// Returns a summary for every computed plan.
///
/// `GET /plans` → 200 + `Vec<PlanSummary>` JSON
pub async fn get_plans(State(state): State<Arc<AppState>>) -> Json<Vec<PlanSummary>> {
    Json(vec![
        PlanSummary::new(&state.cost, state.avg_monthly_cost),
        PlanSummary::new(&state.eco.plan, state.avg_monthly_cost),
        PlanSummary::new(&state.comfort, state.avg_monthly_cost),
    ])
}

/// Returns one plan in full.
///
/// `GET /plans/{kind}` → 200 + plan JSON (the eco plan carries its
/// emission metrics), or 404 + `ErrorResponse` for an unknown kind.
pub async fn get_plan(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Response {
    match PlanKind::parse(&kind) {
        Some(PlanKind::Cost) => Json(state.cost.clone()).into_response(),
        Some(PlanKind::Eco) => Json(state.eco.clone()).into_response(),
        Some(PlanKind::Comfort) => Json(state.comfort.clone()).into_response(),
        None => unknown_kind(&kind),
    }
}

/// Returns a plan's day schedules, optionally filtered by day range.
///
/// `GET /plans/{kind}/schedule` → 200 + `Vec<DaySchedule>` JSON
/// `GET /plans/{kind}/schedule?from=N&to=M` → filtered range (inclusive)
/// `GET /plans/{kind}/schedule?from=10&to=5` → 400 + `ErrorResponse`
pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(query): Query<ScheduleQuery>,
) -> Response {
    let Some(plan) = plan_by_kind(&state, &kind) else {
        return unknown_kind(&kind);
    };

    let from = query.from.unwrap_or(1);
    let to = query.to.unwrap_or(u32::MAX);
    if from > to {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        )
            .into_response();
    }

    let days: Vec<_> = plan
        .schedule
        .iter()
        .filter(|d| d.day_number >= from && d.day_number <= to)
        .cloned()
        .collect();
    Json(days).into_response()
}

fn plan_by_kind<'a>(state: &'a AppState, kind: &str) -> Option<&'a Plan> {
    match PlanKind::parse(kind)? {
        PlanKind::Cost => Some(&state.cost),
        PlanKind::Eco => Some(&state.eco.plan),
        PlanKind::Comfort => Some(&state.comfort),
    }
}

fn unknown_kind(kind: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("unknown plan kind \"{kind}\", expected cost, eco, or comfort"),
        }),
    )
        .into_response()
}
