//! Household energy-usage planner: 30-day Cost, Eco, and Comfort device
//! schedules from a budget-constrained greedy allocator.

#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod device;
pub mod io;
/// Allocation engine, day classification, and plan assembly modules.
pub mod plan;
