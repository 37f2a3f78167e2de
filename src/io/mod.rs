//! Output formats for computed plans.

/// CSV export of plan schedules.
pub mod export;
