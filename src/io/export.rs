//! CSV export for computed plan schedules.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::plan::types::Plan;

/// Schema v1 column header for CSV schedule export.
const HEADER: &str = "plan,day_number,date,is_weekend,device_id,priority,\
                      hours,kwh,cost,emission_level";

/// Exports plan schedules to a CSV file at the given path.
///
/// Writes a header row followed by one data row per device-day per plan,
/// using the schema v1 column layout. Produces deterministic output for
/// identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(plans: &[&Plan], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(plans, buf)
}

/// Writes plan schedules as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(plans: &[&Plan], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    // Header
    wtr.write_record(HEADER.split(',').map(str::trim))?;

    // Data rows
    for plan in plans {
        for day in &plan.schedule {
            for device in &day.devices {
                wtr.write_record(&[
                    plan.kind.as_str().to_string(),
                    day.day_number.to_string(),
                    day.date.to_string(),
                    day.is_weekend.to_string(),
                    device.device_id.clone(),
                    device.priority.to_string(),
                    format!("{:.1}", device.hours),
                    format!("{:.2}", device.kwh),
                    format!("{:.2}", device.cost),
                    device.emission_level.to_string(),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
