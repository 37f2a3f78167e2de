//! Energy and cost conversions shared by every plan variant.

/// Converts a wattage and runtime to energy in kWh.
///
/// # Examples
///
/// ```
/// use wattplan::plan::cost::energy_kwh;
///
/// assert_eq!(energy_kwh(1500.0, 4.0), 6.0);
/// ```
pub fn energy_kwh(wattage_w: f64, hours: f64) -> f64 {
    wattage_w / 1000.0 * hours
}

/// Projected cost of running a device for `hours` at the given tariff.
pub fn running_cost(wattage_w: f64, hours: f64, price_per_kwh: f64) -> f64 {
    energy_kwh(wattage_w, hours) * price_per_kwh
}

/// Rounds an hour value to 1 decimal place, half-up.
pub fn round_hours(hours: f64) -> f64 {
    (hours * 10.0).round() / 10.0
}

/// Floors an hour value to 1 decimal place.
///
/// Used for budget-derived grants: half-up rounding could push a grant's
/// cost past the remaining budget, flooring never can.
pub fn floor_hours(hours: f64) -> f64 {
    (hours * 10.0).floor() / 10.0
}

/// Rounds a monetary value to 2 decimal places, half-up.
pub fn round_cost(cost: f64) -> f64 {
    (cost * 100.0).round() / 100.0
}

/// Rounds an energy value to 2 decimal places, half-up.
pub fn round_kwh(kwh: f64) -> f64 {
    (kwh * 100.0).round() / 100.0
}
