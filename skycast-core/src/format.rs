//! Text formatting shared by front ends.

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::config::Units;

/// Rounded temperature with unit suffix, e.g. `"7°C"`.
pub fn temp(value: f64, units: Units) -> String {
    format!("{:.0}{}", value, units.temperature_suffix())
}

/// Probability in 0.0..=1.0 as a whole percentage, e.g. `"40%"`.
pub fn percent(p: f64) -> String {
    format!("{:.0}%", p * 100.0)
}

/// `"Fri, Mar 1"`.
pub fn day(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

/// Hour of day in the given zone, e.g. `"3PM"`.
pub fn hour<Tz: TimeZone>(dt: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    DateTime::from_timestamp(dt, 0)
        .unwrap_or_default()
        .with_timezone(tz)
        .format("%-I%p")
        .to_string()
}

/// Wind speed in the unit OpenWeather uses for `units`.
pub fn wind(speed: f64, units: Units) -> String {
    match units {
        Units::Imperial => format!("{speed:.1} mph"),
        Units::Metric | Units::Standard => format!("{speed:.1} m/s"),
    }
}

/// Visibility in metres rendered as kilometres.
pub fn visibility(metres: f64) -> String {
    format!("{:.1} km", metres / 1000.0)
}
