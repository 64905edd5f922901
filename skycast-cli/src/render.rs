use std::fmt::Write;

use chrono::Local;
use skycast_core::{
    CurrentConditions, DailySummary, LocationResult, Units, WeatherIcon, WeatherReport, format,
};

pub fn search_results(found: &[LocationResult]) -> String {
    if found.is_empty() {
        return "No matching places.\n".to_string();
    }

    let mut out = String::new();
    for (i, loc) in found.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {}  ({:.4}, {:.4})",
            i + 1,
            loc.display_name(),
            loc.lat,
            loc.lon
        );
    }
    out
}

pub fn report(report: &WeatherReport, units: Units) -> String {
    let mut out = String::new();
    let current = &report.current;
    let icon = current
        .weather
        .first()
        .map(|w| WeatherIcon::from_code(w.id))
        .unwrap_or_default();

    let _ = writeln!(out, "{}", report.city.display_name());
    let _ = writeln!(
        out,
        "{} {}  {}, feels like {}",
        icon.symbol(),
        format::temp(current.main.temp, units),
        current.summary(),
        format::temp(current.main.feels_like, units),
    );
    let _ = writeln!(
        out,
        "H {}  L {}  humidity {:.0}%  wind {}",
        format::temp(current.main.temp_max, units),
        format::temp(current.main.temp_min, units),
        current.main.humidity,
        format::wind(current.wind.speed, units),
    );
    let _ = writeln!(out);

    if report.days.is_empty() {
        let _ = writeln!(out, "No forecast available.");
        return out;
    }

    for (i, day) in report.days.iter().enumerate() {
        let _ = writeln!(out, "{:>2}  {}", i, day_row(day, units));
    }
    out
}

fn day_row(day: &DailySummary, units: Units) -> String {
    let icon = WeatherIcon::from_code(day.icon_id);
    format!(
        "{:<12} {} {:<13} {:>6} / {:<6} rain {:>4}",
        format::day(day.date),
        icon.symbol(),
        icon.label(),
        format::temp(day.min, units),
        format::temp(day.max, units),
        format::percent(day.pop_avg),
    )
}

/// Metric grid plus hourly list for one day.
///
/// The grid uses the day's first entry and falls back to current
/// conditions for anything the entry lacks.
pub fn day_detail(day: &DailySummary, current: &CurrentConditions, units: Units) -> String {
    let mut out = String::new();
    let first = day.entries.first();

    let humidity = first.map_or(current.main.humidity, |e| e.main.humidity);
    let pressure = first.map_or(current.main.pressure, |e| e.main.pressure);
    let wind = first.map_or(current.wind.speed, |e| e.wind.speed);
    let visibility = first
        .and_then(|e| e.visibility)
        .or(current.visibility)
        .unwrap_or(0.0);

    let _ = writeln!(out, "{}", format::day(day.date));
    let _ = writeln!(out, "Humidity    {humidity:.0}%");
    let _ = writeln!(out, "Pressure    {pressure:.0} hPa");
    let _ = writeln!(out, "Wind        {}", format::wind(wind, units));
    let _ = writeln!(out, "Visibility  {}", format::visibility(visibility));
    let _ = writeln!(out);
    let _ = writeln!(out, "Hourly");

    for entry in &day.entries {
        let icon = entry
            .weather
            .first()
            .map(|w| WeatherIcon::from_code(w.id))
            .unwrap_or_default();
        let pop = entry.pop.map(format::percent).unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "  {:>4}  {} {:>6}  rain {:>4}",
            format::hour(entry.dt, &Local),
            icon.symbol(),
            format::temp(entry.main.temp, units),
            pop,
        );
    }
    out
}
