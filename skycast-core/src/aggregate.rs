//! Day-level rollup of the 3-hour forecast feed.
//!
//! Entries are bucketed by the calendar date they fall on in the caller's
//! time zone, each bucket is reduced to a [`DailySummary`], and the earliest
//! [`MAX_DAYS`] buckets are returned in ascending order.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate, TimeZone};

use crate::model::{DailySummary, ForecastEntry};

/// Upper bound on the number of summaries returned.
pub const MAX_DAYS: usize = 7;

/// Condition code used when a day carries no condition records ("clear sky").
pub const CLEAR_SKY: i32 = 800;

/// Build day summaries using the machine's local time zone.
pub fn build_daily_summaries_local(entries: &[ForecastEntry]) -> Vec<DailySummary> {
    build_daily_summaries(entries, &Local)
}

/// Group `entries` by local calendar day in `tz` and summarise each day.
///
/// Never fails: an empty input yields an empty output and degenerate buckets
/// fall back to the defaults documented on [`summarize_day`].
pub fn build_daily_summaries<Tz: TimeZone>(
    entries: &[ForecastEntry],
    tz: &Tz,
) -> Vec<DailySummary> {
    let mut buckets: BTreeMap<NaiveDate, Vec<ForecastEntry>> = BTreeMap::new();
    for entry in entries {
        buckets
            .entry(local_date(entry.dt, tz))
            .or_default()
            .push(entry.clone());
    }

    let total_days = buckets.len();
    let summaries: Vec<DailySummary> = buckets
        .into_iter()
        .take(MAX_DAYS)
        .map(|(date, items)| summarize_day(date, items))
        .collect();

    tracing::debug!(
        entries = entries.len(),
        days = total_days,
        kept = summaries.len(),
        "aggregated forecast"
    );

    summaries
}

/// Reduce one day's entries to a summary.
///
/// Entries are sorted by timestamp. An empty `items` gives `min` and `max` of
/// 0, the [`CLEAR_SKY`] code and a precipitation average of 0.
pub fn summarize_day(date: NaiveDate, mut items: Vec<ForecastEntry>) -> DailySummary {
    items.sort_by_key(|e| e.dt);

    let min = items
        .iter()
        .map(|e| e.main.temp_min)
        .reduce(f64::min)
        .unwrap_or(0.0);
    let max = items
        .iter()
        .map(|e| e.main.temp_max)
        .reduce(f64::max)
        .unwrap_or(0.0);

    DailySummary {
        date,
        min,
        max,
        icon_id: dominant_condition(&items),
        pop_avg: average_pop(&items),
        entries: items,
    }
}

/// Most frequent condition code across every condition record of `items`.
///
/// Counts are kept in first-seen order and a tie resolves to the code that
/// was seen first.
pub fn dominant_condition(items: &[ForecastEntry]) -> i32 {
    let mut counts: Vec<(i32, usize)> = Vec::new();
    for code in items.iter().flat_map(|e| e.weather.iter().map(|w| w.id)) {
        match counts.iter_mut().find(|(c, _)| *c == code) {
            Some((_, n)) => *n += 1,
            None => counts.push((code, 1)),
        }
    }

    let mut best: Option<(i32, usize)> = None;
    for (code, n) in counts {
        if best.is_none_or(|(_, top)| n > top) {
            best = Some((code, n));
        }
    }

    best.map(|(code, _)| code).unwrap_or(CLEAR_SKY)
}

/// Mean of `pop` over the entries that report it; 0 when none do.
pub fn average_pop(items: &[ForecastEntry]) -> f64 {
    let (sum, reported) = items
        .iter()
        .filter_map(|e| e.pop)
        .fold((0.0, 0usize), |(sum, n), p| (sum + p, n + 1));

    sum / reported.max(1) as f64
}

fn local_date<Tz: TimeZone>(dt: i64, tz: &Tz) -> NaiveDate {
    DateTime::from_timestamp(dt, 0)
        .unwrap_or_default()
        .with_timezone(tz)
        .date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Condition, MainBlock, Wind};
    use chrono::{FixedOffset, Utc};

    const DAY: i64 = 86_400;
    // 2024-03-01T00:00:00Z
    const BASE: i64 = 1_709_251_200;

    fn cond(id: i32) -> Condition {
        Condition {
            id,
            main: "Test".into(),
            description: "test".into(),
            icon: "01d".into(),
        }
    }

    fn entry(dt: i64, temp_min: f64, temp_max: f64, codes: &[i32], pop: Option<f64>) -> ForecastEntry {
        ForecastEntry {
            dt,
            main: MainBlock {
                temp: (temp_min + temp_max) / 2.0,
                feels_like: temp_min,
                temp_min,
                temp_max,
                pressure: 1013.0,
                humidity: 70.0,
            },
            weather: codes.iter().copied().map(cond).collect(),
            wind: Wind { speed: 2.0, deg: Some(180.0) },
            visibility: Some(10_000.0),
            pop,
            dt_txt: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn empty_input_yields_no_summaries() {
        assert!(build_daily_summaries(&[], &Utc).is_empty());
    }

    #[test]
    fn partitions_every_entry_into_exactly_one_day() {
        let input: Vec<ForecastEntry> = (0..16)
            .map(|i| entry(BASE + i * 3 * 3600, 1.0, 2.0, &[800], None))
            .collect();

        let days = build_daily_summaries(&input, &Utc);

        assert_eq!(days.len(), 2);
        let mut seen: Vec<i64> = days.iter().flat_map(|d| d.entries.iter().map(|e| e.dt)).collect();
        seen.sort_unstable();
        let mut expected: Vec<i64> = input.iter().map(|e| e.dt).collect();
        expected.sort_unstable();
        assert_eq!(seen, expected);

        for day in &days {
            assert!(day.entries.iter().all(|e| e.time().date_naive() == day.date));
        }
    }

    #[test]
    fn days_are_ascending_and_entries_sorted() {
        let input = vec![
            entry(BASE + 2 * DAY + 3600, 1.0, 2.0, &[800], None),
            entry(BASE + 9 * 3600, 1.0, 2.0, &[800], None),
            entry(BASE + DAY, 1.0, 2.0, &[800], None),
            entry(BASE + 3 * 3600, 1.0, 2.0, &[800], None),
        ];

        let days = build_daily_summaries(&input, &Utc);

        let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date(2024, 3, 1), date(2024, 3, 2), date(2024, 3, 3)]);
        let first: Vec<i64> = days[0].entries.iter().map(|e| e.dt).collect();
        assert_eq!(first, vec![BASE + 3 * 3600, BASE + 9 * 3600]);
    }

    #[test]
    fn keeps_only_the_seven_earliest_days() {
        let input: Vec<ForecastEntry> = (0..10)
            .rev()
            .map(|d| entry(BASE + d * DAY + 12 * 3600, 1.0, 2.0, &[800], None))
            .collect();

        let days = build_daily_summaries(&input, &Utc);

        assert_eq!(days.len(), MAX_DAYS);
        assert_eq!(days[0].date, date(2024, 3, 1));
        assert_eq!(days[6].date, date(2024, 3, 7));
    }

    #[test]
    fn fewer_than_seven_days_are_returned_as_is() {
        let input = vec![
            entry(BASE, 1.0, 2.0, &[800], None),
            entry(BASE + DAY, 1.0, 2.0, &[800], None),
        ];

        assert_eq!(build_daily_summaries(&input, &Utc).len(), 2);
    }

    #[test]
    fn min_and_max_use_reported_daily_extremes() {
        let input = vec![
            entry(BASE, 5.0, 10.0, &[800], None),
            entry(BASE + 3600, 2.0, 14.0, &[800], None),
            entry(BASE + 7200, 9.0, 8.0, &[800], None),
        ];

        let days = build_daily_summaries(&input, &Utc);

        assert_eq!(days[0].min, 2.0);
        assert_eq!(days[0].max, 14.0);
    }

    #[test]
    fn dominant_code_counts_every_condition_record() {
        let input = vec![
            entry(BASE, 1.0, 2.0, &[800, 500], None),
            entry(BASE + 3600, 1.0, 2.0, &[801, 500], None),
            entry(BASE + 7200, 1.0, 2.0, &[801], None),
        ];

        // 500 only wins if secondary records are counted.
        let days = build_daily_summaries(&input, &Utc);
        assert_eq!(days[0].icon_id, 500);

        let single = vec![
            entry(BASE, 1.0, 2.0, &[801], None),
            entry(BASE + 3600, 1.0, 2.0, &[500, 500, 500], None),
        ];
        assert_eq!(dominant_condition(&single), 500);
    }

    #[test]
    fn tie_resolves_to_first_seen_code() {
        let input = vec![
            entry(BASE, 1.0, 2.0, &[500], None),
            entry(BASE + 3600, 1.0, 2.0, &[800], None),
            entry(BASE + 7200, 1.0, 2.0, &[800], None),
            entry(BASE + 10_800, 1.0, 2.0, &[500], None),
            entry(BASE + 14_400, 1.0, 2.0, &[500], None),
            entry(BASE + 18_000, 1.0, 2.0, &[800], None),
        ];

        for _ in 0..5 {
            let days = build_daily_summaries(&input, &Utc);
            assert_eq!(days[0].icon_id, 500);
        }
    }

    #[test]
    fn tie_order_follows_timestamps_not_input_order() {
        let input = vec![
            entry(BASE + 3600, 1.0, 2.0, &[500], None),
            entry(BASE, 1.0, 2.0, &[800], None),
        ];

        let days = build_daily_summaries(&input, &Utc);
        assert_eq!(days[0].icon_id, 800);
    }

    #[test]
    fn pop_average_skips_entries_without_pop() {
        let input = vec![
            entry(BASE, 1.0, 2.0, &[800], Some(0.2)),
            entry(BASE + 3600, 1.0, 2.0, &[800], None),
            entry(BASE + 7200, 1.0, 2.0, &[800], Some(0.6)),
        ];

        let days = build_daily_summaries(&input, &Utc);
        assert!((days[0].pop_avg - 0.4).abs() < 1e-9);
    }

    #[test]
    fn pop_average_is_zero_when_no_entry_reports_it() {
        let input = vec![
            entry(BASE, 1.0, 2.0, &[800], None),
            entry(BASE + 3600, 1.0, 2.0, &[800], None),
        ];

        let days = build_daily_summaries(&input, &Utc);
        assert_eq!(days[0].pop_avg, 0.0);
    }

    #[test]
    fn empty_bucket_falls_back_to_defaults() {
        let summary = summarize_day(date(2024, 3, 1), Vec::new());

        assert_eq!(summary.min, 0.0);
        assert_eq!(summary.max, 0.0);
        assert_eq!(summary.icon_id, CLEAR_SKY);
        assert_eq!(summary.pop_avg, 0.0);
    }

    #[test]
    fn entry_without_conditions_defaults_to_clear_sky() {
        assert_eq!(dominant_condition(&[entry(BASE, 1.0, 2.0, &[], None)]), CLEAR_SKY);
    }

    #[test]
    fn buckets_follow_the_given_time_zone() {
        // 2024-03-01T22:00Z and 2024-03-02T01:00Z share a date at UTC-5.
        let input = vec![
            entry(BASE + 22 * 3600, 1.0, 2.0, &[800], None),
            entry(BASE + 25 * 3600, 1.0, 2.0, &[800], None),
        ];

        assert_eq!(build_daily_summaries(&input, &Utc).len(), 2);

        let est = FixedOffset::west_opt(5 * 3600).expect("valid offset");
        let days = build_daily_summaries(&input, &est);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, date(2024, 3, 1));
        assert_eq!(days[0].entries.len(), 2);
    }
}
