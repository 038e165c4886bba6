//! Turns the raw 3-hour forecast feed into display-ready series.
//!
//! The daily view keeps one representative sample per local date (the one
//! closest to local noon) and decorates it with extremes computed over every
//! sample of that date. The two are independent, so the representative
//! temperature is not guaranteed to lie between them.

use chrono::{NaiveDate, TimeDelta, Timelike};
use indexmap::IndexMap;

use super::models::{DailyExtremes, DailySummary, DetailedPoint, ForecastSample};
use crate::units::round1;

const NOON_SECONDS: i64 = 12 * 60 * 60;

/// Min/max temperature per feed date, in first-seen date order
pub fn extract_daily_extremes(samples: &[ForecastSample]) -> IndexMap<NaiveDate, DailyExtremes> {
    let mut extremes: IndexMap<NaiveDate, (f64, f64)> = IndexMap::new();

    for sample in samples {
        let temp = sample.temperature;
        extremes
            .entry(sample.feed_date())
            .and_modify(|(min, max)| {
                *min = min.min(temp);
                *max = max.max(temp);
            })
            .or_insert((temp, temp));
    }

    extremes
        .into_iter()
        .map(|(date, (min, max))| {
            (
                date,
                DailyExtremes {
                    min: round1(min),
                    max: round1(max),
                },
            )
        })
        .collect()
}

/// One summary per local date on or after `today`.
///
/// `today` is the current UTC calendar date; local dates before it are dropped.
/// Extremes are looked up by local date in the feed-date table, and a date
/// missing from it is skipped.
pub fn build_daily_forecast(
    samples: &[ForecastSample],
    utc_offset_seconds: i32,
    today: NaiveDate,
) -> Vec<DailySummary> {
    let extremes = extract_daily_extremes(samples);
    let offset = TimeDelta::seconds(i64::from(utc_offset_seconds));

    let mut nearest_noon: IndexMap<NaiveDate, (i64, &ForecastSample)> = IndexMap::new();
    for sample in samples {
        let Some(local) = sample.timestamp.checked_add_signed(offset) else {
            tracing::warn!(dt_txt = %sample.dt_txt, "Forecast sample out of range after offset");
            continue;
        };

        let distance = (i64::from(local.num_seconds_from_midnight()) - NOON_SECONDS).abs();
        let date = local.date();

        // Strict comparison: on ties the first sample stays
        match nearest_noon.get(&date) {
            Some((best, _)) if distance >= *best => {}
            _ => {
                nearest_noon.insert(date, (distance, sample));
            }
        }
    }

    nearest_noon
        .into_iter()
        .filter(|(date, _)| *date >= today)
        .filter_map(|(date, (_, sample))| {
            let Some(day) = extremes.get(&date) else {
                tracing::debug!(date = %date, "No extremes for local date, skipping");
                return None;
            };

            Some(DailySummary {
                date,
                temperature: round1(sample.temperature),
                min_temp: day.min,
                max_temp: day.max,
                condition: sample.condition.clone(),
                icon: sample.icon_code.clone(),
            })
        })
        .collect()
}

/// Every sample, in feed order, for charting
pub fn build_detailed_forecast(samples: &[ForecastSample]) -> Vec<DetailedPoint> {
    samples
        .iter()
        .map(|sample| DetailedPoint {
            datetime: sample.dt_txt.clone(),
            temperature: sample.temperature,
            condition: sample.condition.clone(),
            icon: sample.icon_code.clone(),
        })
        .collect()
}
