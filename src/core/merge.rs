use crate::domain::model::{ForecastRow, MarineSample, WeatherSample};
use crate::utils::error::{ForecastError, Result};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use std::collections::BTreeMap;

/// `[start, end)` of the forecast window in the spot's local wall-clock time.
pub fn forecast_window(
    now: DateTime<Utc>,
    utc_offset_seconds: i32,
    hours: u32,
) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let out_of_range = || ForecastError::ProcessingError {
        message: format!(
            "forecast window of {}h (UTC offset {}s) from {} is out of range",
            hours, utc_offset_seconds, now
        ),
    };

    let start = now
        .naive_utc()
        .checked_add_signed(Duration::seconds(i64::from(utc_offset_seconds)))
        .ok_or_else(out_of_range)?;
    let end = start
        .checked_add_signed(Duration::hours(i64::from(hours)))
        .ok_or_else(out_of_range)?;
    Ok((start, end))
}

/// Outer-joins both series on timestamp, keeping only hours inside `[start, end)`.
///
/// Rows come out in ascending time order. An hour present in only one series gets `None`
/// for the other series' fields. Derived metrics are left empty.
pub fn merge_series(
    weather: &[WeatherSample],
    marine: &[MarineSample],
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<ForecastRow> {
    let in_window = |t: &NaiveDateTime| *t >= start && *t < end;
    let mut rows: BTreeMap<NaiveDateTime, ForecastRow> = BTreeMap::new();

    for sample in weather.iter().filter(|s| in_window(&s.time)) {
        let row = rows.entry(sample.time).or_insert_with(|| ForecastRow {
            time: sample.time,
            ..Default::default()
        });
        row.wind_speed = sample.wind_speed;
        row.wind_direction = sample.wind_direction;
        row.air_temp = sample.air_temp;
    }

    for sample in marine.iter().filter(|s| in_window(&s.time)) {
        let row = rows.entry(sample.time).or_insert_with(|| ForecastRow {
            time: sample.time,
            ..Default::default()
        });
        row.wave_height = sample.wave_height;
        row.wave_direction = sample.wave_direction;
        row.wave_period = sample.wave_period;
    }

    rows.into_values().collect()
}
