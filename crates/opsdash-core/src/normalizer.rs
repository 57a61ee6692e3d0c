use std::collections::HashMap;

use polars::prelude::*;

use crate::error::{DashboardError, Result};

pub const HOUR_MICROS: i64 = 3_600 * 1_000_000;

pub fn floor_hour(micros: i64) -> i64 {
    micros - micros.rem_euclid(HOUR_MICROS)
}

pub fn ceil_hour(micros: i64) -> i64 {
    let floor = floor_hour(micros);
    if floor == micros {
        floor
    } else {
        floor + HOUR_MICROS
    }
}

/// Puts a single-channel series on an hourly grid.
///
/// Rows sharing a timestamp are reduced to the first one, in row order. The grid runs from
/// the hour at or before the earliest timestamp to the hour at or after the latest one; a
/// slot only receives a row whose timestamp lands on it exactly. Numeric columns are then
/// filled by linear interpolation between known slots, never beyond the first or last known
/// value. Every other column stays null on slots without a row.
pub fn normalize_hourly(series: &DataFrame, timestamp_column: &str) -> Result<DataFrame> {
    if series.height() == 0 {
        return Err(DashboardError::EmptyInput(format!(
            "series keyed by '{timestamp_column}'"
        )));
    }

    let timestamps = series
        .column(timestamp_column)
        .map_err(|_| {
            DashboardError::Schema(format!("series has no '{timestamp_column}' column"))
        })?
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
    let timestamps = timestamps.datetime()?;

    let mut first_row: HashMap<i64, usize> = HashMap::new();
    let mut bounds: Option<(i64, i64)> = None;
    for idx in 0..series.height() {
        let Some(ts) = timestamps.get(idx) else {
            continue;
        };
        first_row.entry(ts).or_insert(idx);
        bounds = Some(match bounds {
            Some((min, max)) => (min.min(ts), max.max(ts)),
            None => (ts, ts),
        });
    }

    let Some((min, max)) = bounds else {
        return Err(DashboardError::EmptyInput(format!(
            "series with only null '{timestamp_column}' values"
        )));
    };

    let start = floor_hour(min);
    let end = ceil_hour(max);
    let slots = ((end - start) / HOUR_MICROS) as usize + 1;

    let grid: Vec<i64> = (0..slots)
        .map(|slot| start + slot as i64 * HOUR_MICROS)
        .collect();
    let slot_rows: Vec<Option<usize>> = grid.iter().map(|ts| first_row.get(ts).copied()).collect();

    let mut columns: Vec<Column> = Vec::with_capacity(series.width());
    for column in series.get_columns() {
        let name = column.name().clone();
        if name.as_str() == timestamp_column {
            let grid_series = Series::new(name, grid.clone())
                .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
            columns.push(grid_series.into());
        } else if column.dtype().is_primitive_numeric() {
            let values = column.cast(&DataType::Float64)?;
            let values = values.f64()?;
            let mut filled: Vec<Option<f64>> = slot_rows
                .iter()
                .map(|row| row.and_then(|idx| values.get(idx)))
                .collect();
            interpolate_linear(&mut filled);
            columns.push(Series::new(name, filled).into());
        } else {
            let values = column.cast(&DataType::String)?;
            let values = values.str()?;
            let gathered: Vec<Option<&str>> = slot_rows
                .iter()
                .map(|row| row.and_then(|idx| values.get(idx)))
                .collect();
            columns.push(Series::new(name, gathered).into());
        }
    }

    Ok(DataFrame::new(columns)?)
}

/// Fills interior gaps by linear interpolation on slot position. Leading and trailing gaps
/// are left alone.
pub fn interpolate_linear(values: &mut [Option<f64>]) {
    let mut previous: Option<(usize, f64)> = None;
    for idx in 0..values.len() {
        let Some(current) = values[idx] else {
            continue;
        };
        if let Some((prev_idx, prev_value)) = previous {
            let span = (idx - prev_idx) as f64;
            for gap in prev_idx + 1..idx {
                let fraction = (gap - prev_idx) as f64 / span;
                values[gap] = Some(prev_value + (current - prev_value) * fraction);
            }
        }
        previous = Some((idx, current));
    }
}
