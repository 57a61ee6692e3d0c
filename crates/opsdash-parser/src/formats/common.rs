use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;

use crate::errors::ParserError;
use crate::formats::schema::LogColumn;

pub(crate) const TIME_OF_DAY_FORMAT: &str = "%H:%M:%S";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y", "%Y/%m/%d"];

#[derive(Debug, Clone, Default)]
pub(crate) struct LogColumns {
    pub date: Vec<String>,
    pub measurement_time: Vec<String>,
    pub channel: Vec<String>,
    pub value: Vec<Option<f64>>,
    pub unit_label: Vec<Option<String>>,
    pub datetime: Vec<i64>,
}

impl LogColumns {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            date: Vec::with_capacity(capacity),
            measurement_time: Vec::with_capacity(capacity),
            channel: Vec::with_capacity(capacity),
            value: Vec::with_capacity(capacity),
            unit_label: Vec::with_capacity(capacity),
            datetime: Vec::with_capacity(capacity),
        }
    }

    pub fn push(
        &mut self,
        timestamp: NaiveDateTime,
        channel: String,
        value: Option<f64>,
        unit_label: Option<String>,
    ) {
        self.date.push(timestamp.date().format("%Y-%m-%d").to_string());
        self.measurement_time
            .push(timestamp.time().format(TIME_OF_DAY_FORMAT).to_string());
        self.channel.push(channel);
        self.value.push(value);
        self.unit_label.push(unit_label);
        self.datetime.push(timestamp.and_utc().timestamp_micros());
    }

    pub fn len(&self) -> usize {
        self.datetime.len()
    }
}

pub(crate) fn build_log_dataframe(
    parser: &'static str,
    columns: LogColumns,
) -> Result<DataFrame, ParserError> {
    let rows = columns.len();
    let lengths = [
        columns.date.len(),
        columns.measurement_time.len(),
        columns.channel.len(),
        columns.value.len(),
        columns.unit_label.len(),
    ];
    if lengths.iter().any(|len| *len != rows) {
        return Err(ParserError::Validation {
            parser,
            message: format!("column lengths {lengths:?} disagree with {rows} timestamps"),
        });
    }

    let datetime = Series::new(LogColumn::Datetime.canonical_name().into(), columns.datetime)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
        .map_err(|err| ParserError::Validation {
            parser,
            message: format!("failed to cast datetime column: {err}"),
        })?;

    let cols: Vec<Column> = vec![
        Series::new(LogColumn::Date.canonical_name().into(), columns.date).into(),
        Series::new(
            LogColumn::MeasurementTime.canonical_name().into(),
            columns.measurement_time,
        )
        .into(),
        Series::new(LogColumn::Channel.canonical_name().into(), columns.channel).into(),
        Series::new(LogColumn::Value.canonical_name().into(), columns.value).into(),
        Series::new(LogColumn::UnitLabel.canonical_name().into(), columns.unit_label).into(),
        datetime.into(),
    ];

    DataFrame::new(cols).map_err(|err| ParserError::Validation {
        parser,
        message: format!("failed to build log dataframe: {err}"),
    })
}

/// Strict `HH:MM:SS`; fractional seconds, missing seconds and AM/PM suffixes are rejected.
pub(crate) fn parse_time_of_day(
    parser: &'static str,
    value: &str,
    line_index: u64,
) -> Result<NaiveTime, ParserError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, TIME_OF_DAY_FORMAT).map_err(|_| {
        ParserError::InvalidTime {
            parser,
            line_index,
            value: trimmed.to_string(),
        }
    })
}

/// Accepts the date layouts spreadsheet exports produce, optionally followed by a midnight
/// time component when the cell was exported as a datetime.
pub(crate) fn parse_date(
    parser: &'static str,
    value: &str,
    line_index: u64,
) -> Result<NaiveDate, ParserError> {
    let trimmed = value.trim();
    let date_part = match trimmed.split_once(' ') {
        Some((date, time)) if NaiveTime::parse_from_str(time.trim(), TIME_OF_DAY_FORMAT).is_ok() => {
            date
        }
        _ => trimmed,
    };

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, fmt) {
            return Ok(date);
        }
    }
    Err(ParserError::DataRow {
        parser,
        line_index,
        message: format!("invalid date '{trimmed}'"),
    })
}

pub(crate) fn parse_optional_f64(
    parser: &'static str,
    value: &str,
    line_index: u64,
    column: &str,
) -> Result<Option<f64>, ParserError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }

    if let Ok(parsed) = trimmed.parse::<f64>() {
        return Ok(Some(parsed));
    }

    // Decimal comma, only when there is no other separator to confuse it with.
    if trimmed.matches(',').count() == 1 && !trimmed.contains('.') {
        if let Ok(parsed) = trimmed.replace(',', ".").parse::<f64>() {
            return Ok(Some(parsed));
        }
    }

    Err(ParserError::DataRow {
        parser,
        line_index,
        message: format!("failed to parse column '{column}' as number: '{trimmed}'"),
    })
}

pub(crate) fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}
