use chrono::{DateTime, NaiveDateTime};
use opsdash_parser::LogColumn;
use polars::prelude::*;
use serde::Serialize;

use crate::error::{DashboardError, Result};

pub const X_AXIS_TITLE: &str = "Measurement Time";
pub const Y_AXIS_TITLE: &str = "Measurement Value";
const GRID_COLOR: &str = "LightGrey";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineShape {
    Linear,
    Spline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeStep {
    Day,
    Month,
    Year,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepMode {
    Backward,
    ToDate,
}

/// One zoom shortcut above the time axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeButton {
    pub label: &'static str,
    pub step: RangeStep,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_mode: Option<StepMode>,
}

impl RangeButton {
    const fn new(label: &'static str, count: u32, step: RangeStep, step_mode: StepMode) -> Self {
        Self {
            label,
            step,
            count: Some(count),
            step_mode: Some(step_mode),
        }
    }
}

pub fn default_range_buttons() -> Vec<RangeButton> {
    vec![
        RangeButton::new("1d", 1, RangeStep::Day, StepMode::Backward),
        RangeButton::new("1m", 1, RangeStep::Month, StepMode::Backward),
        RangeButton::new("6m", 6, RangeStep::Month, StepMode::Backward),
        RangeButton::new("YTD", 1, RangeStep::Year, StepMode::ToDate),
        RangeButton::new("1y", 1, RangeStep::Year, StepMode::Backward),
        RangeButton {
            label: "all",
            step: RangeStep::All,
            count: None,
            step_mode: None,
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSpec {
    pub title: String,
    pub show_grid: bool,
    pub grid_color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick_angle: Option<i32>,
    pub range_slider: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub range_buttons: Vec<RangeButton>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

/// What a renderer needs to draw one channel: styling plus the normalized points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub channel: String,
    pub unit_label: Option<String>,
    pub x_axis: AxisSpec,
    pub y_axis: AxisSpec,
    pub line_shape: LineShape,
    pub connect_gaps: bool,
    pub points: Vec<ChartPoint>,
}

pub fn chart_title(channel: &str, unit_label: Option<&str>) -> String {
    format!("Data for {channel} ({})", unit_label.unwrap_or_default())
}

/// Builds the chart for a normalized series. The unit label is the first non-null label;
/// the leading grid slot is synthetic when the earliest reading is off the hour.
pub fn build_chart(normalized: &DataFrame, channel: &str) -> Result<ChartSpec> {
    if normalized.height() == 0 {
        return Err(DashboardError::EmptyInput(format!("channel '{channel}'")));
    }

    let schema_error = |column: LogColumn| {
        DashboardError::Schema(format!(
            "series has no '{}' column",
            column.canonical_name()
        ))
    };

    let timestamps = normalized
        .column(LogColumn::Datetime.canonical_name())
        .map_err(|_| schema_error(LogColumn::Datetime))?
        .datetime()?;
    let values = normalized
        .column(LogColumn::Value.canonical_name())
        .map_err(|_| schema_error(LogColumn::Value))?
        .f64()?;
    let unit_label = normalized
        .column(LogColumn::UnitLabel.canonical_name())
        .map_err(|_| schema_error(LogColumn::UnitLabel))?
        .str()?
        .into_iter()
        .flatten()
        .next()
        .map(str::to_string);

    let mut points = Vec::with_capacity(normalized.height());
    for idx in 0..normalized.height() {
        let Some(micros) = timestamps.get(idx) else {
            continue;
        };
        let timestamp = DateTime::from_timestamp_micros(micros)
            .ok_or_else(|| DashboardError::Schema(format!("timestamp {micros} out of range")))?
            .naive_utc();
        points.push(ChartPoint {
            timestamp,
            value: values.get(idx),
        });
    }

    Ok(ChartSpec {
        title: chart_title(channel, unit_label.as_deref()),
        channel: channel.to_string(),
        unit_label,
        x_axis: AxisSpec {
            title: X_AXIS_TITLE.to_string(),
            show_grid: true,
            grid_color: GRID_COLOR,
            tick_angle: Some(45),
            range_slider: true,
            range_buttons: default_range_buttons(),
        },
        y_axis: AxisSpec {
            title: Y_AXIS_TITLE.to_string(),
            show_grid: true,
            grid_color: GRID_COLOR,
            tick_angle: None,
            range_slider: false,
            range_buttons: Vec::new(),
        },
        line_shape: LineShape::Spline,
        connect_gaps: true,
        points,
    })
}
