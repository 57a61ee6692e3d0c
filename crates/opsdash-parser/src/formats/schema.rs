use polars::prelude::*;

/// Canonical columns of a parsed export and of the unified table built from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogColumn {
    Date,
    MeasurementTime,
    Channel,
    Value,
    UnitLabel,
    Datetime,
    SourceFile,
}

impl LogColumn {
    pub fn canonical_name(&self) -> &'static str {
        match self {
            LogColumn::Date => "date",
            LogColumn::MeasurementTime => "measurement_time",
            LogColumn::Channel => "channel",
            LogColumn::Value => "value",
            LogColumn::UnitLabel => "unit_label",
            LogColumn::Datetime => "datetime",
            LogColumn::SourceFile => "source_file",
        }
    }
}

pub const PARSED_COLUMNS: [&str; 6] = [
    "date",
    "measurement_time",
    "channel",
    "value",
    "unit_label",
    "datetime",
];

/// A zero-row frame with the parsed-export schema.
pub fn empty_log_dataframe() -> PolarsResult<DataFrame> {
    let datetime = Series::new_empty(
        LogColumn::Datetime.canonical_name().into(),
        &DataType::Datetime(TimeUnit::Microseconds, None),
    );
    DataFrame::new(vec![
        Series::new_empty(LogColumn::Date.canonical_name().into(), &DataType::String).into(),
        Series::new_empty(
            LogColumn::MeasurementTime.canonical_name().into(),
            &DataType::String,
        )
        .into(),
        Series::new_empty(LogColumn::Channel.canonical_name().into(), &DataType::String).into(),
        Series::new_empty(LogColumn::Value.canonical_name().into(), &DataType::Float64).into(),
        Series::new_empty(LogColumn::UnitLabel.canonical_name().into(), &DataType::String)
            .into(),
        datetime.into(),
    ])
}
