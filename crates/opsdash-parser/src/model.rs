use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Header names of the five columns every export must carry.
///
/// Defaults match the SAP measurement-document export. Both sides are trimmed before
/// comparison; inner whitespace (as in the value header) must match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLayout {
    pub date: String,
    pub measurement_time: String,
    pub channel: String,
    pub value: String,
    pub unit_label: String,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            measurement_time: "Measurement time".to_string(),
            channel: "Description of measuring point".to_string(),
            value: "Meas/TotCountrRdg   _".to_string(),
            unit_label: "CharactstcUnit".to_string(),
        }
    }
}

impl ColumnLayout {
    pub(crate) fn required(&self) -> [&str; 5] {
        [
            self.date.as_str(),
            self.measurement_time.as_str(),
            self.channel.as_str(),
            self.value.as_str(),
            self.unit_label.as_str(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct ParsedLogFile {
    /// Name of the parser that accepted the file.
    pub format: &'static str,
    pub df: DataFrame,
}

impl ParsedLogFile {
    pub fn row_count(&self) -> usize {
        self.df.height()
    }
}
