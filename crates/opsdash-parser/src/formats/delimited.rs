use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord};

use crate::errors::ParserError;
use crate::formats::common::clean_optional;
use crate::formats::{
    build_log_dataframe, parse_date, parse_optional_f64, parse_time_of_day, LogColumns,
};
use crate::model::{ColumnLayout, ParsedLogFile};
use crate::registry::LogFileParser;

/// Spreadsheet export written as delimited text with a single header row.
#[derive(Debug, Clone, Copy)]
pub struct DelimitedParser {
    name: &'static str,
    delimiter: u8,
}

pub static COMMA_SEPARATED: DelimitedParser = DelimitedParser::new("comma_separated", b',');
pub static SEMICOLON_SEPARATED: DelimitedParser =
    DelimitedParser::new("semicolon_separated", b';');
pub static TAB_SEPARATED: DelimitedParser = DelimitedParser::new("tab_separated", b'\t');

struct ColumnIndices {
    date: usize,
    measurement_time: usize,
    channel: usize,
    value: usize,
    unit_label: usize,
}

impl DelimitedParser {
    pub const fn new(name: &'static str, delimiter: u8) -> Self {
        Self { name, delimiter }
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    fn resolve_columns(
        &self,
        header: &StringRecord,
        layout: &ColumnLayout,
    ) -> Result<ColumnIndices, ParserError> {
        if header.len() < 2 {
            return Err(ParserError::FormatMismatch {
                parser: self.name,
                reason: format!(
                    "header has {} field(s) when split on {:?}",
                    header.len(),
                    self.delimiter as char
                ),
            });
        }

        let mut positions: HashMap<&str, usize> = HashMap::new();
        for (idx, name) in header.iter().enumerate() {
            positions.entry(name.trim()).or_insert(idx);
        }

        let required = layout.required();
        if required
            .iter()
            .all(|column| !positions.contains_key(column.trim()))
        {
            return Err(ParserError::FormatMismatch {
                parser: self.name,
                reason: "none of the expected columns appear in the header".to_string(),
            });
        }

        let lookup = |column: &str| {
            positions
                .get(column.trim())
                .copied()
                .ok_or_else(|| ParserError::MissingColumn {
                    parser: self.name,
                    column: column.to_string(),
                })
        };

        Ok(ColumnIndices {
            date: lookup(layout.date.as_str())?,
            measurement_time: lookup(layout.measurement_time.as_str())?,
            channel: lookup(layout.channel.as_str())?,
            value: lookup(layout.value.as_str())?,
            unit_label: lookup(layout.unit_label.as_str())?,
        })
    }
}

impl LogFileParser for DelimitedParser {
    fn name(&self) -> &'static str {
        self.name
    }

    fn parse(&self, content: &str, layout: &ColumnLayout) -> Result<ParsedLogFile, ParserError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let header = reader
            .headers()
            .map_err(|source| ParserError::Csv {
                parser: self.name,
                source,
            })?
            .clone();
        let indices = self.resolve_columns(&header, layout)?;

        let mut columns = LogColumns::with_capacity(content.lines().count());

        for (row_idx, record) in reader.records().enumerate() {
            let record = record.map_err(|source| ParserError::Csv {
                parser: self.name,
                source,
            })?;
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            let line_index = record
                .position()
                .map(|pos| pos.line())
                .unwrap_or(row_idx as u64 + 2);
            let field = |idx: usize| record.get(idx).unwrap_or_default();

            let time = parse_time_of_day(self.name, field(indices.measurement_time), line_index)?;
            let date = parse_date(self.name, field(indices.date), line_index)?;
            let value =
                parse_optional_f64(self.name, field(indices.value), line_index, &layout.value)?;

            columns.push(
                date.and_time(time),
                field(indices.channel).trim().to_string(),
                value,
                clean_optional(record.get(indices.unit_label)),
            );
        }

        let df = build_log_dataframe(self.name, columns)?;
        Ok(ParsedLogFile {
            format: self.name,
            df,
        })
    }
}
