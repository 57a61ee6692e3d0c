use std::collections::HashMap;
use std::path::{Path, PathBuf};

use opsdash_parser::{empty_log_dataframe, parse_log_file, LogColumn};
use polars::prelude::*;
use tracing::{debug, info};

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::source::LogSource;

#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub hash: String,
    pub format: &'static str,
    pub rows: usize,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub files: Vec<FileReport>,
}

impl LoadReport {
    pub fn total_rows(&self) -> usize {
        self.files.iter().map(|file| file.rows).sum()
    }
}

/// The unified table of one unit: every row of every export, in file order then row order.
#[derive(Debug, Clone)]
pub struct LoadedUnit {
    pub unit: String,
    pub table: DataFrame,
    pub report: LoadReport,
}

impl LoadedUnit {
    pub fn channels(&self) -> Result<Vec<String>> {
        distinct_channels(&self.table)
    }

    pub fn channel_series(&self, channel: &str) -> Result<DataFrame> {
        filter_channel(&self.table, channel)
    }
}

pub struct Loader<S> {
    config: DashboardConfig,
    source: S,
}

impl<S: LogSource> Loader<S> {
    pub fn new(config: DashboardConfig, source: S) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn load_unit(&self, unit_id: &str) -> Result<LoadedUnit> {
        let unit = self.config.unit(unit_id)?;
        let (table, report) = self.load_directory(&unit.directory)?;
        info!(
            unit = unit_id,
            files = report.files.len(),
            rows = table.height(),
            "Loaded unit"
        );
        Ok(LoadedUnit {
            unit: unit.id.clone(),
            table,
            report,
        })
    }

    /// Parses every matching export in `directory`. Any failure aborts the whole load.
    pub fn load_directory(&self, directory: &Path) -> Result<(DataFrame, LoadReport)> {
        let files = self
            .source
            .list_files(directory, self.config.extension())?;

        let mut frames: Vec<LazyFrame> = Vec::with_capacity(files.len());
        let mut report = LoadReport::default();

        for path in files {
            let content = self.source.read_to_string(&path)?;
            let hash = blake3::hash(content.as_bytes()).to_hex().to_string();
            let parsed = parse_log_file(&content, &self.config.columns).map_err(|source| {
                DashboardError::Parse {
                    path: path.clone(),
                    source,
                }
            })?;

            let rows = parsed.row_count();
            debug!(
                path = %path.display(),
                format = parsed.format,
                rows,
                "Parsed log file"
            );

            let source_file = path.to_string_lossy().to_string();
            frames.push(parsed.df.lazy().with_column(
                lit(source_file).alias(LogColumn::SourceFile.canonical_name()),
            ));
            report.files.push(FileReport {
                path,
                hash,
                format: parsed.format,
                rows,
            });
        }

        let table = if frames.is_empty() {
            empty_unified_table()?
        } else {
            concat(frames, UnionArgs::default())?.collect()?
        };

        if table.height() != report.total_rows() {
            return Err(DashboardError::Schema(format!(
                "unified table has {} rows but the files contributed {}",
                table.height(),
                report.total_rows()
            )));
        }

        Ok((table, report))
    }
}

pub fn empty_unified_table() -> Result<DataFrame> {
    let mut table = empty_log_dataframe()?;
    table.with_column(Series::new_empty(
        LogColumn::SourceFile.canonical_name().into(),
        &DataType::String,
    ))?;
    Ok(table)
}

/// Distinct channel names in first-seen order.
pub fn distinct_channels(table: &DataFrame) -> Result<Vec<String>> {
    Ok(channel_row_counts(table)?
        .into_iter()
        .map(|(channel, _)| channel)
        .collect())
}

/// Distinct channel names in first-seen order, with the number of rows each one has.
pub fn channel_row_counts(table: &DataFrame) -> Result<Vec<(String, usize)>> {
    let channels = table
        .column(LogColumn::Channel.canonical_name())
        .map_err(|_| DashboardError::Schema("table has no channel column".to_string()))?
        .str()?;

    let mut order: Vec<(String, usize)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for channel in channels.into_iter().flatten() {
        match positions.get(channel) {
            Some(&idx) => order[idx].1 += 1,
            None => {
                positions.insert(channel, order.len());
                order.push((channel.to_string(), 1));
            }
        }
    }
    Ok(order)
}

pub fn filter_channel(table: &DataFrame, channel: &str) -> Result<DataFrame> {
    Ok(table
        .clone()
        .lazy()
        .filter(col(LogColumn::Channel.canonical_name()).eq(lit(channel)))
        .collect()?)
}
