use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::chart::{build_chart, ChartSpec};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, ErrorKind, Result};
use crate::loader::{LoadedUnit, Loader};
use crate::normalizer::normalize_hourly;
use crate::source::LogSource;
use opsdash_parser::LogColumn;

/// Which input changed. A unit change resets the channel to the unit's first channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    UnitChanged,
    #[default]
    ChannelChanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardRequest {
    pub unit: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub trigger: Trigger,
}

impl DashboardRequest {
    pub fn unit_changed(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            channel: None,
            trigger: Trigger::UnitChanged,
        }
    }

    pub fn channel_changed(unit: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            channel: Some(channel.into()),
            trigger: Trigger::ChannelChanged,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&DashboardError> for ResponseError {
    fn from(err: &DashboardError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Everything the UI shows after one interaction. Either `chart` or `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardResponse {
    pub unit: String,
    pub channel_options: Vec<String>,
    pub selected_channel: Option<String>,
    pub chart: Option<ChartSpec>,
    pub error: Option<ResponseError>,
}

impl DashboardResponse {
    fn empty(unit: &str) -> Self {
        Self {
            unit: unit.to_string(),
            channel_options: Vec::new(),
            selected_channel: None,
            chart: None,
            error: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitsOverview {
    pub title: String,
    pub units: Vec<String>,
    pub default_unit: Option<String>,
}

/// The dashboard as a plain function of the current selection. Holds no mutable state;
/// every call reloads the unit from its source.
pub struct Dashboard<S> {
    loader: Loader<S>,
}

impl<S: LogSource> Dashboard<S> {
    pub fn new(config: DashboardConfig, source: S) -> Self {
        Self {
            loader: Loader::new(config, source),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        self.loader.config()
    }

    pub fn loader(&self) -> &Loader<S> {
        &self.loader
    }

    pub fn units(&self) -> UnitsOverview {
        let config = self.config();
        UnitsOverview {
            title: config.title.clone(),
            units: config.unit_ids().into_iter().map(str::to_string).collect(),
            default_unit: config.default_unit().map(str::to_string),
        }
    }

    pub fn respond(&self, request: &DashboardRequest) -> DashboardResponse {
        let mut response = DashboardResponse::empty(&request.unit);
        if let Err(err) = self.fill_response(request, &mut response) {
            warn!(
                unit = request.unit.as_str(),
                channel = response.selected_channel.as_deref().unwrap_or_default(),
                "Dashboard recomputation failed: {err}"
            );
            response.chart = None;
            response.error = Some(ResponseError::from(&err));
        }
        response
    }

    fn fill_response(
        &self,
        request: &DashboardRequest,
        response: &mut DashboardResponse,
    ) -> Result<()> {
        let loaded: LoadedUnit = self.loader.load_unit(&request.unit)?;
        response.channel_options = loaded.channels()?;

        let selected = match (&request.channel, request.trigger) {
            (Some(channel), Trigger::ChannelChanged) if !channel.is_empty() => {
                Some(channel.clone())
            }
            _ => response.channel_options.first().cloned(),
        };
        response.selected_channel = selected.clone();

        let Some(channel) = selected else {
            return Err(DashboardError::EmptyInput(format!(
                "unit '{}' (no channels found)",
                request.unit
            )));
        };

        let series = loaded.channel_series(&channel)?;
        if series.height() == 0 {
            return Err(DashboardError::EmptyInput(format!(
                "channel '{channel}' of unit '{}'",
                request.unit
            )));
        }

        let normalized = normalize_hourly(&series, LogColumn::Datetime.canonical_name())?;
        response.chart = Some(build_chart(&normalized, &channel)?);
        Ok(())
    }
}
