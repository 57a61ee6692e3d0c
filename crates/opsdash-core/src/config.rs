use std::collections::HashSet;
use std::path::{Path, PathBuf};

use opsdash_parser::ColumnLayout;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

pub const DEFAULT_TITLE: &str = "Gas Turbine Operating Parameters Dashboard";
pub const DEFAULT_FILE_EXTENSION: &str = "csv";

/// One piece of equipment and the directory holding its exported logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitConfig {
    pub id: String,
    pub directory: PathBuf,
}

/// Everything the loader needs to know about the on-disk layout.
///
/// ```toml
/// default_unit = "GT 5"
///
/// [[unit]]
/// id = "GT 5"
/// directory = "data/GT 5"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub default_unit: Option<String>,
    /// Matched case-insensitively, without the leading dot.
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
    #[serde(default)]
    pub columns: ColumnLayout,
    #[serde(default, rename = "unit")]
    pub units: Vec<UnitConfig>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_file_extension() -> String {
    DEFAULT_FILE_EXTENSION.to_string()
}

impl DashboardConfig {
    pub fn new(units: Vec<UnitConfig>) -> Self {
        Self {
            title: default_title(),
            default_unit: None,
            file_extension: default_file_extension(),
            columns: ColumnLayout::default(),
            units,
        }
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: DashboardConfig = toml::from_str(toml_str)
            .map_err(|err| DashboardError::Config(format!("invalid configuration: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the configuration file; relative unit directories are resolved against the
    /// directory containing it.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            DashboardError::Config(format!("failed to read {}: {err}", path.display()))
        })?;
        let mut config = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            for unit in &mut config.units {
                if unit.directory.is_relative() {
                    unit.directory = base.join(&unit.directory);
                }
            }
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for unit in &self.units {
            if unit.id.trim().is_empty() {
                return Err(DashboardError::Config("unit id must not be empty".to_string()));
            }
            if !seen.insert(unit.id.as_str()) {
                return Err(DashboardError::Config(format!(
                    "unit '{}' is configured more than once",
                    unit.id
                )));
            }
        }

        if let Some(default_unit) = &self.default_unit {
            if !seen.contains(default_unit.as_str()) {
                return Err(DashboardError::Config(format!(
                    "default unit '{default_unit}' is not a configured unit"
                )));
            }
        }

        if self.file_extension.trim_start_matches('.').is_empty() {
            return Err(DashboardError::Config(
                "file_extension must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn unit(&self, id: &str) -> Result<&UnitConfig> {
        self.units
            .iter()
            .find(|unit| unit.id == id)
            .ok_or_else(|| DashboardError::UnknownUnit(id.to_string()))
    }

    pub fn unit_ids(&self) -> Vec<&str> {
        self.units.iter().map(|unit| unit.id.as_str()).collect()
    }

    /// The configured default, falling back to the first unit.
    pub fn default_unit(&self) -> Option<&str> {
        self.default_unit
            .as_deref()
            .or_else(|| self.units.first().map(|unit| unit.id.as_str()))
    }

    pub fn extension(&self) -> &str {
        self.file_extension.trim_start_matches('.')
    }
}
