// crates/opsdash-core/src/error.rs

use std::path::PathBuf;

use opsdash_parser::ParserError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("not found or unreadable: {}: {message}", .path.display())]
    NotFound { path: PathBuf, message: String },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParserError,
    },

    #[error("{} is not valid UTF-8 text: {message}", .path.display())]
    Encoding { path: PathBuf, message: String },

    #[error("schema mismatch: {0}")]
    Schema(String),

    #[error("no rows to normalize for {0}")]
    EmptyInput(String),

    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

/// Coarse classification exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Parse,
    EmptyInput,
    UnknownUnit,
    Config,
    Internal,
}

impl DashboardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DashboardError::NotFound { .. } => ErrorKind::NotFound,
            DashboardError::Parse { .. }
            | DashboardError::Encoding { .. }
            | DashboardError::Schema(_) => ErrorKind::Parse,
            DashboardError::EmptyInput(_) => ErrorKind::EmptyInput,
            DashboardError::UnknownUnit(_) => ErrorKind::UnknownUnit,
            DashboardError::Config(_) => ErrorKind::Config,
            DashboardError::Polars(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn not_found(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        DashboardError::NotFound {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
