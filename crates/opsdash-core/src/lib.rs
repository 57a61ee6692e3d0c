pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod loader;
pub mod normalizer;
pub mod source;

pub use config::{DashboardConfig, UnitConfig};
pub use dashboard::{Dashboard, DashboardRequest, DashboardResponse, Trigger};
pub use error::{DashboardError, ErrorKind, Result};
pub use loader::{LoadReport, LoadedUnit, Loader};
pub use source::{FsSource, LogSource, MemorySource};
