use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::{DashboardError, Result};

/// File listing and reading, injected into the loader so it can run without a filesystem.
pub trait LogSource: Send + Sync {
    /// Files directly inside `directory` whose extension equals `extension` (ASCII
    /// case-insensitive), sorted by path. A missing directory is `NotFound`.
    fn list_files(&self, directory: &Path, extension: &str) -> Result<Vec<PathBuf>>;

    fn read_to_string(&self, path: &Path) -> Result<String>;
}

impl<T: LogSource + ?Sized> LogSource for &T {
    fn list_files(&self, directory: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        (**self).list_files(directory, extension)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        (**self).read_to_string(path)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl LogSource for FsSource {
    fn list_files(&self, directory: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        if !directory.is_dir() {
            return Err(DashboardError::not_found(directory, "directory does not exist"));
        }

        let pattern = format!(
            "{}/*.{}",
            Pattern::escape(&directory.to_string_lossy()),
            Pattern::escape(extension)
        );
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };

        let entries = glob::glob_with(&pattern, options)
            .map_err(|err| DashboardError::not_found(directory, err))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| DashboardError::not_found(directory, err))?;
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path).map_err(|err| DashboardError::not_found(path, err))?;
        String::from_utf8(bytes).map_err(|err| DashboardError::Encoding {
            path: path.to_path_buf(),
            message: err.utf8_error().to_string(),
        })
    }
}

/// In-memory file tree, mostly for tests and fixtures.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<PathBuf, String>,
    directories: BTreeSet<PathBuf>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directories.insert(directory.into());
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.directories.insert(parent.to_path_buf());
        }
        self.files.insert(path, content.into());
        self
    }
}

impl LogSource for MemorySource {
    fn list_files(&self, directory: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        if !self.directories.contains(directory) {
            return Err(DashboardError::not_found(directory, "directory does not exist"));
        }

        Ok(self
            .files
            .keys()
            .filter(|path| path.parent() == Some(directory))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
            })
            .cloned()
            .collect())
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| DashboardError::not_found(path, "file does not exist"))
    }
}
