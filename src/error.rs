//! Error types shared by the extraction stages.

use std::path::Path;

/// Errors that can occur while reading simulation artifacts
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("File not found: {path}")]
    MissingFile { path: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid run layout: {0}")]
    Layout(String),
}

impl AnalysisError {
    pub fn missing(path: &Path) -> Self {
        AnalysisError::MissingFile {
            path: path.display().to_string(),
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        AnalysisError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
