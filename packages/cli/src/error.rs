//! Error type for the `emotion_map` binary.

use emotion_map_analytics::AnalyticsError;
use emotion_map_geometry::GeometryError;
use thiserror::Error;

/// Errors surfaced by the `emotion_map` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// I/O error reading an input file.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV reader error.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// Path to the CSV file.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// The CSV header lacks a required column.
    #[error("CSV is missing required column {column}")]
    MissingColumn {
        /// Header name that was expected.
        column: &'static str,
    },

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An analytics operation failed.
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
}

impl From<GeometryError> for CliError {
    fn from(e: GeometryError) -> Self {
        Self::Analytics(AnalyticsError::Geometry(e))
    }
}
