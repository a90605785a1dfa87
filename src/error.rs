//! Error types for the movie insights pipeline.
//!
//! Every variant is terminal for the run that raised it. Out-of-range or
//! missing values in individual records are never errors; the validity filter
//! drops them silently.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InsightsError {
    // === Record Loader ===
    /// The source file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    LoadIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source could not be parsed as delimited tabular data.
    #[error("failed to parse {path} as CSV: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    // === Field Normalizer ===
    /// A column the pipeline depends on is absent from the source.
    #[error("required column '{column}' not found in source")]
    Normalization { column: String },

    // === Validity Filter ===
    /// Structural failure while filtering, never a value-range failure.
    #[error("validation failed at row {row}: {reason}")]
    Validation { row: usize, reason: String },

    // === Aggregation Engine ===
    #[error("failed to compute {operation}: {reason}")]
    Aggregation {
        operation: &'static str,
        reason: String,
    },

    // === Report Formatter ===
    #[error("failed to format {section}: {reason}")]
    Format {
        section: &'static str,
        reason: String,
    },

    /// The rendered report could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Charts ===
    /// A single chart failed to render. Other charts are unaffected.
    #[error("failed to render chart '{name}': {reason}")]
    Chart { name: &'static str, reason: String },

    // === Configuration ===
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, InsightsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_error_display() {
        let err = InsightsError::Normalization {
            column: "audience_rating".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "required column 'audience_rating' not found in source"
        );
    }

    #[test]
    fn test_write_error_keeps_source() {
        use std::error::Error as _;
        let err = InsightsError::Write {
            path: PathBuf::from("out/movie_insights.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("out/movie_insights.md"));
    }
}
