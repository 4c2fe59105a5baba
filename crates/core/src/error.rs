//! Error taxonomy
//!
//! Only configuration problems are fatal to a run. Alignment and source
//! failures are fatal to a single record (or mask) and are reported as
//! [`Diagnostic`](crate::pipeline::Diagnostic)s by the pipeline.

use crate::core_types::TraitKind;
use std::path::PathBuf;
use thiserror::Error;

/// Caller-side configuration mistakes; abort the run immediately
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("decay rate {0} is outside [0, 1)")]
    DecayRate(f64),
    #[error("quantization increment for {kind} must be positive and finite, got {value}")]
    Increment { kind: TraitKind, value: f64 },
    #[error("start year {start} is after end year {end}")]
    YearWindow { start: i32, end: i32 },
    #[error("severity class breaks must be finite and strictly ascending, got {0:?}")]
    ClassBreaks(Vec<f64>),
    #[error("output prefix for {0} is empty")]
    EmptyPrefix(TraitKind),
    #[error("output prefix '{0}' is shared by more than one trait")]
    DuplicatePrefix(String),
    #[error("identifier field name is empty")]
    EmptyIdField,
    #[error("landscape #{index} has no '{field}' identifier attribute")]
    MissingIdField { field: String, index: usize },
    #[error("landscape identifier '{0}' appears more than once")]
    DuplicateLandscapeId(String),
    #[error("failed to read configuration {path}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("invalid configuration: {0}")]
    Parse(String),
}

/// A raster that does not sit on the common grid
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignmentError {
    #[error("coordinate reference '{found}' does not match '{expected}'")]
    Crs { expected: String, found: String },
    #[error("resolution {found} does not match {expected}")]
    Resolution { expected: f64, found: f64 },
    #[error("origin offset ({dx}, {dy}) is not a whole number of cells")]
    Origin { dx: f64, dy: f64 },
    #[error("{len} values cannot fill a {ncols}x{nrows} grid")]
    Shape { len: usize, ncols: usize, nrows: usize },
}

/// A raster reference that could not be resolved
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    #[error("no raster store configured to resolve {0}")]
    NoStore(PathBuf),
    #[error("raster {0} not found")]
    Missing(PathBuf),
    #[error("failed to read raster {path}: {message}")]
    Read { path: PathBuf, message: String },
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
}

/// Failure writing a trait surface
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Any error surfaced by the public API
#[derive(Debug, Error)]
pub enum PyroError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Alignment(#[from] AlignmentError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = ConfigError::MissingIdField {
            field: "huc12".to_string(),
            index: 3,
        };
        assert_eq!(
            err.to_string(),
            "landscape #3 has no 'huc12' identifier attribute"
        );

        let err = ConfigError::Increment {
            kind: TraitKind::Severity,
            value: 0.0,
        };
        assert!(err.to_string().contains("severity"));
    }

    #[test]
    fn test_conversions_into_pyro_error() {
        let err: PyroError = ConfigError::DecayRate(1.5).into();
        assert!(matches!(err, PyroError::Config(ConfigError::DecayRate(r)) if r == 1.5));

        let err: SourceError = AlignmentError::Resolution {
            expected: 30.0,
            found: 10.0,
        }
        .into();
        assert!(matches!(err, SourceError::Alignment(_)));
    }
}
