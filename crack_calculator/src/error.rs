//! Error types for the crack spread pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure is fatal to the run; nothing here is retried or recovered.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration document could not be read.
    #[error("failed to read config {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration document is not valid TOML.
    #[error("failed to parse config {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A key path a caller needs is absent or has the wrong type.
    #[error("config key missing or invalid: {0}")]
    ConfigKey(String),

    /// Input table could not be opened.
    #[error("failed to read input table {path:?}: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input table has a missing column or an unparsable field.
    #[error("malformed input table {path:?}: {source}")]
    InputFormat {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Output directory could not be created.
    #[error("failed to create output directory {path:?}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output table could not be written.
    #[error("failed to write output table {path:?}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Unit string outside the recognized barrel/gallon/mass variants.
    #[error("unrecognized units: {units:?}")]
    UnrecognizedUnit { units: String },

    /// A leg the spread formulas reference was not supplied.
    #[error("missing required leg: {0}")]
    MissingLeg(String),
}

impl Error {
    /// Create a config key error.
    pub fn config_key(path: impl Into<String>) -> Self {
        Error::ConfigKey(path.into())
    }
}
