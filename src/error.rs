// std imports
use std::io;
use std::path::PathBuf;

// third-party imports
use config::ConfigError;
use thiserror::Error;

// local imports
use crate::field::FieldKind;

/// Error is an error which may occur in the application.
///
/// Malformed input lines never end up here, they are reported through
/// [`LineError`](crate::field::LineError) instead. Everything in this enum terminates the run.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to open file {path:?} for reading: {source}")]
    FailedToOpenFileForReading {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid time format {0:?}")]
    InvalidTimeFormat(String),
    #[error("unknown log format {name:?}, use any of {known:?}")]
    UnknownFormat { name: String, known: Vec<&'static str> },
    #[error("invalid number of items for field {field}: expected {expected}, got {actual}")]
    ItemCount {
        field: FieldKind,
        expected: usize,
        actual: usize,
    },
    #[error("field {field} produced a value of kind {actual}")]
    ValueMismatch { field: FieldKind, actual: FieldKind },
    #[error("worker thread panicked")]
    WorkerPanicked,
}

/// Result is an alias for standard result with bound Error type.
pub type Result<T> = std::result::Result<T, Error>;
