//! Error types for witness calculation.

use std::path::PathBuf;

use circuit::{CircuitError, FormatError};
use thiserror::Error;

/// Closed classification of every failure the calculator can report.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or truncated circuit descriptor.
    Format,
    /// A JSON literal that is not a number in its base, or a non-numeric value.
    Value,
    /// A signal received a different number of values than it declares.
    BindingArity,
    /// Evaluation was requested before every required input was set.
    IncompleteInput,
    /// The output buffer is smaller than the witness file. Advisory.
    ShortOutputBuffer,
    /// The evaluation context or engine rejected an operation.
    Evaluation,
    /// The descriptor file could not be opened or mapped, or output could not be written.
    Io,
    Unknown,
}

/// Errors that can occur while computing a witness.
#[derive(Debug, Error)]
pub enum WitnessCalcError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Invalid number in JSON input: {literal}")]
    InvalidNumber { literal: String },

    #[error("Invalid JSON type: {found}")]
    InvalidJsonType { found: &'static str },

    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid JSON input: expected an object of signal values, found {found}")]
    NotAnObject { found: &'static str },

    #[error("Error loading signal {signal}: Not enough values ({got} of {expected})")]
    TooFewValues {
        signal: String,
        expected: usize,
        got: usize,
    },

    #[error("Error loading signal {signal}: Too many values ({got} of {expected})")]
    TooManyValues {
        signal: String,
        expected: usize,
        got: usize,
    },

    #[error("Error loading signal {signal}: {source}")]
    LoadSignal {
        signal: String,
        #[source]
        source: CircuitError,
    },

    #[error("Error setting signal: {signal}\n{source}")]
    SetSignal {
        signal: String,
        #[source]
        source: CircuitError,
    },

    #[error("Not all inputs have been set. Only {set} out of {total}")]
    IncompleteInput { set: usize, total: usize },

    #[error("Witness buffer too short: {required} bytes required, {capacity} available")]
    ShortBuffer { required: usize, capacity: usize },

    #[error(transparent)]
    Circuit(#[from] CircuitError),

    #[error("Invalid witness file: {0}")]
    WitnessFile(String),

    #[error("Failed to map circuit file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write witness: {0}")]
    Write(#[from] std::io::Error),

    #[error("unknown error")]
    Unknown,
}

impl WitnessCalcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WitnessCalcError::Format(_) => ErrorKind::Format,
            WitnessCalcError::InvalidNumber { .. }
            | WitnessCalcError::InvalidJsonType { .. }
            | WitnessCalcError::Json(_)
            | WitnessCalcError::NotAnObject { .. } => ErrorKind::Value,
            WitnessCalcError::TooFewValues { .. } | WitnessCalcError::TooManyValues { .. } => {
                ErrorKind::BindingArity
            }
            WitnessCalcError::IncompleteInput { .. } => ErrorKind::IncompleteInput,
            WitnessCalcError::ShortBuffer { .. } => ErrorKind::ShortOutputBuffer,
            WitnessCalcError::LoadSignal { .. }
            | WitnessCalcError::SetSignal { .. }
            | WitnessCalcError::Circuit(_)
            | WitnessCalcError::WitnessFile(_) => ErrorKind::Evaluation,
            WitnessCalcError::Io { .. } | WitnessCalcError::Write(_) => ErrorKind::Io,
            WitnessCalcError::Unknown => ErrorKind::Unknown,
        }
    }
}
