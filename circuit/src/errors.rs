//! Error types for descriptor loading and signal evaluation.

use std::path::PathBuf;

use thiserror::Error;

use crate::descriptor::Section;

/// A malformed or truncated circuit descriptor.
///
/// Every variant is fatal for the run that produced it; the loader never
/// substitutes defaults for missing data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid circuit file: wrong buffer size {len}, not a multiple of 4 bytes")]
    Misaligned { len: usize },

    #[error("Invalid circuit file: {section} needs {needed} bytes at {offset}, {remaining} left")]
    Truncated {
        section: Section,
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("Invalid circuit file: io map truncated at the count of template {template_id}")]
    IoMapCountTruncated { template_id: u32 },

    #[error("Invalid circuit file: io map truncated in template {template_id}, def {definition}")]
    IoMapTruncated { template_id: u32, definition: u32 },

    #[error("Invalid circuit file: template {template_id} appears twice in the io map")]
    DuplicateTemplate { template_id: u32 },

    #[error("Invalid circuit file: {trailing} unread bytes after the io map")]
    TrailingBytes { trailing: usize },
}

impl FormatError {
    /// The descriptor section the error was detected in, if any.
    pub fn section(&self) -> Option<Section> {
        match self {
            FormatError::Misaligned { .. } => None,
            FormatError::Truncated { section, .. } => Some(*section),
            FormatError::IoMapCountTruncated { .. }
            | FormatError::IoMapTruncated { .. }
            | FormatError::DuplicateTemplate { .. }
            | FormatError::TrailingBytes { .. } => Some(Section::IoMap),
        }
    }
}

/// Failures raised by an [`EvaluationContext`](crate::EvaluationContext).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CircuitError {
    #[error("Signal not found: {hash:#018x}")]
    SignalNotFound { hash: u64 },

    #[error("Signal assigned twice: {signal}")]
    SignalAssignedTwice { signal: usize },

    #[error("index {index} out of range for signal of size {size}")]
    SignalIndexOutOfRange { index: usize, size: usize },

    #[error("signal {signal} is not a main input of the circuit")]
    NotAnInput { signal: usize },

    #[error("witness slot {slot} out of range for {count} witnesses")]
    WitnessSlotOutOfRange { slot: usize, count: usize },

    #[error("witness slot {slot} maps to signal {signal}, but the circuit has {total} signals")]
    WitnessSignalOutOfRange {
        slot: usize,
        signal: u64,
        total: usize,
    },

    #[error("circuit evaluation failed: {0}")]
    Evaluation(String),
}

/// Failures loading [`CircuitParams`](crate::CircuitParams).
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("failed to read circuit params {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid circuit params JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("inconsistent circuit params: {0}")]
    Inconsistent(String),
}
