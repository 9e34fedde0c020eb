//! Build-time size constants of a compiled circuit.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ParamsError;

/// Sizes fixed when the circuit was compiled.
///
/// The descriptor format carries no counts of its own, so these values are
/// what tells the loader how long each section is. They are read-only for the
/// lifetime of the process and can be shared freely between runs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitParams {
    /// Slots in the input-signal hash map, empty slots included.
    pub input_hash_map_size: usize,
    /// Number of witness slots (`N` in the witness file).
    pub witness_count: usize,
    /// Number of field elements in the constants section.
    #[serde(default)]
    pub constants_count: usize,
    /// Number of template instances described by the io map.
    #[serde(default)]
    pub io_map_count: usize,
    /// Index of the first main input signal.
    pub main_input_signal_start: usize,
    /// Number of main input signals, counted element by element.
    pub main_input_signal_count: usize,
    /// Total number of signals, including the constant-one signal 0.
    pub total_signal_count: usize,
}

impl CircuitParams {
    pub fn from_json_str(json: &str) -> Result<Self, ParamsError> {
        let params: CircuitParams = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Reads the JSON sidecar emitted next to a `.dat` descriptor.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ParamsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.total_signal_count == 0 {
            return Err(ParamsError::Inconsistent(
                "total_signal_count must include the constant-one signal".into(),
            ));
        }
        let inputs_end = self
            .main_input_signal_start
            .checked_add(self.main_input_signal_count);
        match inputs_end {
            Some(end) if end <= self.total_signal_count => {}
            _ => {
                return Err(ParamsError::Inconsistent(format!(
                    "main inputs {}..{}+{} exceed {} signals",
                    self.main_input_signal_start,
                    self.main_input_signal_start,
                    self.main_input_signal_count,
                    self.total_signal_count
                )));
            }
        }
        if u32::try_from(self.witness_count).is_err() {
            return Err(ParamsError::Inconsistent(format!(
                "witness_count {} does not fit the u32 count of a witness file",
                self.witness_count
            )));
        }
        if self.main_input_signal_count > 0 && self.input_hash_map_size == 0 {
            return Err(ParamsError::Inconsistent(
                "a circuit with inputs needs a non-empty input hash map".into(),
            ));
        }
        Ok(())
    }
}
