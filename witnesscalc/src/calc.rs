//! The witness calculation pipeline and its status-code boundary.

use std::fmt;
use std::fs::File;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use circuit::{CircuitDescriptor, CircuitParams, EvaluationContext, Evaluator, SignalContext};
use field::WitnessField;
use memmap2::Mmap;
use tracing::{debug, info, warn};

use crate::errors::{ErrorKind, WitnessCalcError};
use crate::inputs::bind_inputs;
use crate::wtns::{required_size, write_witness};

/// Result code of [`WitnessCalculator::calculate`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Status {
    Ok = 0,
    /// The error message buffer describes what went wrong.
    Error = 1,
    /// The witness buffer is too small; the required size was reported.
    ShortBuffer = 2,
}

impl Status {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Progress of one calculation, recorded in log events.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    SizingCheck,
    Loading,
    Binding,
    AwaitingCompletion,
    Serializing,
    Done,
    Failed(ErrorKind),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::SizingCheck => write!(f, "sizing check"),
            Stage::Loading => write!(f, "loading"),
            Stage::Binding => write!(f, "binding"),
            Stage::AwaitingCompletion => write!(f, "awaiting completion"),
            Stage::Serializing => write!(f, "serializing"),
            Stage::Done => write!(f, "done"),
            Stage::Failed(kind) => write!(f, "failed ({kind:?})"),
        }
    }
}

/// Computes witnesses for one compiled circuit.
///
/// The parameters and evaluator are fixed per circuit and only read; each
/// call loads its own descriptor and builds its own context, so a calculator
/// can serve any number of calls.
pub struct WitnessCalculator<F, E> {
    params: CircuitParams,
    evaluator: E,
    _field: PhantomData<fn() -> F>,
}

impl<F: WitnessField, E: Evaluator<F>> WitnessCalculator<F, E> {
    pub fn new(params: CircuitParams, evaluator: E) -> Self {
        Self {
            params,
            evaluator,
            _field: PhantomData,
        }
    }

    pub fn params(&self) -> &CircuitParams {
        &self.params
    }

    /// Size in bytes of every witness file this circuit produces.
    pub fn witness_size(&self) -> usize {
        required_size(self.params.witness_count, F::width())
    }

    /// Runs the pipeline and writes the witness file into the front of `out`.
    ///
    /// `out` is left untouched when it is shorter than [`Self::witness_size`].
    pub fn try_calculate(
        &self,
        circuit: &[u8],
        json: &[u8],
        out: &mut [u8],
    ) -> Result<usize, WitnessCalcError> {
        let required = self.witness_size();
        debug!(stage = %Stage::SizingCheck, required, capacity = out.len());
        if out.len() < required {
            return Err(WitnessCalcError::ShortBuffer {
                required,
                capacity: out.len(),
            });
        }

        debug!(stage = %Stage::Loading, bytes = circuit.len());
        let descriptor = CircuitDescriptor::<F>::load(circuit, &self.params)?;
        let mut ctx = SignalContext::new(&descriptor, &self.params, &self.evaluator)?;

        debug!(stage = %Stage::Binding, bytes = json.len());
        let bound = bind_inputs::<F, _>(&mut ctx, json)?;

        debug!(stage = %Stage::AwaitingCompletion, signals = bound);
        let remaining = ctx.remaining_inputs();
        if remaining != 0 {
            let total = ctx.total_inputs();
            return Err(WitnessCalcError::IncompleteInput {
                set: total - remaining,
                total,
            });
        }
        ctx.try_run()?;

        debug!(stage = %Stage::Serializing, witnesses = self.params.witness_count);
        let written = write_witness::<F, _>(&ctx, self.params.witness_count, out)?;

        info!(stage = %Stage::Done, bytes = written, "witness calculated");
        Ok(written)
    }

    /// Status-code form of [`Self::try_calculate`].
    ///
    /// The witness buffer's capacity is the smaller of `*wtns_size` and
    /// `wtns.len()`. When it is too small, `*wtns_size` receives the required
    /// size and nothing else is written; call again with a buffer of at least
    /// that size. On success `*wtns_size` holds the bytes written. On error
    /// the message is copied into `error_msg` with `strncpy` semantics and
    /// `*wtns_size` is left alone.
    pub fn calculate(
        &self,
        circuit: &[u8],
        json: &[u8],
        wtns: &mut [u8],
        wtns_size: &mut usize,
        error_msg: &mut [u8],
    ) -> Status {
        let required = self.witness_size();
        let capacity = (*wtns_size).min(wtns.len());
        if capacity < required {
            debug!(stage = %Stage::SizingCheck, required, capacity, "witness buffer too short");
            *wtns_size = required;
            return Status::ShortBuffer;
        }

        let out = &mut wtns[..capacity];
        let result =
            panic::catch_unwind(AssertUnwindSafe(|| self.try_calculate(circuit, json, out)))
                .unwrap_or(Err(WitnessCalcError::Unknown));

        match result {
            Ok(written) => {
                *wtns_size = written;
                Status::Ok
            }
            Err(err) => report(&err, error_msg),
        }
    }

    /// [`Self::calculate`] with the descriptor read from a file.
    ///
    /// The file is mapped read-only for the duration of the call. Failing to
    /// open or map it is reported like any other error.
    pub fn calculate_from_dat_file(
        &self,
        path: impl AsRef<Path>,
        json: &[u8],
        wtns: &mut [u8],
        wtns_size: &mut usize,
        error_msg: &mut [u8],
    ) -> Status {
        let path = path.as_ref();
        // SAFETY: the mapping is only read and is dropped before returning.
        // Concurrent truncation of the file by another process is not guarded
        // against.
        let mapped = File::open(path).and_then(|file| unsafe { Mmap::map(&file) });
        match mapped {
            Ok(map) => self.calculate(&map, json, wtns, wtns_size, error_msg),
            Err(source) => report(
                &WitnessCalcError::Io {
                    path: path.to_path_buf(),
                    source,
                },
                error_msg,
            ),
        }
    }
}

fn report(err: &WitnessCalcError, error_msg: &mut [u8]) -> Status {
    let kind = err.kind();
    warn!(stage = %Stage::Failed(kind), error = %err, "witness calculation failed");
    copy_message(error_msg, &err.to_string());
    Status::Error
}

/// Copies `msg` into `dst` like C `strncpy`: at most `dst.len()` bytes, the
/// remainder zero-filled. A message that fills `dst` is not terminated.
pub fn copy_message(dst: &mut [u8], msg: &str) {
    let len = msg.len().min(dst.len());
    let (head, tail) = dst.split_at_mut(len);
    head.copy_from_slice(&msg.as_bytes()[..len]);
    tail.fill(0);
}
