//! # Circuit descriptors and evaluation contexts
//!
//! Everything the witness calculator needs to know about a compiled circuit
//! lives here:
//!
//! - [`CircuitParams`]: the size constants fixed when the circuit was built
//!   (hash map slots, witness count, constants, io map templates, signal
//!   layout).
//! - [`CircuitDescriptor`]: the owned, validated contents of a `.dat`
//!   descriptor, produced by [`CircuitDescriptor::load`].
//! - [`EvaluationContext`]: the contract between input binding, the
//!   circuit-specific evaluation engine and witness serialization.
//! - [`SignalContext`]: a signal-table implementation of that contract that
//!   drives any [`Evaluator`].
//!
//! ## Descriptor layout
//!
//! All integers are little-endian and the whole buffer is a multiple of four
//! bytes long:
//!
//! ```text
//! input hash map   input_hash_map_size x { hash: u64, signal_id: u64, signal_size: u64 }
//! witness map      witness_count x u64
//! constants        constants_count x W bytes (canonical field elements)
//! io map index     io_map_count x u32 template ids
//! io map data      per template: n: u32, n x { offset: u32, len: u32, len x u32 }
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use circuit::{CircuitDescriptor, CircuitParams, SignalContext};
//! use field::Fr;
//!
//! let params = CircuitParams::load("multiplier.json")?;
//! let bytes = std::fs::read("multiplier.dat")?;
//! let descriptor = CircuitDescriptor::<Fr>::load(&bytes, &params)?;
//! let ctx = SignalContext::new(&descriptor, &params, &evaluator)?;
//! ```

mod context;
mod cursor;
mod descriptor;
mod errors;
mod params;

pub use context::{EvaluationContext, Evaluator, SignalContext};
pub use cursor::ByteCursor;
pub use descriptor::{
    build_input_hash_map, CircuitDescriptor, InputSignalInfo, IoDef, Section,
    INPUT_SIGNAL_INFO_SIZE, LEGACY_IO_DEF_CAPACITY, WORD_SIZE,
};
pub use errors::{CircuitError, FormatError, ParamsError};
pub use params::CircuitParams;
