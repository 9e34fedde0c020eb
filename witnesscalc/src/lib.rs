//! Witness calculation for compiled arithmetic circuits.
//!
//! Given a circuit descriptor and a JSON object of input signal values, this
//! library binds the inputs, lets a circuit-specific [`circuit::Evaluator`]
//! compute every signal, and serializes the witness as a binary `.wtns` file.
//!
//! # Overview
//!
//! - [`number`]: decimal, `0b`, `0o` and `0x` literals in JSON input
//! - [`inputs`]: FNV-1a signal hashing and row-major flattening of arrays
//! - [`wtns`]: the witness container and its exact size
//! - [`WitnessCalculator`]: the pipeline, with an idiomatic entry point
//!   ([`WitnessCalculator::try_calculate`]) and a status-code one
//!   ([`WitnessCalculator::calculate`]) that supports two-phase sizing
//!
//! # Example
//!
//! ```
//! use circuit::{CircuitDescriptor, CircuitError, CircuitParams};
//! use field::Fr;
//! use witnesscalc::{Status, WitnessCalculator};
//!
//! // No inputs; signal 1 is computed from the constant one.
//! let params = CircuitParams {
//!     input_hash_map_size: 0,
//!     witness_count: 2,
//!     constants_count: 0,
//!     io_map_count: 0,
//!     main_input_signal_start: 1,
//!     main_input_signal_count: 0,
//!     total_signal_count: 2,
//! };
//! let calculator = WitnessCalculator::<Fr, _>::new(
//!     params,
//!     |_: &CircuitDescriptor<Fr>, signals: &mut [Fr]| {
//!         signals[1] = signals[0] + signals[0];
//!         Ok::<(), CircuitError>(())
//!     },
//! );
//!
//! // The descriptor is just the witness map: slot i holds signal i.
//! let descriptor: Vec<u8> = [0u64, 1].iter().flat_map(|s| s.to_le_bytes()).collect();
//!
//! // Ask for the size first, then calculate into a buffer of that size.
//! let mut wtns = Vec::new();
//! let mut wtns_size = 0;
//! let mut error = [0u8; 256];
//! let status = calculator.calculate(&descriptor, b"{}", &mut wtns, &mut wtns_size, &mut error);
//! assert_eq!(status, Status::ShortBuffer);
//!
//! wtns.resize(wtns_size, 0);
//! let status = calculator.calculate(&descriptor, b"{}", &mut wtns, &mut wtns_size, &mut error);
//! assert_eq!(status, Status::Ok);
//! assert_eq!(wtns_size, calculator.witness_size());
//! assert_eq!(&wtns[..4], b"wtns");
//! ```

mod calc;
mod constants;
mod errors;
pub mod inputs;
pub mod number;
pub mod wtns;

#[cfg(test)]
mod tests;

pub use calc::{copy_message, Stage, Status, WitnessCalculator};
pub use constants::{DATA_SECTION_ID, HEADER_SECTION_ID, WTNS_MAGIC, WTNS_VERSION};
pub use errors::{ErrorKind, WitnessCalcError};
pub use inputs::{bind_inputs, flatten, signal_hash};
pub use number::{literal_from_json, parse_literal, NumberLiteral};
pub use wtns::{required_size, write_witness, WitnessFile};
