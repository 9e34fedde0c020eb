//! Prime fields used by the witness calculator.
//!
//! This crate provides the BN254 scalar field [`Fr`] (the field circom
//! circuits are compiled for by default), re-exports the 31-bit Plonky3 fields,
//! and defines [`WitnessField`], the narrow contract the rest of the workspace
//! uses to move field elements in and out of their canonical wire form.

mod bn254;
mod element;
mod random;

pub use bn254::Fr;
pub use element::{WitnessField, element_width};
pub use p3_baby_bear::BabyBear;
pub use p3_koala_bear::KoalaBear;
pub use random::RandomField;
