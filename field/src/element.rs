//! The field contract the witness calculator is written against.

use num_bigint::BigUint;
use p3_field::PrimeField;

/// Canonical byte width of an element of a field with the given modulus:
/// the modulus rounded up to whole 64-bit words.
pub fn element_width(modulus: &BigUint) -> usize {
    let words = (modulus.bits() as usize).div_ceil(64);
    words * 8
}

/// Conversions between a prime field's internal representation and the
/// canonical little-endian form used by circuit descriptors and witness files.
///
/// Every [`PrimeField`] gets this for free.
pub trait WitnessField: PrimeField {
    /// Bytes per element on the wire.
    fn width() -> usize {
        element_width(&Self::order())
    }

    /// The field modulus as `width()` little-endian bytes.
    fn modulus_le_bytes() -> Vec<u8> {
        pad_le(Self::order().to_bytes_le(), Self::width())
    }

    /// Canonical little-endian encoding, zero-padded to `width()` bytes.
    fn to_canonical_le_bytes(&self) -> Vec<u8> {
        pad_le(self.as_canonical_biguint().to_bytes_le(), Self::width())
    }

    /// Decodes a little-endian integer of any length, reducing it modulo the
    /// field order.
    fn from_le_bytes_reduced(bytes: &[u8]) -> Self {
        Self::from_biguint(&BigUint::from_bytes_le(bytes))
    }

    /// Parses `digits` in `radix` (2..=36) and reduces the value modulo the
    /// field order. An empty string is zero; a digit outside the radix gives
    /// `None`. Callers that need strict literal syntax validate before calling;
    /// `num_bigint` tolerates a leading `+` and `_` separators.
    fn from_digits(digits: &str, radix: u32) -> Option<Self> {
        if digits.is_empty() {
            return Some(Self::ZERO);
        }
        BigUint::parse_bytes(digits.as_bytes(), radix).map(|value| Self::from_biguint(&value))
    }

    /// Reduces an arbitrary unsigned integer into the field.
    fn from_biguint(value: &BigUint) -> Self {
        let reduced = value % Self::order();
        let two_32 = Self::from_u64(1 << 32);
        reduced
            .to_u32_digits()
            .iter()
            .rev()
            .fold(Self::ZERO, |acc, &digit| acc * two_32 + Self::from_u32(digit))
    }
}

impl<F: PrimeField> WitnessField for F {}

fn pad_le(mut bytes: Vec<u8>, width: usize) -> Vec<u8> {
    bytes.resize(width, 0);
    bytes
}
