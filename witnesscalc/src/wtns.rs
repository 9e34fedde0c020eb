//! The binary witness container.
//!
//! ```text
//! "wtns" | version u32 | sections u32
//! id 1 u32 | len u64 = 8 + W | W u32 | modulus W bytes | N u32
//! id 2 u32 | len u64 = W * N | N elements, W bytes each
//! ```
//!
//! Every integer and element is little-endian; elements are canonical.

use std::io::Write;

use circuit::EvaluationContext;
use field::WitnessField;
use tracing::debug;

use crate::constants::{
    DATA_SECTION_ID, FIXED_FIELDS_SIZE, HEADER_SECTION_ID, WTNS_MAGIC, WTNS_SECTION_COUNT,
    WTNS_VERSION,
};
use crate::errors::WitnessCalcError;

/// Exact size of a witness file with `witness_count` elements of
/// `element_width` bytes. The extra element accounts for the modulus.
///
/// Saturates at `usize::MAX`, which no buffer can satisfy.
pub const fn required_size(witness_count: usize, element_width: usize) -> usize {
    FIXED_FIELDS_SIZE.saturating_add(element_width.saturating_mul(witness_count.saturating_add(1)))
}

/// Writes the witness file for slots `0..witness_count` of `ctx` into the
/// front of `buffer` and returns the number of bytes written.
///
/// Nothing is written when `buffer` is too small.
pub fn write_witness<F, C>(
    ctx: &C,
    witness_count: usize,
    buffer: &mut [u8],
) -> Result<usize, WitnessCalcError>
where
    F: WitnessField,
    C: EvaluationContext<F>,
{
    let width = F::width();
    let required = required_size(witness_count, width);
    if buffer.len() < required {
        return Err(WitnessCalcError::ShortBuffer {
            required,
            capacity: buffer.len(),
        });
    }
    let too_large = || {
        WitnessCalcError::WitnessFile(format!("{witness_count} witnesses do not fit a u32 count"))
    };
    let count = u32::try_from(witness_count).map_err(|_| too_large())?;
    let n8 = u32::try_from(width).map_err(|_| too_large())?;

    let mut out = &mut buffer[..required];
    out.write_all(WTNS_MAGIC)?;
    out.write_all(&WTNS_VERSION.to_le_bytes())?;
    out.write_all(&WTNS_SECTION_COUNT.to_le_bytes())?;

    out.write_all(&HEADER_SECTION_ID.to_le_bytes())?;
    out.write_all(&(8 + u64::from(n8)).to_le_bytes())?;
    out.write_all(&n8.to_le_bytes())?;
    out.write_all(&F::modulus_le_bytes())?;
    out.write_all(&count.to_le_bytes())?;

    out.write_all(&DATA_SECTION_ID.to_le_bytes())?;
    out.write_all(&(u64::from(n8) * u64::from(count)).to_le_bytes())?;
    for slot in 0..witness_count {
        out.write_all(&ctx.witness(slot)?.to_canonical_le_bytes())?;
    }

    debug!(bytes = required, witnesses = witness_count, width, "wrote witness file");
    Ok(required)
}

/// A parsed witness container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WitnessFile {
    pub element_width: usize,
    /// Field modulus, little-endian, `element_width` bytes.
    pub modulus: Vec<u8>,
    pub witness_count: usize,
    /// Concatenated canonical elements.
    pub data: Vec<u8>,
}

impl WitnessFile {
    pub fn parse(bytes: &[u8]) -> Result<Self, WitnessCalcError> {
        let mut reader = Reader { bytes, pos: 0 };

        if reader.take(4)? != WTNS_MAGIC {
            return Err(invalid("bad magic"));
        }
        let version = reader.u32()?;
        if version != WTNS_VERSION {
            return Err(invalid(format!("unsupported version {version}")));
        }
        let sections = reader.u32()?;
        if sections != WTNS_SECTION_COUNT {
            return Err(invalid(format!(
                "expected {WTNS_SECTION_COUNT} sections, found {sections}"
            )));
        }

        if reader.u32()? != HEADER_SECTION_ID {
            return Err(invalid("header section must come first"));
        }
        let header_len = reader.u64()?;
        let element_width = reader.u32()? as usize;
        if header_len != 8 + element_width as u64 {
            return Err(invalid(format!("header length {header_len} for width {element_width}")));
        }
        let modulus = reader.take(element_width)?.to_vec();
        let witness_count = reader.u32()? as usize;

        if reader.u32()? != DATA_SECTION_ID {
            return Err(invalid("data section must follow the header"));
        }
        let data_len = reader.u64()?;
        if data_len != (element_width as u64) * (witness_count as u64) {
            return Err(invalid(format!(
                "data length {data_len} for {witness_count} elements of {element_width} bytes"
            )));
        }
        let data = reader.take(data_len as usize)?.to_vec();
        if reader.pos != bytes.len() {
            return Err(invalid(format!("{} trailing bytes", bytes.len() - reader.pos)));
        }

        Ok(Self {
            element_width,
            modulus,
            witness_count,
            data,
        })
    }

    /// Raw canonical bytes of `slot`.
    pub fn element(&self, slot: usize) -> Option<&[u8]> {
        (slot < self.witness_count)
            .then(|| &self.data[slot * self.element_width..(slot + 1) * self.element_width])
    }

    /// Decodes every element into `F`, checking the header against `F`.
    pub fn elements<F: WitnessField>(&self) -> Result<Vec<F>, WitnessCalcError> {
        if self.element_width != F::width() || self.modulus != F::modulus_le_bytes() {
            return Err(invalid("header does not describe this field"));
        }
        Ok(self
            .data
            .chunks_exact(self.element_width)
            .map(F::from_le_bytes_reduced)
            .collect())
    }
}

fn invalid(reason: impl Into<String>) -> WitnessCalcError {
    WitnessCalcError::WitnessFile(reason.into())
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], WitnessCalcError> {
        let end = self.pos.checked_add(len).filter(|end| *end <= self.bytes.len());
        let Some(end) = end else {
            return Err(invalid(format!("truncated at offset {}", self.pos)));
        };
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u32(&mut self) -> Result<u32, WitnessCalcError> {
        let mut word = [0u8; 4];
        word.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(word))
    }

    fn u64(&mut self) -> Result<u64, WitnessCalcError> {
        let mut word = [0u8; 8];
        word.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(word))
    }
}
