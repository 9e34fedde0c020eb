//! Layout constants of the binary witness (`.wtns`) container.

/// File magic.
pub const WTNS_MAGIC: &[u8; 4] = b"wtns";

/// Container format version.
pub const WTNS_VERSION: u32 = 2;

/// Header section plus data section.
pub const WTNS_SECTION_COUNT: u32 = 2;

/// Section id of the header (element width, modulus, witness count).
pub const HEADER_SECTION_ID: u32 = 1;

/// Section id of the witness data.
pub const DATA_SECTION_ID: u32 = 2;

/// Bytes of fixed-width fields in a witness file:
/// magic, version, section count, two section ids, two u64 section lengths,
/// the element width and the witness count.
pub const FIXED_FIELDS_SIZE: usize = 44;
