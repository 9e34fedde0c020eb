//! Loading of the binary circuit descriptor.

use std::collections::BTreeMap;
use std::fmt;

use field::WitnessField;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cursor::{le_u32_words, le_u64_words, ByteCursor};
use crate::errors::FormatError;
use crate::params::CircuitParams;

/// Alignment of the descriptor and width of every io map word.
pub const WORD_SIZE: usize = 4;

/// Wire size of one [`InputSignalInfo`] record.
pub const INPUT_SIGNAL_INFO_SIZE: usize = 24;

/// Number of io definitions per template that older witness calculators
/// preallocate. Larger counts load fine here but may not elsewhere.
pub const LEGACY_IO_DEF_CAPACITY: usize = 10;

/// Descriptor sections, in file order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    InputHashMap,
    WitnessMap,
    Constants,
    IoMapIndex,
    IoMap,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::InputHashMap => "input hash map",
            Section::WitnessMap => "witness map",
            Section::Constants => "constants",
            Section::IoMapIndex => "io map index",
            Section::IoMap => "io map",
        };
        f.write_str(name)
    }
}

/// One slot of the input-signal hash map. A zero `hash` marks an empty slot.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSignalInfo {
    /// FNV-1a hash of the signal name.
    pub hash: u64,
    /// Index of the signal's first element in the signal table.
    pub signal_id: u64,
    /// Number of field elements the signal spans.
    pub signal_size: u64,
}

impl InputSignalInfo {
    fn decode(bytes: &[u8]) -> Self {
        let mut words = le_u64_words(bytes);
        let mut next = || words.next().unwrap_or_default();
        Self {
            hash: next(),
            signal_id: next(),
            signal_size: next(),
        }
    }

    pub fn to_bytes(&self) -> [u8; INPUT_SIGNAL_INFO_SIZE] {
        let mut out = [0u8; INPUT_SIGNAL_INFO_SIZE];
        out[0..8].copy_from_slice(&self.hash.to_le_bytes());
        out[8..16].copy_from_slice(&self.signal_id.to_le_bytes());
        out[16..24].copy_from_slice(&self.signal_size.to_le_bytes());
        out
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hash == 0
    }
}

/// Byte offset and dimension sizes of one input or output signal of a
/// template instance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoDef {
    pub offset: u32,
    pub lengths: Vec<u32>,
}

/// Owned, validated contents of a circuit descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CircuitDescriptor<F> {
    input_hash_map: Vec<InputSignalInfo>,
    witness_to_signal: Vec<u64>,
    constants: Vec<F>,
    io_map: BTreeMap<u32, Vec<IoDef>>,
}

impl<F: WitnessField> CircuitDescriptor<F> {
    pub fn new(
        input_hash_map: Vec<InputSignalInfo>,
        witness_to_signal: Vec<u64>,
        constants: Vec<F>,
        io_map: BTreeMap<u32, Vec<IoDef>>,
    ) -> Self {
        Self {
            input_hash_map,
            witness_to_signal,
            constants,
            io_map,
        }
    }

    /// Parses a descriptor whose section sizes are given by `params`.
    ///
    /// Sections are read strictly in order. Every declared size is checked
    /// against what is left of `buffer` before anything is allocated, and any
    /// shortfall fails the whole load.
    pub fn load(buffer: &[u8], params: &CircuitParams) -> Result<Self, FormatError> {
        if buffer.len() % WORD_SIZE != 0 {
            return Err(FormatError::Misaligned { len: buffer.len() });
        }
        let mut cursor = ByteCursor::new(buffer);

        let input_hash_map = cursor
            .take_array(
                params.input_hash_map_size,
                INPUT_SIGNAL_INFO_SIZE,
                Section::InputHashMap,
            )?
            .chunks_exact(INPUT_SIGNAL_INFO_SIZE)
            .map(InputSignalInfo::decode)
            .collect::<Vec<_>>();
        debug!(slots = input_hash_map.len(), offset = cursor.position(), "loaded input hash map");

        let witness_to_signal = le_u64_words(cursor.take_array(
            params.witness_count,
            8,
            Section::WitnessMap,
        )?)
        .collect::<Vec<_>>();
        debug!(
            witnesses = witness_to_signal.len(),
            offset = cursor.position(),
            "loaded witness map"
        );

        let mut constants = Vec::new();
        if params.constants_count > 0 {
            let width = F::width();
            constants = cursor
                .take_array(params.constants_count, width, Section::Constants)?
                .chunks_exact(width)
                .map(F::from_le_bytes_reduced)
                .collect();
            debug!(constants = constants.len(), offset = cursor.position(), "loaded constants");
        }

        let mut io_map = BTreeMap::new();
        if params.io_map_count > 0 {
            io_map = load_io_map(&mut cursor, params.io_map_count)?;
            debug!(templates = io_map.len(), "loaded io map");
        }

        Ok(Self {
            input_hash_map,
            witness_to_signal,
            constants,
            io_map,
        })
    }

    /// Writes the descriptor back out in the layout [`load`](Self::load) reads.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for info in &self.input_hash_map {
            out.extend_from_slice(&info.to_bytes());
        }
        for signal in &self.witness_to_signal {
            out.extend_from_slice(&signal.to_le_bytes());
        }
        for constant in &self.constants {
            out.extend_from_slice(&constant.to_canonical_le_bytes());
        }
        for template_id in self.io_map.keys() {
            out.extend_from_slice(&template_id.to_le_bytes());
        }
        for defs in self.io_map.values() {
            out.extend_from_slice(&(defs.len() as u32).to_le_bytes());
            for def in defs {
                out.extend_from_slice(&def.offset.to_le_bytes());
                out.extend_from_slice(&(def.lengths.len() as u32).to_le_bytes());
                for len in &def.lengths {
                    out.extend_from_slice(&len.to_le_bytes());
                }
            }
        }
        out
    }
}

impl<F> CircuitDescriptor<F> {
    pub fn input_hash_map(&self) -> &[InputSignalInfo] {
        &self.input_hash_map
    }

    pub fn witness_to_signal(&self) -> &[u64] {
        &self.witness_to_signal
    }

    pub fn constants(&self) -> &[F] {
        &self.constants
    }

    pub fn io_map(&self) -> &BTreeMap<u32, Vec<IoDef>> {
        &self.io_map
    }

    /// Io definitions of one template instance.
    pub fn io_defs(&self, template_id: u32) -> Option<&[IoDef]> {
        self.io_map.get(&template_id).map(Vec::as_slice)
    }

    /// Looks up an input signal by name hash.
    ///
    /// Probing starts at `hash mod slots` and walks forward, wrapping once,
    /// until it finds the hash or reaches an empty slot.
    pub fn input_signal(&self, hash: u64) -> Option<&InputSignalInfo> {
        let slots = self.input_hash_map.len();
        if slots == 0 {
            return None;
        }
        let start = (hash % slots as u64) as usize;
        for step in 0..slots {
            let info = &self.input_hash_map[(start + step) % slots];
            if info.hash == hash {
                return Some(info);
            }
            if info.is_empty() && step > 0 {
                return None;
            }
        }
        None
    }
}

fn load_io_map(
    cursor: &mut ByteCursor<'_>,
    io_map_count: usize,
) -> Result<BTreeMap<u32, Vec<IoDef>>, FormatError> {
    let index = cursor.take_array(io_map_count, WORD_SIZE, Section::IoMapIndex)?;
    let template_ids = le_u32_words(index).collect::<Vec<_>>();

    let mut io_map = BTreeMap::new();
    for template_id in template_ids {
        if io_map.contains_key(&template_id) {
            return Err(FormatError::DuplicateTemplate { template_id });
        }

        let count = cursor
            .read_u32(Section::IoMap)
            .map_err(|_| FormatError::IoMapCountTruncated { template_id })?;
        if count as usize > LEGACY_IO_DEF_CAPACITY {
            warn!(
                template_id,
                count,
                capacity = LEGACY_IO_DEF_CAPACITY,
                "template declares more io definitions than legacy loaders preallocate"
            );
        }

        // Each definition is at least two words; never reserve more than could fit.
        let fits = cursor.remaining() / (2 * WORD_SIZE);
        let mut defs = Vec::with_capacity((count as usize).min(fits));
        for definition in 0..count {
            let truncated = |_| FormatError::IoMapTruncated {
                template_id,
                definition,
            };
            let offset = cursor.read_u32(Section::IoMap).map_err(truncated)?;
            let len = cursor.read_u32(Section::IoMap).map_err(truncated)?;
            let lengths = le_u32_words(
                cursor
                    .take_array(len as usize, WORD_SIZE, Section::IoMap)
                    .map_err(truncated)?,
            )
            .collect();
            defs.push(IoDef { offset, lengths });
        }
        io_map.insert(template_id, defs);
    }

    if cursor.remaining() != 0 {
        return Err(FormatError::TrailingBytes {
            trailing: cursor.remaining(),
        });
    }
    Ok(io_map)
}

/// Places `entries` into a hash map of `slots` slots the way
/// [`CircuitDescriptor::input_signal`] probes it.
///
/// Returns `None` if there are more entries than slots.
pub fn build_input_hash_map(
    entries: &[InputSignalInfo],
    slots: usize,
) -> Option<Vec<InputSignalInfo>> {
    if entries.len() > slots {
        return None;
    }
    let mut map = vec![InputSignalInfo::default(); slots];
    for entry in entries {
        let start = (entry.hash % slots as u64) as usize;
        let slot = (0..slots)
            .map(|step| (start + step) % slots)
            .find(|&slot| map[slot].is_empty())?;
        map[slot] = *entry;
    }
    Some(map)
}
