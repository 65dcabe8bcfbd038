//! # Byte layout of the binary ephemeris
//!
//! Record 0 of a JPL DE binary is a sequence of contiguous regions at fixed
//! offsets. Writers seek through [`Region::offset`]; the reader decodes
//! the same regions in order.
//!
//! ```text
//! offset  size  region
//! ------  ----  ---------------------------------------------
//!      0   252  Title                 3 × CHARACTER*84
//!    252  2400  ConstantNames1        400 × CHARACTER*6
//!   2652    24  TimeSpan              start, end, step (f64)
//!   2676     4  ConstantCount         i32
//!   2680     8  Au                    f64
//!   2688     8  EarthMoonRatio        f64
//!   2696   144  CoefficientPointers   12 × [offset, ncoeff, nsub] (i32)
//!   2840     4  DeNumber              i32
//!   2844    12  LibrationPointers     [offset, ncoeff, nsub] (i32)
//!   2856  3600  ConstantNames2        names 401.. (CHARACTER*6)
//! ```
//!
//! Data follow in fixed-size records of `NCOEFF × 8` bytes: record 1 holds
//! the constant values, records 2.. the Chebyshev coefficients. All values
//! are little-endian.

use crate::constants::{
    EXTENDED_POINTER_BODIES, NAME_WIDTH, OVERFLOW_NAME_CAPACITY, POINTER_BODIES,
    PRIMARY_NAME_CAPACITY, TITLE_LINES, TITLE_WIDTH,
};

const F64_SIZE: u64 = 8;
const I32_SIZE: u64 = 4;

/// Size in bytes of the extended pointer table written after the last constant name.
pub const EXTENDED_POINTERS_SIZE: u64 = EXTENDED_POINTER_BODIES as u64 * 3 * I32_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Title,
    ConstantNames1,
    TimeSpan,
    ConstantCount,
    Au,
    EarthMoonRatio,
    CoefficientPointers,
    DeNumber,
    LibrationPointers,
    ConstantNames2,
}

impl Region {
    /// All regions in file order.
    pub const ALL: [Region; 10] = [
        Region::Title,
        Region::ConstantNames1,
        Region::TimeSpan,
        Region::ConstantCount,
        Region::Au,
        Region::EarthMoonRatio,
        Region::CoefficientPointers,
        Region::DeNumber,
        Region::LibrationPointers,
        Region::ConstantNames2,
    ];

    pub const fn size(self) -> u64 {
        match self {
            Region::Title => (TITLE_LINES * TITLE_WIDTH) as u64,
            Region::ConstantNames1 => (PRIMARY_NAME_CAPACITY * NAME_WIDTH) as u64,
            Region::TimeSpan => 3 * F64_SIZE,
            Region::ConstantCount => I32_SIZE,
            Region::Au => F64_SIZE,
            Region::EarthMoonRatio => F64_SIZE,
            Region::CoefficientPointers => POINTER_BODIES as u64 * 3 * I32_SIZE,
            Region::DeNumber => I32_SIZE,
            Region::LibrationPointers => 3 * I32_SIZE,
            Region::ConstantNames2 => (OVERFLOW_NAME_CAPACITY * NAME_WIDTH) as u64,
        }
    }

    /// Byte offset of the region from the start of the file.
    pub const fn offset(self) -> u64 {
        let mut offset = 0;
        let mut i = 0;
        while i < Self::ALL.len() {
            if Self::ALL[i] as usize == self as usize {
                break;
            }
            offset += Self::ALL[i].size();
            i += 1;
        }
        offset
    }

    pub const fn end(self) -> u64 {
        self.offset() + self.size()
    }
}

/// Byte offset of the `index`-th (0-based) constant name slot.
///
/// Slots `0..400` live in [`Region::ConstantNames1`], the following ones in
/// [`Region::ConstantNames2`].
pub fn name_slot_offset(index: usize) -> u64 {
    if index < PRIMARY_NAME_CAPACITY {
        Region::ConstantNames1.offset() + (index * NAME_WIDTH) as u64
    } else {
        Region::ConstantNames2.offset() + ((index - PRIMARY_NAME_CAPACITY) * NAME_WIDTH) as u64
    }
}

/// Byte offset of the extended pointer table (`IPT[13]`, `IPT[14]`),
/// written right after the last overflow name.
pub fn extended_pointers_offset(constant_count: usize) -> u64 {
    Region::ConstantNames2.offset()
        + (constant_count.saturating_sub(PRIMARY_NAME_CAPACITY) * NAME_WIDTH) as u64
}

/// Number of bytes of record 0 actually used by a header with
/// `constant_count` names, with or without the extended pointer table.
pub fn required_header_bytes(constant_count: usize, extended_pointers: bool) -> u64 {
    let names_end = extended_pointers_offset(constant_count);
    if extended_pointers {
        names_end + EXTENDED_POINTERS_SIZE
    } else {
        names_end
    }
}

/// Byte offset of record `index` for records of `record_size` bytes.
pub fn record_offset(index: u64, record_size: u64) -> u64 {
    index * record_size
}

/// Byte offset of the `slot`-th double inside record `index`.
pub fn value_offset(index: u64, slot: usize, record_size: u64) -> u64 {
    record_offset(index, record_size) + slot as u64 * F64_SIZE
}
