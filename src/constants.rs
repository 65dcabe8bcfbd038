//! # Constants of the JPL DE ASCII and binary formats
//!
//! Field widths of the ASCII header, fixed name capacities of record 0,
//! and the three constants whose values are relocated into dedicated
//! header fields.

/// Number of title lines in GROUP 1010.
pub const TITLE_LINES: usize = 3;
/// Width of one title line in the binary header (Fortran `CHARACTER*84`).
pub const TITLE_WIDTH: usize = 84;

/// Width of one constant name (Fortran `CHARACTER*6`).
pub const NAME_WIDTH: usize = 6;
/// Width of one name field in the ASCII header: 2 leading spaces + name.
pub const NAME_FIELD_WIDTH: usize = 8;
/// Number of name fields on a GROUP 1040 line.
pub const NAMES_PER_LINE: usize = 10;
/// Width of a GROUP 1040 line, line terminator excluded.
pub const NAME_LINE_WIDTH: usize = NAME_FIELD_WIDTH * NAMES_PER_LINE;

/// Names stored in the primary name table of record 0 (historical `OLDMAX`).
pub const PRIMARY_NAME_CAPACITY: usize = 400;
/// Names stored in the overflow table that follows the libration pointers.
pub const OVERFLOW_NAME_CAPACITY: usize = 600;

/// Number of bodies described by the main coefficient pointer table.
pub const POINTER_BODIES: usize = 12;
/// Number of bodies described by the extended pointer table (DE430+).
pub const EXTENDED_POINTER_BODIES: usize = 2;

/// Floating values per line in GROUP 1041 and in data files.
pub const VALUES_PER_LINE: usize = 3;

/// Index of the first coefficient record (record 0 is the header, record 1 the constants).
pub const FIRST_DATA_RECORD: u64 = 2;

/// Default name of the binary artifact.
pub const DEFAULT_OUTPUT: &str = "JPLEPH";

/// Constants whose values are copied from record 1 into fixed header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistinguishedConstant {
    /// Astronomical unit in km.
    Au,
    /// Earth/Moon mass ratio.
    EarthMoonRatio,
    /// DE solution number.
    DeNumber,
}

impl DistinguishedConstant {
    pub const ALL: [DistinguishedConstant; 3] = [
        DistinguishedConstant::Au,
        DistinguishedConstant::EarthMoonRatio,
        DistinguishedConstant::DeNumber,
    ];

    /// The 6-byte, space padded name used in the constant name table.
    pub const fn name(self) -> &'static [u8; NAME_WIDTH] {
        match self {
            DistinguishedConstant::Au => b"AU    ",
            DistinguishedConstant::EarthMoonRatio => b"EMRAT ",
            DistinguishedConstant::DeNumber => b"DENUM ",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DistinguishedConstant::Au => "AU",
            DistinguishedConstant::EarthMoonRatio => "EMRAT",
            DistinguishedConstant::DeNumber => "DENUM",
        }
    }

    /// Match a raw 6-byte name, case-sensitively.
    pub fn from_name(name: &[u8]) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}
