//! Location of `GROUP nnnn` sections in the ASCII header.
//!
//! Sections are requested in strictly ascending order. Locating a section
//! skips any line until the next `GROUP` marker; if that marker is not the
//! requested one the header is malformed (sections are never searched
//! further ahead or retried).

use std::{fmt, io::BufRead};

use super::scanner::{group_marker, LineScanner};
use crate::asc2eph_errors::{Asc2EphError, FormatError};

/// Sections of the ASCII header read by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GroupId {
    /// Title lines.
    Title,
    /// Start, end and step of the ephemeris.
    TimeSpan,
    /// Constant count and names.
    ConstantNames,
    /// Constant count and values.
    ConstantValues,
    /// Coefficient pointer table.
    CoefficientPointers,
}

impl GroupId {
    pub const fn number(self) -> u32 {
        match self {
            GroupId::Title => 1010,
            GroupId::TimeSpan => 1030,
            GroupId::ConstantNames => 1040,
            GroupId::ConstantValues => 1041,
            GroupId::CoefficientPointers => 1050,
        }
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GROUP {}", self.number())
    }
}

/// Advance to the next `GROUP` marker and consume the separator line after it.
///
/// Return
/// ----------
/// * `Some(number)` of the group found, `None` if the stream ended first.
pub fn next_group<R: BufRead>(scanner: &mut LineScanner<R>) -> Result<Option<u32>, Asc2EphError> {
    loop {
        let Some(line) = scanner.next_line()? else {
            return Ok(None);
        };

        let marker = group_marker(line).ok().map(|(_, number)| number);
        if let Some(number) = marker {
            return match scanner.next_line()? {
                Some(_) => Ok(Some(number)),
                None => Err(FormatError::TruncatedGroup(number).into()),
            };
        }
    }
}

/// Position `scanner` on the first line of section `id`.
///
/// Arguments
/// -----------------
/// * `scanner`: Header stream, positioned anywhere before the section.
/// * `id`: The section expected next.
///
/// Return
/// ----------
/// * `Ok(())` with the scanner on the first content line of the section,
///   or a [`FormatError`] if the stream ends ([`FormatError::MissingGroup`])
///   or the next section is another one ([`FormatError::UnexpectedGroup`]).
pub fn seek_group<R: BufRead>(
    scanner: &mut LineScanner<R>,
    id: GroupId,
) -> Result<(), Asc2EphError> {
    match next_group(scanner)? {
        Some(found) if found == id.number() => Ok(()),
        Some(found) => Err(FormatError::UnexpectedGroup {
            expected: id.number(),
            found,
        }
        .into()),
        None => Err(FormatError::MissingGroup(id.number()).into()),
    }
}
