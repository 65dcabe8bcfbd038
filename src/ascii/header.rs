//! # ASCII header parsing
//!
//! The header file (`header.440`, `header.405`, ...) describes the
//! ephemeris and is read in one pass, group after group:
//!
//! ```text
//! KSIZE= 2036    NCOEFF= 1018
//!
//! GROUP   1010
//!
//! JPL Planetary Ephemeris DE440/LE440
//! Start Epoch: JED=  2287184.5 1549 DEC 21 00:00:00
//! Final Epoch: JED=  2688976.5 2650 JAN 25 00:00:00
//!
//! GROUP   1030
//!
//!   2287184.50  2688976.50         32.
//!
//! GROUP   1040
//!
//!    645
//!   DENUM   LENUM   TDATEF  TDATEB  JDEPOC  CENTER  CLIGHT  BETA    GAMMA   AU
//!   ...
//! GROUP   1041
//!
//!    645
//!   0.440000000000000000D+03  0.440000000000000000D+03  0.202012160000000000D+08
//!   ...
//! GROUP   1050
//!
//!      3   171   231   309   342   366   387   405   423   441   753   819   899  1019  1019
//!     14    10    13    11     8     7     6     6     6    13    11    10    10     0     0
//!      4     2     2     1     1     1     1     1     1     8     2     4     4     0     0
//! ```
//!
//! Record 0 of the binary file is written as the groups are read; record 1
//! receives the constant values of GROUP 1041.

use std::io::{BufRead, Read, Seek, Write};

use tracing::{debug, warn};

use super::{
    data_records::DataRecordAssembler,
    group::{seek_group, GroupId},
    names::write_constant_names,
    pointers::{write_pointer_tables, PointerTables},
    scanner::{record_size_fields, single_integer, LineScanner},
};
use crate::{
    asc2eph_errors::{Asc2EphError, FormatError},
    binary::writer::{f64_bytes, i32_bytes, EphemerisWriter},
    constants::{OVERFLOW_NAME_CAPACITY, PRIMARY_NAME_CAPACITY, TITLE_LINES, TITLE_WIDTH},
    context::{ConversionContext, TimeSpan},
    layout::{required_header_bytes, Region},
};

/// What the header parser hands over to the data stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedHeader {
    pub ctx: ConversionContext,
    /// Title lines, as written (84 characters, space padded).
    pub titles: [String; TITLE_LINES],
    pub pointers: PointerTables,
}

/// Fit one title line into its 84-byte field.
///
/// Trailing control characters are dropped, longer lines are cut and
/// shorter ones padded with spaces.
fn title_field(line: &str) -> (Vec<u8>, bool) {
    let trimmed = line.trim_end_matches(|c: char| c.is_control());
    let mut field = trimmed.as_bytes().to_vec();
    let truncated = field.len() > TITLE_WIDTH;
    field.resize(TITLE_WIDTH, b' ');
    (field, truncated)
}

/// Parse the `KSIZE= <k> NCOEFF= <n>` line.
fn read_record_geometry<R: BufRead>(
    scanner: &mut LineScanner<R>,
) -> Result<ConversionContext, Asc2EphError> {
    let (ksize, ncoeff) =
        scanner.scan_line("KSIZE= <words> NCOEFF= <count>", record_size_fields)?;

    // KSIZE counts 4-byte words, NCOEFF 8-byte doubles; both fit an i32
    let geometry = (ncoeff >= 2 && ncoeff.checked_mul(2) == Some(ksize))
        .then(|| Some((i32::try_from(ksize).ok()?, usize::try_from(ncoeff).ok()?)))
        .flatten();
    match geometry {
        Some((words, count)) => Ok(ConversionContext::new(words as usize, count)),
        None => Err(FormatError::InvalidRecordSize { ksize, ncoeff }.into()),
    }
}

fn write_titles<R, F>(
    scanner: &mut LineScanner<R>,
    writer: &mut EphemerisWriter<F>,
) -> Result<[String; TITLE_LINES], Asc2EphError>
where
    R: BufRead,
    F: Read + Write + Seek,
{
    let mut block = Vec::with_capacity(Region::Title.size() as usize);
    let mut titles: [String; TITLE_LINES] = Default::default();

    for title in titles.iter_mut() {
        let line = scanner.require_line("title line")?;
        let (field, truncated) = title_field(line);
        if truncated {
            warn!(
                line = scanner.line_number(),
                "title line longer than {TITLE_WIDTH} characters, truncated"
            );
        }
        *title = String::from_utf8_lossy(&field).into_owned();
        block.extend_from_slice(&field);
    }

    writer.write_region(Region::Title, &block)?;
    Ok(titles)
}

fn read_constant_count<R: BufRead>(
    scanner: &mut LineScanner<R>,
    what: &str,
) -> Result<usize, Asc2EphError> {
    let count = scanner.scan_line(what, single_integer)?;
    usize::try_from(count)
        .ok()
        .filter(|&count| count > 0)
        .ok_or_else(|| scanner.unexpected(what))
}

/// Check that `constant_count` names and values fit in the binary layout.
fn check_constant_capacity(
    ctx: &ConversionContext,
    constant_count: usize,
) -> Result<(), FormatError> {
    let capacity = PRIMARY_NAME_CAPACITY + OVERFLOW_NAME_CAPACITY;
    if constant_count > capacity {
        return Err(FormatError::NameTableFull {
            constants: constant_count,
            capacity,
        });
    }
    if constant_count > ctx.coefficients_per_record {
        return Err(FormatError::TooManyConstants {
            constants: constant_count,
            ncoeff: ctx.coefficients_per_record,
        });
    }
    let required = required_header_bytes(constant_count, false);
    if required > ctx.record_byte_size() {
        return Err(FormatError::HeaderOverflow {
            required,
            record_size: ctx.record_byte_size(),
        });
    }
    Ok(())
}

/// Read the whole header file and write records 0 and 1.
///
/// Arguments
/// -----------------
/// * `scanner`: The header file, positioned at its first line.
/// * `writer`: Output stream of the binary ephemeris.
///
/// Return
/// ----------
/// * A [`ParsedHeader`] whose context carries the record geometry, the
///   declared time span, the constant count and the resolved positions of
///   `AU`, `EMRAT` and `DENUM`.
/// * The first [`FormatError`] or [`Asc2EphError::EndOfFile`] met; groups
///   must appear in the order 1010, 1030, 1040, 1041, 1050.
///
/// See also
/// ------------
/// * [`write_constant_names`] – GROUP 1040 name table.
/// * [`write_pointer_tables`] – GROUP 1050 pointer tables.
/// * [`DataRecordAssembler::write_constant_values`] – GROUP 1041 values.
pub fn parse_header<R, F>(
    scanner: &mut LineScanner<R>,
    writer: &mut EphemerisWriter<F>,
) -> Result<ParsedHeader, Asc2EphError>
where
    R: BufRead,
    F: Read + Write + Seek,
{
    let mut ctx = read_record_geometry(scanner)?;

    seek_group(scanner, GroupId::Title)?;
    let titles = write_titles(scanner, writer)?;

    seek_group(scanner, GroupId::TimeSpan)?;
    let span = scanner.scan_values("start, end and step", 3)?;
    ctx.time_span = TimeSpan {
        start: span.values[0],
        end: span.values[1],
        step: span.values[2],
    };
    writer.write_region(Region::TimeSpan, &f64_bytes(&ctx.time_span.to_array()))?;

    seek_group(scanner, GroupId::ConstantNames)?;
    let constant_count = read_constant_count(scanner, "constant count")?;
    check_constant_capacity(&ctx, constant_count)?;
    ctx.constant_count = constant_count;
    writer.write_region(Region::ConstantCount, &i32_bytes(&[constant_count as i32]))?;
    write_constant_names(scanner, writer, &mut ctx)?;

    seek_group(scanner, GroupId::ConstantValues)?;
    let value_count = read_constant_count(scanner, "constant count")?;
    if value_count != ctx.constant_count {
        return Err(FormatError::ConstantCountMismatch {
            expected: ctx.constant_count,
            found: value_count,
        }
        .into());
    }
    DataRecordAssembler::write_constant_values(scanner, writer, &ctx)?;

    seek_group(scanner, GroupId::CoefficientPointers)?;
    let pointers = write_pointer_tables(scanner, writer, &mut ctx)?;

    let (start, end) = ctx.time_span.bounds().epochs();
    debug!(
        ncoeff = ctx.coefficients_per_record,
        constants = ctx.constant_count,
        extended_pointers = ctx.extended_pointers,
        %start,
        %end,
        "header parsed"
    );

    Ok(ParsedHeader {
        ctx,
        titles,
        pointers,
    })
}
