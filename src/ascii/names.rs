//! GROUP 1040: constant name table.
//!
//! Names are 6 characters wide, padded with spaces and preceded by two
//! spaces, ten per 80-column line. The first 400 go to
//! [`Region::ConstantNames1`], the remaining ones to
//! [`Region::ConstantNames2`]. While writing, the positions of `AU`,
//! `EMRAT` and `DENUM` are recorded in the context; they tell where the
//! values of those constants sit in record 1.

use std::io::{BufRead, Read, Seek, Write};

use super::scanner::LineScanner;
use crate::{
    asc2eph_errors::{Asc2EphError, FormatError},
    binary::writer::EphemerisWriter,
    constants::{
        DistinguishedConstant, NAMES_PER_LINE, NAME_FIELD_WIDTH, NAME_LINE_WIDTH, NAME_WIDTH,
        PRIMARY_NAME_CAPACITY,
    },
    context::ConversionContext,
    layout::Region,
};

/// Read `ctx.constant_count` names and write them into the name regions.
///
/// Arguments
/// -----------------
/// * `scanner`: Header stream positioned on the first name line.
/// * `writer`: Output stream.
/// * `ctx`: Context holding the constant count; receives the indices of
///   the distinguished constants.
///
/// Return
/// ----------
/// * `Ok(())` once every name has been written and `AU`, `EMRAT` and
///   `DENUM` have all been found.
/// * [`FormatError::NameLineLength`] for a line that is not 80 characters wide,
///   [`FormatError::UnresolvedConstant`] if a distinguished constant is missing,
///   [`Asc2EphError::EndOfFile`] if the header ends early.
pub fn write_constant_names<R, F>(
    scanner: &mut LineScanner<R>,
    writer: &mut EphemerisWriter<F>,
    ctx: &mut ConversionContext,
) -> Result<(), Asc2EphError>
where
    R: BufRead,
    F: Read + Write + Seek,
{
    ctx.clear_distinguished_indices();

    let total = ctx.constant_count;
    // Unused primary slots stay blank names.
    let mut primary = vec![b' '; PRIMARY_NAME_CAPACITY * NAME_WIDTH];
    let mut overflow =
        Vec::with_capacity(total.saturating_sub(PRIMARY_NAME_CAPACITY) * NAME_WIDTH);

    let mut index = 0;
    while index < total {
        let line = scanner.require_line("constant names")?;
        let width = line.len();
        if width != NAME_LINE_WIDTH {
            return Err(FormatError::NameLineLength {
                file: scanner.name().to_string(),
                line: scanner.line_number(),
                found: width,
            }
            .into());
        }

        for field in line
            .as_bytes()
            .chunks_exact(NAME_FIELD_WIDTH)
            .take(NAMES_PER_LINE)
        {
            if index == total {
                break;
            }
            let name = &field[NAME_FIELD_WIDTH - NAME_WIDTH..];

            if let Some(constant) = DistinguishedConstant::from_name(name) {
                ctx.set_distinguished_index(constant, index);
            }

            if index < PRIMARY_NAME_CAPACITY {
                primary[index * NAME_WIDTH..(index + 1) * NAME_WIDTH].copy_from_slice(name);
            } else {
                overflow.extend_from_slice(name);
            }
            index += 1;
        }
    }

    writer.write_region(Region::ConstantNames1, &primary)?;
    if !overflow.is_empty() {
        writer.write_region(Region::ConstantNames2, &overflow)?;
    }

    for constant in DistinguishedConstant::ALL {
        ctx.resolved_index(constant)?;
    }
    Ok(())
}
