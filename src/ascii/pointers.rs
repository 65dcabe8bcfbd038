//! GROUP 1050: coefficient pointer table.
//!
//! Three lines, one per pointer component (start offset, number of
//! coefficients, number of sub-intervals). Each line holds one column per
//! body: 12 bodies, then the lunar librations, then on DE430+ headers the
//! lunar mantle angular velocity and TT−TDB.
//!
//! ```text
//!      3   171   231   309   342   366   387   405   423   441   753   819   899  1019  1019
//!     14    10    13    11     8     7     6     6     6    13    11    10    10     0     0
//!      4     2     2     1     1     1     1     1     1     8     2     4     4     0     0
//! ```

use std::io::{BufRead, Read, Seek, Write};

use tracing::warn;

use super::scanner::{pointer_fields, LineScanner};
use crate::{
    asc2eph_errors::{Asc2EphError, FormatError},
    binary::writer::{i32_bytes, EphemerisWriter},
    constants::{EXTENDED_POINTER_BODIES, POINTER_BODIES},
    context::ConversionContext,
    layout::{extended_pointers_offset, required_header_bytes, Region},
};

/// Pointer triples of all 15 bodies, indexed by body then component.
pub type Ipt = [[i32; 3]; 15];

#[derive(Debug, Clone, PartialEq)]
pub struct PointerTables {
    /// `[offset, ncoeff, nsub]` for bodies 0..12.
    pub coefficients: [[i32; 3]; POINTER_BODIES],
    /// `[offset, ncoeff, nsub]` for the lunar librations.
    pub librations: [i32; 3],
    /// `[offset, ncoeff, nsub]` for bodies 13 and 14, when present.
    pub extended: Option<[[i32; 3]; EXTENDED_POINTER_BODIES]>,
}

/// Number of components of body `index`.
pub fn dimension(index: usize) -> usize {
    match index {
        0..=10 => 3, // planets, Moon, Sun
        11 => 2,     // nutations
        12 => 3,     // lunar librations
        13 => 3,     // lunar mantle angular velocity
        14 => 1,     // TT-TDB
        _ => 0,
    }
}

/// Size in bytes of one data record as implied by a pointer table.
///
/// Arguments
/// -----------------
/// * `ipt`: Pointer triples of the 15 bodies.
///
/// Return
/// ----------
/// * `(4 + Σ 2·ncoeff·nsub·dim)` 4-byte words, in bytes. The 4 words hold
///   the record start and end dates.
pub fn compute_recsize(ipt: &Ipt) -> usize {
    let kernel_size: usize = 4 + ipt
        .iter()
        .enumerate()
        .map(|(i, body)| {
            let n_coeffs = body[1].max(0) as usize;
            let n_subintervals = body[2].max(0) as usize;
            2 * n_coeffs * n_subintervals * dimension(i)
        })
        .sum::<usize>();

    kernel_size * 4
}

impl PointerTables {
    /// The 15-body table, with zero triples for absent extended bodies.
    pub fn ipt(&self) -> Ipt {
        let mut ipt = [[0; 3]; 15];
        ipt[..POINTER_BODIES].copy_from_slice(&self.coefficients);
        ipt[POINTER_BODIES] = self.librations;
        if let Some(extended) = self.extended {
            ipt[POINTER_BODIES + 1..].copy_from_slice(&extended);
        }
        ipt
    }

    pub fn implied_record_size(&self) -> usize {
        compute_recsize(&self.ipt())
    }
}

/// Read the three lines of GROUP 1050.
///
/// Each line must hold at least 12 pointers followed by the libration
/// pointer, else [`FormatError::PointerLine`]. The extended table is kept
/// only when all three lines carry 15 columns.
pub fn read_pointer_tables<R: BufRead>(
    scanner: &mut LineScanner<R>,
) -> Result<PointerTables, Asc2EphError> {
    let mut coefficients = [[0; 3]; POINTER_BODIES];
    let mut librations = [0; 3];
    let mut extended = [[0; 3]; EXTENDED_POINTER_BODIES];
    let mut has_extended = true;

    for component in 0..3 {
        let line = scanner.require_line("coefficient pointers")?;
        let fields = pointer_fields(line).map(|(_, f)| f).unwrap_or_default();

        if fields.len() < POINTER_BODIES + 1 {
            return Err(FormatError::PointerLine {
                file: scanner.name().to_string(),
                line: scanner.line_number(),
            }
            .into());
        }

        // column-major: one column per body
        for (body, value) in fields.iter().take(POINTER_BODIES).enumerate() {
            coefficients[body][component] = *value;
        }
        librations[component] = fields[POINTER_BODIES];

        if fields.len() >= POINTER_BODIES + 1 + EXTENDED_POINTER_BODIES {
            for (body, value) in fields[POINTER_BODIES + 1..]
                .iter()
                .take(EXTENDED_POINTER_BODIES)
                .enumerate()
            {
                extended[body][component] = *value;
            }
        } else {
            has_extended = false;
        }
    }

    Ok(PointerTables {
        coefficients,
        librations,
        extended: has_extended.then_some(extended),
    })
}

/// Read GROUP 1050 and write the pointer tables to record 0.
///
/// The extended table, when present, is written right after the last
/// constant name. Its presence is recorded in `ctx`.
pub fn write_pointer_tables<R, F>(
    scanner: &mut LineScanner<R>,
    writer: &mut EphemerisWriter<F>,
    ctx: &mut ConversionContext,
) -> Result<PointerTables, Asc2EphError>
where
    R: BufRead,
    F: Read + Write + Seek,
{
    let tables = read_pointer_tables(scanner)?;

    let flat: Vec<i32> = tables.coefficients.iter().flatten().copied().collect();
    writer.write_region(Region::CoefficientPointers, &i32_bytes(&flat))?;
    writer.write_region(Region::LibrationPointers, &i32_bytes(&tables.librations))?;

    if let Some(extended) = tables.extended {
        let required = required_header_bytes(ctx.constant_count, true);
        if required > ctx.record_byte_size() {
            return Err(FormatError::HeaderOverflow {
                required,
                record_size: ctx.record_byte_size(),
            }
            .into());
        }
        let flat: Vec<i32> = extended.iter().flatten().copied().collect();
        writer.write_at(extended_pointers_offset(ctx.constant_count), &i32_bytes(&flat))?;
        ctx.extended_pointers = true;
    }

    let implied = tables.implied_record_size() as u64;
    if implied != ctx.record_byte_size() {
        warn!(
            implied,
            declared = ctx.record_byte_size(),
            "record size implied by the coefficient pointers differs from NCOEFF"
        );
    }

    Ok(tables)
}
