//! Back-patching of record 0 once every data record is written.
//!
//! The header groups only declare the coverage of the ephemeris. After the
//! data files are consumed the time span is narrowed to the records
//! actually written, and the values of `AU`, `EMRAT` and `DENUM` are copied
//! from record 1 into their dedicated header fields.

use std::io::{Read, Seek, Write};

use serde::Serialize;
use tracing::info;

use super::writer::{f64_bytes, i32_bytes, EphemerisWriter};
use crate::{
    asc2eph_errors::Asc2EphError,
    constants::{DistinguishedConstant, FIRST_DATA_RECORD},
    context::{ConversionContext, JdSpan, TimeSpan},
    layout::{record_offset, value_offset, Region},
};

/// Header values written by [`finalize`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinalHeader {
    pub span: JdSpan,
    pub au: f64,
    pub emrat: f64,
    pub de_number: i32,
}

/// Narrow the time span and copy the distinguished constants into record 0.
///
/// Arguments
/// -----------------
/// * `writer`: Output stream holding records 0, 1 and the data records.
/// * `ctx`: Context after the last data file; its time span is replaced by
///   the observed one.
///
/// Return
/// ----------
/// * The final header values.
/// * [`Asc2EphError::InvalidDateRange`] if the observed span leaves the
///   declared one, [`Asc2EphError::Read`] if no data record was written or
///   record 2 does not start where the first accepted record did, or the
///   seek/write failure met while patching.
pub fn finalize<F>(
    writer: &mut EphemerisWriter<F>,
    ctx: &mut ConversionContext,
) -> Result<FinalHeader, Asc2EphError>
where
    F: Read + Write + Seek,
{
    let record_size = ctx.record_byte_size();

    let (expected_first, last) = ctx
        .first_observed_jd
        .zip(ctx.last_observed_jd())
        .ok_or_else(|| {
            Asc2EphError::Read(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "no data record written",
            ))
        })?;
    let first = writer.read_f64_at(record_offset(FIRST_DATA_RECORD, record_size))?;
    if first != expected_first {
        return Err(Asc2EphError::Read(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("first data record starts at {first}, {expected_first} was written"),
        )));
    }

    let declared = ctx.time_span.bounds();
    let observed = JdSpan::new(first, last);
    if observed.start < declared.start || observed.end > declared.end {
        return Err(Asc2EphError::InvalidDateRange { declared, observed });
    }

    ctx.time_span = TimeSpan {
        start: observed.start,
        end: observed.end,
        step: ctx.time_span.step,
    };
    writer.write_region(Region::TimeSpan, &f64_bytes(&ctx.time_span.to_array()))?;
    writer.write_region(
        Region::ConstantCount,
        &i32_bytes(&[ctx.constant_count as i32]),
    )?;

    let source = |constant: DistinguishedConstant| -> Result<u64, Asc2EphError> {
        Ok(value_offset(1, ctx.resolved_index(constant)?, record_size))
    };
    let au = writer.copy_f64(source(DistinguishedConstant::Au)?, Region::Au.offset())?;
    let emrat = writer.copy_f64(
        source(DistinguishedConstant::EarthMoonRatio)?,
        Region::EarthMoonRatio.offset(),
    )?;
    let de_number = writer.copy_f64_as_i32(
        source(DistinguishedConstant::DeNumber)?,
        Region::DeNumber.offset(),
    )?;
    writer.flush()?;

    let (start, end) = observed.epochs();
    info!(
        de_number,
        %start,
        %end,
        au,
        emrat,
        "binary header finalized"
    );

    Ok(FinalHeader {
        span: observed,
        au,
        emrat,
        de_number,
    })
}
