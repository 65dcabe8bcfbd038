//! Read-back of a binary JPL ephemeris.
//!
//! Record 0 is decoded the way DE consumers do it: fixed offsets,
//! little-endian values, and a record size derived from the coefficient
//! pointer table rather than stored anywhere in the file.
//!
//! The extended pointer rows (`IPT[13]`, `IPT[14]`) sit right after the
//! last constant name. They are read when they fit in the record size
//! implied by the first 13 rows; absent rows read as zeros and do not
//! change the record size.

use std::io::{Read, Seek, SeekFrom};

use nom::{
    bytes::complete::take,
    combinator::map,
    multi::count,
    number::complete::{le_f64, le_i32},
    IResult, Parser,
};
use serde::Serialize;

use crate::{
    ascii::pointers::{compute_recsize, Ipt},
    asc2eph_errors::Asc2EphError,
    constants::{
        FIRST_DATA_RECORD, NAME_WIDTH, OVERFLOW_NAME_CAPACITY, POINTER_BODIES,
        PRIMARY_NAME_CAPACITY, TITLE_LINES, TITLE_WIDTH,
    },
    context::{JdSpan, TimeSpan},
    layout::{
        extended_pointers_offset, name_slot_offset, record_offset, Region, EXTENDED_POINTERS_SIZE,
    },
};

/// Decoded record 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EphemerisHeader {
    pub titles: Vec<String>,
    /// Constant names, trailing spaces removed, overflow table included.
    pub constant_names: Vec<String>,
    pub time_span: TimeSpan,
    pub constant_count: usize,
    pub au: f64,
    pub emrat: f64,
    pub de_number: i32,
    /// `[offset, ncoeff, nsub]` of the 15 bodies; row 12 is the libration table.
    pub ipt: Ipt,
    pub extended_pointers: bool,
    /// Record size in bytes implied by `ipt`.
    pub record_size: usize,
}

/// Outcome of [`EphemerisReader::verify`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Verification {
    pub data_records: u64,
    pub span: JdSpan,
}

/// Fields of the fixed part of record 0, in file order.
struct FixedHeader {
    titles: Vec<String>,
    names: Vec<String>,
    span: Vec<f64>,
    constant_count: i32,
    au_emrat: Vec<f64>,
    pointers: Vec<i32>,
    de_number: i32,
    librations: Vec<i32>,
}

fn text_fields(input: &[u8], width: usize, n: usize) -> IResult<&[u8], Vec<String>> {
    count(
        map(take(width), |raw: &[u8]| {
            String::from_utf8_lossy(raw).trim_end().to_string()
        }),
        n,
    )
    .parse(input)
}

fn le_f64s(input: &[u8], n: usize) -> IResult<&[u8], Vec<f64>> {
    count(le_f64, n).parse(input)
}

fn le_i32s(input: &[u8], n: usize) -> IResult<&[u8], Vec<i32>> {
    count(le_i32, n).parse(input)
}

fn parse_fixed_header(input: &[u8]) -> IResult<&[u8], FixedHeader> {
    let (input, titles) = text_fields(input, TITLE_WIDTH, TITLE_LINES)?;
    let (input, names) = text_fields(input, NAME_WIDTH, PRIMARY_NAME_CAPACITY)?;
    let (input, span) = le_f64s(input, 3)?;
    let (input, constant_count) = le_i32s(input, 1)?;
    let (input, au_emrat) = le_f64s(input, 2)?;
    let (input, pointers) = le_i32s(input, 3 * POINTER_BODIES)?;
    let (input, de_number) = le_i32s(input, 1)?;
    let (input, librations) = le_i32s(input, 3)?;

    Ok((
        input,
        FixedHeader {
            titles,
            names,
            span,
            constant_count: constant_count[0],
            au_emrat,
            pointers,
            de_number: de_number[0],
            librations,
        },
    ))
}

fn invalid_data(message: String) -> Asc2EphError {
    Asc2EphError::Read(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    ))
}

fn copy_triples(rows: &mut [[i32; 3]], values: &[i32]) {
    for (row, triple) in rows.iter_mut().zip(values.chunks_exact(3)) {
        row.copy_from_slice(triple);
    }
}

#[derive(Debug)]
pub struct EphemerisReader<F> {
    inner: F,
    name: String,
    header: EphemerisHeader,
}

impl<F: Read + Seek> EphemerisReader<F> {
    /// Decode record 0 of `inner`; `name` identifies the file in errors.
    pub fn new(mut inner: F, name: impl Into<String>) -> Result<Self, Asc2EphError> {
        let header = read_header(&mut inner)?;
        Ok(EphemerisReader {
            inner,
            name: name.into(),
            header,
        })
    }

    pub fn header(&self) -> &EphemerisHeader {
        &self.header
    }

    fn read_at(&mut self, offset: u64, length: usize) -> Result<Vec<u8>, Asc2EphError> {
        read_bytes_at(&mut self.inner, offset, length)
    }

    fn record_size(&self) -> u64 {
        self.header.record_size as u64
    }

    /// Number of complete data records in the file.
    pub fn record_count(&mut self) -> Result<u64, Asc2EphError> {
        let length = self
            .inner
            .seek(SeekFrom::End(0))
            .map_err(Asc2EphError::Seek)?;
        let data_start = record_offset(FIRST_DATA_RECORD, self.record_size());
        Ok(length.saturating_sub(data_start) / self.record_size())
    }

    fn record_values(&mut self, record: u64) -> Result<Vec<f64>, Asc2EphError> {
        let size = self.header.record_size;
        let bytes = self.read_at(record_offset(record, self.record_size()), size)?;
        le_f64s(&bytes, size / 8)
            .map(|(_, values)| values)
            .map_err(|_| invalid_data(format!("{}: undecodable record {record}", self.name)))
    }

    /// Values of the constants, in name order (record 1).
    pub fn constant_values(&mut self) -> Result<Vec<f64>, Asc2EphError> {
        let mut values = self.record_values(1)?;
        values.truncate(self.header.constant_count);
        Ok(values)
    }

    /// Coefficients of data record `index` (0-based, record 2 of the file).
    pub fn data_record(&mut self, index: u64) -> Result<Vec<f64>, Asc2EphError> {
        self.record_values(FIRST_DATA_RECORD + index)
    }

    /// `[start, end]` dates of data record `index`.
    pub fn record_span(&mut self, index: u64) -> Result<JdSpan, Asc2EphError> {
        let offset = record_offset(FIRST_DATA_RECORD + index, self.record_size());
        let bytes = self.read_at(offset, 16)?;
        let (_, dates) = le_f64s(&bytes, 2)
            .map_err(|_| invalid_data(format!("{}: undecodable record {index}", self.name)))?;
        Ok(JdSpan::new(dates[0], dates[1]))
    }

    /// Check that the data records form a gapless sequence covering the
    /// time span of record 0.
    ///
    /// Return
    /// ----------
    /// * The number of data records and the span they cover.
    /// * [`Asc2EphError::DataGap`] at the first record that does not start
    ///   where its predecessor ends, [`Asc2EphError::InvalidDateRange`] if
    ///   the records and the header disagree on the covered span.
    pub fn verify(&mut self) -> Result<Verification, Asc2EphError> {
        let records = self.record_count()?;
        if records == 0 {
            return Err(invalid_data(format!("{}: no data record", self.name)));
        }

        let first = self.record_span(0)?;
        let mut previous = first;
        for index in 1..records {
            let span = self.record_span(index)?;
            if span.start != previous.end {
                return Err(Asc2EphError::DataGap {
                    file: self.name.clone(),
                    record: index as i64,
                    previous,
                    found: span,
                });
            }
            previous = span;
        }

        let observed = JdSpan::new(first.start, previous.end);
        let declared = self.header.time_span.bounds();
        if observed != declared {
            return Err(Asc2EphError::InvalidDateRange { declared, observed });
        }

        Ok(Verification {
            data_records: records,
            span: observed,
        })
    }
}

fn read_bytes_at<F: Read + Seek>(
    inner: &mut F,
    offset: u64,
    length: usize,
) -> Result<Vec<u8>, Asc2EphError> {
    inner
        .seek(SeekFrom::Start(offset))
        .map_err(Asc2EphError::Seek)?;
    let mut buffer = vec![0u8; length];
    inner.read_exact(&mut buffer).map_err(Asc2EphError::Read)?;
    Ok(buffer)
}

/// Decode record 0.
///
/// See also
/// ------------
/// * [`compute_recsize`] – Record size from the pointer table.
fn read_header<F: Read + Seek>(inner: &mut F) -> Result<EphemerisHeader, Asc2EphError> {
    let fixed_size = Region::ConstantNames2.offset() as usize;
    let bytes = read_bytes_at(inner, 0, fixed_size)?;
    let (_, fixed) = parse_fixed_header(&bytes)
        .map_err(|_| invalid_data("undecodable binary header".to_string()))?;

    let constant_count = usize::try_from(fixed.constant_count)
        .ok()
        .filter(|&n| n > 0 && n <= PRIMARY_NAME_CAPACITY + OVERFLOW_NAME_CAPACITY)
        .ok_or_else(|| invalid_data(format!("invalid constant count {}", fixed.constant_count)))?;

    let mut constant_names = fixed.names;
    constant_names.truncate(constant_count);
    let overflow = constant_count.saturating_sub(PRIMARY_NAME_CAPACITY);
    if overflow > 0 {
        let offset = name_slot_offset(PRIMARY_NAME_CAPACITY);
        let bytes = read_bytes_at(inner, offset, overflow * NAME_WIDTH)?;
        let (_, names) = text_fields(&bytes, NAME_WIDTH, overflow)
            .map_err(|_| invalid_data("undecodable overflow names".to_string()))?;
        constant_names.extend(names);
    }

    let mut ipt: Ipt = [[0; 3]; 15];
    copy_triples(&mut ipt[..POINTER_BODIES], &fixed.pointers);
    copy_triples(&mut ipt[POINTER_BODIES..POINTER_BODIES + 1], &fixed.librations);

    let base_size = compute_recsize(&ipt) as u64;
    let extended_offset = extended_pointers_offset(constant_count);
    let mut extended_pointers = false;
    if extended_offset + EXTENDED_POINTERS_SIZE <= base_size {
        let bytes = read_bytes_at(inner, extended_offset, EXTENDED_POINTERS_SIZE as usize)?;
        let (_, rows) = le_i32s(&bytes, 6)
            .map_err(|_| invalid_data("undecodable extended pointers".to_string()))?;
        copy_triples(&mut ipt[POINTER_BODIES + 1..], &rows);
        extended_pointers = rows.iter().any(|&v| v != 0);
    }

    let record_size = compute_recsize(&ipt);
    if (record_size as u64) < Region::ConstantNames2.offset() {
        return Err(invalid_data(format!(
            "record size {record_size} implied by the pointer table is too small"
        )));
    }

    Ok(EphemerisHeader {
        titles: fixed.titles,
        constant_names,
        time_span: TimeSpan {
            start: fixed.span[0],
            end: fixed.span[1],
            step: fixed.span[2],
        },
        constant_count,
        au: fixed.au_emrat[0],
        emrat: fixed.au_emrat[1],
        de_number: fixed.de_number,
        ipt,
        extended_pointers,
        record_size,
    })
}
