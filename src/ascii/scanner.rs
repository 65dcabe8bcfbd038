//! Line scanning primitives for the ASCII ephemeris files.
//!
//! A [`LineScanner`] owns its reader and its line buffer, so several files
//! can be scanned independently. Each `scan_*` call consumes exactly one
//! line and either returns the parsed fields or fails:
//!
//! * end of input → [`Asc2EphError::EndOfFile`],
//! * fields not matching the expected pattern → [`FormatError::UnexpectedLine`].
//!
//! Numeric fields written by Fortran use `D` as exponent marker
//! (`0.2287184500000000000D+07`); [`parse_fortran_values`] rewrites it to
//! `E` before parsing.

use std::io::BufRead;

use nom::{
    bytes::complete::tag,
    character::complete::{i32 as parse_i32, i64 as parse_i64, space0, space1, u32 as parse_u32},
    multi::{many0, many_m_n},
    number::complete::double,
    sequence::preceded,
    IResult, Parser,
};

use crate::{
    asc2eph_errors::{Asc2EphError, FormatError},
    constants::VALUES_PER_LINE,
};

/// Values found on one numeric line: up to three doubles and how many were parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuesLine {
    pub values: [f64; VALUES_PER_LINE],
    pub len: usize,
}

impl ValuesLine {
    pub fn as_slice(&self) -> &[f64] {
        &self.values[..self.len]
    }
}

pub struct LineScanner<R> {
    reader: R,
    raw: Vec<u8>,
    line: String,
    line_number: usize,
    name: String,
}

impl<R: BufRead> LineScanner<R> {
    /// Wrap `reader`; `name` identifies the stream in diagnostics.
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        LineScanner {
            reader,
            raw: Vec::with_capacity(128),
            line: String::with_capacity(128),
            line_number: 0,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 1-based number of the last line read.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read the next line, without its terminator. `None` at end of input.
    ///
    /// A line that is not valid UTF-8 is a [`FormatError::UnexpectedLine`].
    pub fn next_line(&mut self) -> Result<Option<&str>, Asc2EphError> {
        self.raw.clear();
        let read = self
            .reader
            .read_until(b'\n', &mut self.raw)
            .map_err(Asc2EphError::Read)?;
        if read == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        self.line.clear();
        match std::str::from_utf8(&self.raw) {
            Ok(text) => self.line.push_str(text),
            Err(_) => return Err(self.unexpected("UTF-8 text")),
        }
        Ok(Some(self.line.trim_end_matches(['\n', '\r'])))
    }

    /// Read the next line, failing with [`Asc2EphError::EndOfFile`] if there is none.
    pub fn require_line(&mut self, what: &str) -> Result<&str, Asc2EphError> {
        if self.next_line()?.is_none() {
            return Err(Asc2EphError::EndOfFile(format!("{} ({what})", self.name)));
        }
        Ok(self.line.trim_end_matches(['\n', '\r']))
    }

    /// Read one line and parse it with `parser`.
    ///
    /// Arguments
    /// -----------------
    /// * `what`: Human readable description of the expected fields, used in errors.
    /// * `parser`: nom parser describing the line pattern. Trailing text after
    ///   the parsed fields is ignored.
    ///
    /// Return
    /// ----------
    /// * The parsed fields, [`Asc2EphError::EndOfFile`] if no line is left,
    ///   or a [`FormatError::UnexpectedLine`] if the pattern does not match.
    pub fn scan_line<T, P>(&mut self, what: &str, mut parser: P) -> Result<T, Asc2EphError>
    where
        P: FnMut(&str) -> IResult<&str, T>,
    {
        self.require_line(what)?;
        let line = self.line.trim_end_matches(['\n', '\r']);
        match parser(line) {
            Ok((_, value)) => Ok(value),
            Err(_) => Err(self.unexpected(what)),
        }
    }

    /// Read one line of Fortran floating values holding at least `min` of them.
    pub fn scan_values(&mut self, what: &str, min: usize) -> Result<ValuesLine, Asc2EphError> {
        self.require_line(what)?;
        match parse_fortran_values(&self.line) {
            Some(values) if values.len >= min => Ok(values),
            _ => Err(self.unexpected(what)),
        }
    }

    /// Format error pointing at the current line.
    pub fn unexpected(&self, what: &str) -> Asc2EphError {
        FormatError::UnexpectedLine {
            file: self.name.clone(),
            line: self.line_number,
            expected: what.to_string(),
        }
        .into()
    }
}

/// Parse up to three whitespace separated floating values, accepting
/// Fortran `D` exponents. `None` if the line does not start with a number.
pub fn parse_fortran_values(line: &str) -> Option<ValuesLine> {
    let normalized = line.replace('D', "E");
    let (_, parsed) = many_m_n(
        1,
        VALUES_PER_LINE,
        preceded(space0, double::<&str, nom::error::Error<&str>>),
    )
    .parse(normalized.as_str())
    .ok()?;

    let mut values = [0.0; VALUES_PER_LINE];
    values[..parsed.len()].copy_from_slice(&parsed);
    Some(ValuesLine {
        values,
        len: parsed.len(),
    })
}

/// `KSIZE= 2036    NCOEFF= 1018`
pub fn record_size_fields(input: &str) -> IResult<&str, (i64, i64)> {
    let (input, _) = (tag("KSIZE="), space0).parse(input)?;
    let (input, ksize) = parse_i64(input)?;
    let (input, _) = (space0, tag("NCOEFF="), space0).parse(input)?;
    let (input, ncoeff) = parse_i64(input)?;
    Ok((input, (ksize, ncoeff)))
}

/// `GROUP   1040`
pub fn group_marker(input: &str) -> IResult<&str, u32> {
    preceded((tag("GROUP"), space1), parse_u32).parse(input)
}

/// A single integer, possibly indented.
pub fn single_integer(input: &str) -> IResult<&str, i64> {
    preceded(space0, parse_i64).parse(input)
}

/// Data record header: `     1  1018` (record number, coefficient count).
pub fn record_header_fields(input: &str) -> IResult<&str, (i64, i64)> {
    (preceded(space0, parse_i64), preceded(space1, parse_i64)).parse(input)
}

/// All leading integers of a pointer table line.
pub fn pointer_fields(input: &str) -> IResult<&str, Vec<i32>> {
    many0(preceded(space0, parse_i32)).parse(input)
}
