//! # Conversion context
//!
//! [`ConversionContext`] is the state threaded through one conversion run.
//! It is filled progressively: the header parser sets the record geometry,
//! the declared time span, the constant count and the positions of the
//! distinguished constants; the data record assembler advances the
//! continuity state; finalization narrows the time span to the data
//! actually written.

use std::fmt;

use hifitime::Epoch;
use serde::Serialize;

use crate::{asc2eph_errors::FormatError, constants::DistinguishedConstant};

/// A `[start, end]` interval in Julian days (TDB).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JdSpan {
    pub start: f64,
    pub end: f64,
}

impl JdSpan {
    pub fn new(start: f64, end: f64) -> Self {
        JdSpan { start, end }
    }

    /// A span whose bounds coincide carries no ordering information.
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// Both bounds as calendar epochs, for diagnostics.
    pub fn epochs(&self) -> (Epoch, Epoch) {
        (
            Epoch::from_jde_tdb(self.start),
            Epoch::from_jde_tdb(self.end),
        )
    }
}

impl fmt::Display for JdSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[JD {}, JD {}]", self.start, self.end)
    }
}

/// Declared coverage of the ephemeris (`SS` triple of record 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
    /// Length of one data record, in days.
    pub step: f64,
}

impl TimeSpan {
    pub fn bounds(&self) -> JdSpan {
        JdSpan::new(self.start, self.end)
    }

    pub fn to_array(&self) -> [f64; 3] {
        [self.start, self.end, self.step]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionContext {
    /// `KSIZE` from the header, in 4-byte words.
    pub ksize: usize,
    /// `NCOEFF`: number of doubles in every record.
    pub coefficients_per_record: usize,
    pub time_span: TimeSpan,
    /// `NCON`: number of named constants.
    pub constant_count: usize,
    pub index_of_au: Option<usize>,
    pub index_of_emrat: Option<usize>,
    pub index_of_denum: Option<usize>,
    /// Whether GROUP 1050 carried the two extra DE430+ pointer rows.
    pub extended_pointers: bool,
    /// Span of the last accepted data record, if any.
    pub previous_span: Option<JdSpan>,
    /// Start of the first accepted data record, if any.
    pub first_observed_jd: Option<f64>,
}

impl ConversionContext {
    pub fn new(ksize: usize, coefficients_per_record: usize) -> Self {
        ConversionContext {
            ksize,
            coefficients_per_record,
            time_span: TimeSpan {
                start: 0.0,
                end: 0.0,
                step: 0.0,
            },
            constant_count: 0,
            index_of_au: None,
            index_of_emrat: None,
            index_of_denum: None,
            extended_pointers: false,
            previous_span: None,
            first_observed_jd: None,
        }
    }

    /// Size of one record in bytes, always derived from `NCOEFF`.
    pub fn record_byte_size(&self) -> u64 {
        self.coefficients_per_record as u64 * 8
    }

    pub fn last_observed_jd(&self) -> Option<f64> {
        self.previous_span.map(|span| span.end)
    }

    pub fn distinguished_index(&self, constant: DistinguishedConstant) -> Option<usize> {
        match constant {
            DistinguishedConstant::Au => self.index_of_au,
            DistinguishedConstant::EarthMoonRatio => self.index_of_emrat,
            DistinguishedConstant::DeNumber => self.index_of_denum,
        }
    }

    pub fn set_distinguished_index(&mut self, constant: DistinguishedConstant, index: usize) {
        let slot = match constant {
            DistinguishedConstant::Au => &mut self.index_of_au,
            DistinguishedConstant::EarthMoonRatio => &mut self.index_of_emrat,
            DistinguishedConstant::DeNumber => &mut self.index_of_denum,
        };
        *slot = Some(index);
    }

    pub fn clear_distinguished_indices(&mut self) {
        self.index_of_au = None;
        self.index_of_emrat = None;
        self.index_of_denum = None;
    }

    /// Position of `constant` in record 1, failing if it was never seen
    /// or lies outside the declared constants.
    pub fn resolved_index(&self, constant: DistinguishedConstant) -> Result<usize, FormatError> {
        self.distinguished_index(constant)
            .filter(|&index| index < self.constant_count)
            .ok_or(FormatError::UnresolvedConstant(constant.label()))
    }

    /// Record an accepted data record as the new continuity reference.
    pub fn accept_span(&mut self, span: JdSpan) {
        if self.first_observed_jd.is_none() {
            self.first_observed_jd = Some(span.start);
        }
        self.previous_span = Some(span);
    }
}
