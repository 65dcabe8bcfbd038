//! Positioned little-endian output for the binary ephemeris.
//!
//! [`EphemerisWriter`] wraps the output stream and classifies every I/O
//! failure as a seek, read or write failure, so that callers only deal with
//! [`Asc2EphError`]. The stream must be readable too: finalization reads
//! values back from record 1 and record 2.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::{asc2eph_errors::Asc2EphError, layout::Region};

/// Encode doubles as consecutive little-endian bytes.
pub fn f64_bytes(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Encode integers as consecutive little-endian bytes.
pub fn i32_bytes(values: &[i32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[derive(Debug)]
pub struct EphemerisWriter<F> {
    inner: F,
}

impl<F: Read + Write + Seek> EphemerisWriter<F> {
    pub fn new(inner: F) -> Self {
        EphemerisWriter { inner }
    }

    pub fn into_inner(self) -> F {
        self.inner
    }

    pub fn seek_to(&mut self, offset: u64) -> Result<(), Asc2EphError> {
        self.inner
            .seek(SeekFrom::Start(offset))
            .map(|_| ())
            .map_err(Asc2EphError::Seek)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Asc2EphError> {
        self.inner.write_all(bytes).map_err(Asc2EphError::Write)
    }

    /// Seek to `offset` and write `bytes` there.
    pub fn write_at(&mut self, offset: u64, bytes: &[u8]) -> Result<(), Asc2EphError> {
        self.seek_to(offset)?;
        self.write_bytes(bytes)
    }

    /// Write `bytes` at the start of `region`.
    ///
    /// The caller is responsible for not writing past the end of the region;
    /// this is only checked in debug builds.
    pub fn write_region(&mut self, region: Region, bytes: &[u8]) -> Result<(), Asc2EphError> {
        debug_assert!(bytes.len() as u64 <= region.size(), "{region:?} overflow");
        self.write_at(region.offset(), bytes)
    }

    pub fn write_f64s_at(&mut self, offset: u64, values: &[f64]) -> Result<(), Asc2EphError> {
        self.write_at(offset, &f64_bytes(values))
    }

    pub fn read_f64_at(&mut self, offset: u64) -> Result<f64, Asc2EphError> {
        self.seek_to(offset)?;
        let mut buffer = [0u8; 8];
        self.inner
            .read_exact(&mut buffer)
            .map_err(Asc2EphError::Read)?;
        Ok(f64::from_le_bytes(buffer))
    }

    /// Read the double at `source` and write it back at `destination`.
    pub fn copy_f64(&mut self, source: u64, destination: u64) -> Result<f64, Asc2EphError> {
        let value = self.read_f64_at(source)?;
        self.write_at(destination, &value.to_le_bytes())?;
        Ok(value)
    }

    /// Read the double at `source` and write it, truncated toward zero, as
    /// an `i32` at `destination`.
    pub fn copy_f64_as_i32(&mut self, source: u64, destination: u64) -> Result<i32, Asc2EphError> {
        let value = self.read_f64_at(source)?.trunc() as i32;
        self.write_at(destination, &value.to_le_bytes())?;
        Ok(value)
    }

    pub fn flush(&mut self) -> Result<(), Asc2EphError> {
        self.inner.flush().map_err(Asc2EphError::Write)
    }
}
