//! The binary JPL ephemeris file.
//!
//! - [`writer`] — Positioned little-endian output.
//! - [`finalize`] — Back-patching of record 0 after the data records.
//! - [`reader`] — Read-back and verification of a produced file.

pub mod finalize;
pub mod reader;
pub mod writer;
