//! Reading of the JPL ASCII ephemeris files.
//!
//! - [`scanner`] — Line-oriented scanning with nom field parsers and
//!   Fortran `D` exponent handling.
//! - [`group`] — Location of the `GROUP nnnn` sections of the header.
//! - [`header`] — The header file as a whole: geometry line, titles, time
//!   span, constants and pointer tables (records 0 and 1).
//! - [`names`] — GROUP 1040 name table and the distinguished constants.
//! - [`pointers`] — GROUP 1050 coefficient pointer tables.
//! - [`data_records`] — Coefficient records of the data files, assembled
//!   into the binary file from record 2 onwards.
//! - [`continuity`] — Classification of each record against the previous one.

pub mod continuity;
pub mod data_records;
pub mod group;
pub mod header;
pub mod names;
pub mod pointers;
pub mod scanner;
