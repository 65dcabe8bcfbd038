use camino::Utf8PathBuf;
use thiserror::Error;

use crate::context::JdSpan;

/// Structural mismatches found while reading the ASCII header or data files.
///
/// Variants
/// -----------------
/// * `UnexpectedLine` – A line did not hold the fields expected at that point.
/// * `NameLineLength` – A constant-name line is not exactly 80 characters wide.
/// * `MissingGroup` – The header ended before the requested `GROUP` marker.
/// * `UnexpectedGroup` – A `GROUP` marker was found but not the requested one.
/// * `TruncatedGroup` – A `GROUP` marker is not followed by its separator line.
/// * `ConstantCountMismatch` – Groups 1040 and 1041 disagree on the number of constants.
/// * `UnresolvedConstant` – `AU`, `EMRAT` or `DENUM` is missing from the name table.
/// * `CoefficientCountMismatch` – A data record does not hold `NCOEFF` values.
/// * `PointerLine` – A group 1050 line has fewer than 13 integers.
/// * `InvalidRecordSize` – `KSIZE`/`NCOEFF` are inconsistent or too small.
/// * `HeaderOverflow` – Record 0 would not fit in one record.
/// * `TooManyConstants` – The constant values would not fit in record 1.
/// * `NameTableFull` – More constants than the two name tables can hold.
#[derive(Error, Debug, PartialEq)]
pub enum FormatError {
    #[error("{file}:{line}: expected {expected}")]
    UnexpectedLine {
        file: String,
        line: usize,
        expected: String,
    },

    #[error("{file}:{line}: constant name line must be 80 characters wide, found {found}")]
    NameLineLength {
        file: String,
        line: usize,
        found: usize,
    },

    #[error("GROUP {0} not found")]
    MissingGroup(u32),

    #[error("expected GROUP {expected}, found GROUP {found}")]
    UnexpectedGroup { expected: u32, found: u32 },

    #[error("GROUP {0} is not followed by a separator line")]
    TruncatedGroup(u32),

    #[error("GROUP 1041 declares {found} constants but GROUP 1040 declared {expected}")]
    ConstantCountMismatch { expected: usize, found: usize },

    #[error("constant {0:?} not found in the constant name table")]
    UnresolvedConstant(&'static str),

    #[error("record {record}: expected {expected} coefficients, found {found}")]
    CoefficientCountMismatch {
        record: i64,
        expected: usize,
        found: i64,
    },

    #[error("{file}:{line}: coefficient pointer line needs 12 pointers and a libration pointer")]
    PointerLine { file: String, line: usize },

    #[error("invalid record size: KSIZE={ksize}, NCOEFF={ncoeff}")]
    InvalidRecordSize { ksize: i64, ncoeff: i64 },

    #[error("header needs {required} bytes but a record only holds {record_size}")]
    HeaderOverflow { required: u64, record_size: u64 },

    #[error("{constants} constant values do not fit in a record of {ncoeff} coefficients")]
    TooManyConstants { constants: usize, ncoeff: usize },

    #[error("{constants} constant names exceed the {capacity} slots of the name tables")]
    NameTableFull { constants: usize, capacity: usize },
}

#[derive(Error, Debug)]
pub enum Asc2EphError {
    #[error("Unexpected end of file while reading {0}")]
    EndOfFile(String),

    #[error("Unable to create binary ephemeris file {path}: {source}")]
    FileCreate {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("Unable to open input file {path}: {source}")]
    FileOpen {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid ASCII ephemeris format: {0}")]
    Format(#[from] FormatError),

    #[error("Unable to seek in ephemeris file: {0}")]
    Seek(std::io::Error),

    #[error("Unable to read ephemeris file: {0}")]
    Read(std::io::Error),

    #[error("Unable to write ephemeris file: {0}")]
    Write(std::io::Error),

    #[error(
        "Data gap in {file} at record {record}: previous record covers {previous}, found {found}"
    )]
    DataGap {
        file: String,
        record: i64,
        previous: JdSpan,
        found: JdSpan,
    },

    #[error("Data range {observed} is not within the declared range {declared}")]
    InvalidDateRange { declared: JdSpan, observed: JdSpan },

    #[error("Usage error: {0}")]
    Usage(String),
}

impl Asc2EphError {
    /// Process exit code reported by the command line tool for this error.
    ///
    /// Codes follow the order of the historical converter error list,
    /// shifted so that `1` stays free for generic failures and `2` matches
    /// the usage code used by `clap`.
    pub fn exit_code(&self) -> u8 {
        match self {
            Asc2EphError::Usage(_) => 2,
            Asc2EphError::EndOfFile(_) => 3,
            Asc2EphError::FileCreate { .. } => 4,
            Asc2EphError::FileOpen { .. } => 5,
            Asc2EphError::Format(_) => 6,
            Asc2EphError::Seek(_) => 7,
            Asc2EphError::Read(_) => 8,
            Asc2EphError::DataGap { .. } => 9,
            Asc2EphError::Write(_) => 10,
            Asc2EphError::InvalidDateRange { .. } => 11,
        }
    }
}

impl PartialEq for Asc2EphError {
    fn eq(&self, other: &Self) -> bool {
        use Asc2EphError::*;
        match (self, other) {
            (EndOfFile(a), EndOfFile(b)) => a == b,
            (FileCreate { path: a, .. }, FileCreate { path: b, .. }) => a == b,
            (FileOpen { path: a, .. }, FileOpen { path: b, .. }) => a == b,
            (Format(a), Format(b)) => a == b,

            // io::Error is not comparable: same variant means equal
            (Seek(_), Seek(_)) => true,
            (Read(_), Read(_)) => true,
            (Write(_), Write(_)) => true,

            (
                DataGap {
                    file: fa,
                    record: ra,
                    previous: pa,
                    found: na,
                },
                DataGap {
                    file: fb,
                    record: rb,
                    previous: pb,
                    found: nb,
                },
            ) => fa == fb && ra == rb && pa == pb && na == nb,
            (
                InvalidDateRange {
                    declared: da,
                    observed: oa,
                },
                InvalidDateRange {
                    declared: db,
                    observed: ob,
                },
            ) => da == db && oa == ob,
            (Usage(a), Usage(b)) => a == b,

            _ => false,
        }
    }
}

#[cfg(test)]
mod test_asc2eph_errors {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let io = || std::io::Error::other("boom");
        let errors = [
            Asc2EphError::Usage("missing data file".into()),
            Asc2EphError::EndOfFile("header".into()),
            Asc2EphError::FileCreate {
                path: "JPLEPH".into(),
                source: io(),
            },
            Asc2EphError::FileOpen {
                path: "header.440".into(),
                source: io(),
            },
            Asc2EphError::Format(FormatError::MissingGroup(1010)),
            Asc2EphError::Seek(io()),
            Asc2EphError::Read(io()),
            Asc2EphError::DataGap {
                file: "ascp01550.440".into(),
                record: 2,
                previous: JdSpan::new(0.0, 32.0),
                found: JdSpan::new(64.0, 96.0),
            },
            Asc2EphError::Write(io()),
            Asc2EphError::InvalidDateRange {
                declared: JdSpan::new(0.0, 32.0),
                observed: JdSpan::new(0.0, 64.0),
            },
        ];

        let mut codes: Vec<u8> = errors.iter().map(Asc2EphError::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|&c| c > 1));
    }

    #[test]
    fn test_io_variants_compare_by_kind() {
        assert_eq!(
            Asc2EphError::Seek(std::io::Error::other("a")),
            Asc2EphError::Seek(std::io::Error::other("b"))
        );
        assert_ne!(
            Asc2EphError::Seek(std::io::Error::other("a")),
            Asc2EphError::Write(std::io::Error::other("a"))
        );
    }

    #[test]
    fn test_format_error_display() {
        let err: Asc2EphError = FormatError::UnexpectedGroup {
            expected: 1030,
            found: 1040,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Invalid ASCII ephemeris format: expected GROUP 1030, found GROUP 1040"
        );
    }
}
