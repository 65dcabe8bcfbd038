//! # Conversion driver
//!
//! Ties the stages together: header → data files in lexical order →
//! finalization. [`Conversion`] works on any seekable output stream;
//! [`convert`] handles the files, including the optional write to a
//! temporary path renamed over the output on success.
//!
//! ## Example
//!
//! ```rust, no_run
//! use asc2eph::convert::{convert, ConvertOptions};
//! use camino::Utf8Path;
//!
//! let options = ConvertOptions {
//!     output: "de440.bin".into(),
//!     atomic: true,
//! };
//! let summary = convert(
//!     Utf8Path::new("header.440"),
//!     &["ascp01550.440", "ascp01650.440"],
//!     &options,
//! )?;
//! println!("{} records, DE{}", summary.records_written, summary.de_number);
//! # Ok::<(), asc2eph::asc2eph_errors::Asc2EphError>(())
//! ```

use std::{
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, Read, Seek, Write},
};

use camino::{Utf8Path, Utf8PathBuf};
use itertools::Itertools;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    ascii::{
        data_records::{DataRecordAssembler, FileStats},
        header::{parse_header, ParsedHeader},
        scanner::LineScanner,
    },
    asc2eph_errors::Asc2EphError,
    binary::{finalize::finalize, writer::EphemerisWriter},
    constants::DEFAULT_OUTPUT,
    context::{ConversionContext, JdSpan},
};

/// Output settings of a conversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Path of the binary artifact, overwritten if present.
    pub output: Utf8PathBuf,
    /// Write to `<output>.tmp` and rename it over `output` only on success.
    pub atomic: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            output: Utf8PathBuf::from(DEFAULT_OUTPUT),
            atomic: false,
        }
    }
}

/// What a successful conversion produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Utf8PathBuf>,
    pub de_number: i32,
    pub au: f64,
    pub emrat: f64,
    /// Span covered by the data records, as written in record 0.
    pub span: JdSpan,
    pub step: f64,
    pub constant_count: usize,
    pub coefficients_per_record: usize,
    pub records_written: u64,
    pub duplicates_skipped: u64,
    pub files: Vec<FileStats>,
}

/// A conversion in progress over an output stream.
pub struct Conversion<F> {
    writer: EphemerisWriter<F>,
    header: ParsedHeader,
    assembler: DataRecordAssembler,
    files: Vec<FileStats>,
}

impl<F: Read + Write + Seek> Conversion<F> {
    /// Parse the header and write records 0 and 1 to `output`.
    pub fn start<R: BufRead>(
        header: &mut LineScanner<R>,
        output: F,
    ) -> Result<Self, Asc2EphError> {
        let mut writer = EphemerisWriter::new(output);
        let header = parse_header(header, &mut writer)?;
        Ok(Conversion {
            writer,
            header,
            assembler: DataRecordAssembler::new(),
            files: Vec::new(),
        })
    }

    pub fn context(&self) -> &ConversionContext {
        &self.header.ctx
    }

    pub fn header(&self) -> &ParsedHeader {
        &self.header
    }

    /// Append the records of one data file.
    pub fn append<R: BufRead>(
        &mut self,
        data: &mut LineScanner<R>,
    ) -> Result<&FileStats, Asc2EphError> {
        let stats = self
            .assembler
            .append_file(data, &mut self.writer, &mut self.header.ctx)?;
        self.files.push(stats);
        Ok(&self.files[self.files.len() - 1])
    }

    /// Patch record 0 and hand back the output stream.
    pub fn finish(mut self) -> Result<(ConversionSummary, F), Asc2EphError> {
        let ctx = &mut self.header.ctx;
        let final_header = finalize(&mut self.writer, ctx)?;

        let summary = ConversionSummary {
            output: None,
            de_number: final_header.de_number,
            au: final_header.au,
            emrat: final_header.emrat,
            span: final_header.span,
            step: ctx.time_span.step,
            constant_count: ctx.constant_count,
            coefficients_per_record: ctx.coefficients_per_record,
            records_written: self.assembler.records_written(),
            duplicates_skipped: self.assembler.duplicates_skipped(),
            files: self.files,
        };
        Ok((summary, self.writer.into_inner()))
    }
}

fn open_text(path: &Utf8Path) -> Result<LineScanner<BufReader<File>>, Asc2EphError> {
    let file = File::open(path).map_err(|source| Asc2EphError::FileOpen {
        path: path.to_owned(),
        source,
    })?;
    Ok(LineScanner::new(BufReader::new(file), path.as_str()))
}

/// Temporary path used by atomic conversions.
pub fn temporary_output(output: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{output}.tmp"))
}

fn convert_into(
    header: &Utf8Path,
    data_files: &[&Utf8Path],
    output: &Utf8Path,
) -> Result<ConversionSummary, Asc2EphError> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(output)
        .map_err(|source| Asc2EphError::FileCreate {
            path: output.to_owned(),
            source,
        })?;

    let mut conversion = {
        let mut scanner = open_text(header)?;
        Conversion::start(&mut scanner, file)?
    };

    for path in data_files {
        let mut scanner = open_text(path)?;
        conversion.append(&mut scanner)?;
    }

    let (summary, file) = conversion.finish()?;
    file.sync_all().map_err(Asc2EphError::Write)?;
    Ok(summary)
}

/// Convert an ASCII header and its data files into a binary ephemeris.
///
/// Arguments
/// -----------------
/// * `header`: The ASCII header file (`header.440`, ...).
/// * `data_files`: At least one data file (`ascp01550.440`, ...). They are
///   processed in lexical order of their paths, whatever the order given.
/// * `options`: Output path and atomic mode.
///
/// Return
/// ----------
/// * The [`ConversionSummary`] of the run.
/// * [`Asc2EphError::Usage`] without data file, otherwise the first error
///   met. Without atomic mode, whatever was written before the error stays
///   in the output file.
pub fn convert<P: AsRef<Utf8Path>>(
    header: &Utf8Path,
    data_files: &[P],
    options: &ConvertOptions,
) -> Result<ConversionSummary, Asc2EphError> {
    if data_files.is_empty() {
        return Err(Asc2EphError::Usage(
            "at least one data file is required".to_string(),
        ));
    }

    let ordered: Vec<&Utf8Path> = data_files
        .iter()
        .map(AsRef::<Utf8Path>::as_ref)
        .sorted_by(|a, b| a.as_str().cmp(b.as_str()))
        .collect();

    let target = if options.atomic {
        temporary_output(&options.output)
    } else {
        options.output.clone()
    };

    let result = convert_into(header, &ordered, &target);

    let mut summary = match result {
        Ok(summary) => summary,
        Err(err) => {
            if options.atomic {
                if let Err(cleanup) = fs::remove_file(&target) {
                    warn!(path = %target, error = %cleanup, "could not remove temporary output");
                }
            }
            return Err(err);
        }
    };

    if options.atomic {
        fs::rename(&target, &options.output).map_err(|source| Asc2EphError::FileCreate {
            path: options.output.clone(),
            source,
        })?;
    }

    info!(
        output = %options.output,
        records = summary.records_written,
        duplicates = summary.duplicates_skipped,
        "conversion complete"
    );
    summary.output = Some(options.output.clone());
    Ok(summary)
}
