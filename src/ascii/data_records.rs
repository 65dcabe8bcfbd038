//! Decoding of coefficient records and their assembly into the binary file.
//!
//! A data file is a sequence of records, each made of a header line
//! `<record number> <coefficient count>` followed by `ceil(count / 3)`
//! lines of three Fortran floating values (the last line may carry fewer
//! meaningful values; its padding is ignored).
//!
//! ```text
//!      1  1018
//!   0.2287184500000000000D+07  0.2287216500000000000D+07 -0.4533770429199142D+08
//!  -0.1142095221821820000D+08  0.1231640715254890000D+07  0.1347474253284046000D+05
//!   ...
//! ```
//!
//! Records are classified with [`classify`] against the last accepted
//! record, which is carried across files in the [`ConversionContext`], and
//! written back to back from record 2 onwards.

use std::io::{BufRead, Read, Seek, Write};

use serde::Serialize;
use tracing::{debug, info};

use super::{
    continuity::{classify, Continuity},
    scanner::{record_header_fields, LineScanner, ValuesLine},
};
use crate::{
    asc2eph_errors::{Asc2EphError, FormatError},
    binary::writer::EphemerisWriter,
    constants::{FIRST_DATA_RECORD, VALUES_PER_LINE},
    context::{ConversionContext, JdSpan},
    layout::record_offset,
};

/// Header line of a data record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub number: i64,
    pub coefficient_count: i64,
}

/// Counters for one data file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileStats {
    pub file: String,
    pub records_read: u64,
    pub records_written: u64,
    pub duplicates_skipped: u64,
}

/// Number of text lines holding `count` values.
pub fn lines_per_record(count: usize) -> usize {
    count.div_ceil(VALUES_PER_LINE)
}

/// Number of meaningful values on line `line_index` of a `count`-value record.
fn values_on_line(count: usize, line_index: usize) -> usize {
    (count - line_index * VALUES_PER_LINE).min(VALUES_PER_LINE)
}

/// Read the next record header, skipping blank lines.
///
/// Return
/// ----------
/// * `None` at end of file, which ends the file normally.
fn next_record_header<R: BufRead>(
    scanner: &mut LineScanner<R>,
) -> Result<Option<RecordHeader>, Asc2EphError> {
    loop {
        let Some(line) = scanner.next_line()? else {
            return Ok(None);
        };
        if line.trim().is_empty() {
            continue;
        }

        let fields = record_header_fields(line).ok().map(|(_, fields)| fields);
        return match fields {
            Some((number, coefficient_count)) => Ok(Some(RecordHeader {
                number,
                coefficient_count,
            })),
            None => Err(scanner.unexpected("record header")),
        };
    }
}

/// Complete a record whose first line has already been read.
fn read_record_values<R: BufRead>(
    scanner: &mut LineScanner<R>,
    count: usize,
    first: ValuesLine,
) -> Result<Vec<f64>, Asc2EphError> {
    let mut values = Vec::with_capacity(count);
    values.extend_from_slice(&first.as_slice()[..values_on_line(count, 0)]);

    for line_index in 1..lines_per_record(count) {
        let needed = values_on_line(count, line_index);
        let line = scanner.scan_values("coefficients", needed)?;
        values.extend_from_slice(&line.as_slice()[..needed]);
    }
    Ok(values)
}

fn skip_lines<R: BufRead>(scanner: &mut LineScanner<R>, lines: usize) -> Result<(), Asc2EphError> {
    for _ in 0..lines {
        scanner.require_line("duplicate record")?;
    }
    Ok(())
}

#[derive(Debug)]
pub struct DataRecordAssembler {
    next_record: u64,
    records_written: u64,
    duplicates_skipped: u64,
}

impl Default for DataRecordAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl DataRecordAssembler {
    pub fn new() -> Self {
        DataRecordAssembler {
            next_record: FIRST_DATA_RECORD,
            records_written: 0,
            duplicates_skipped: 0,
        }
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn duplicates_skipped(&self) -> u64 {
        self.duplicates_skipped
    }

    /// Write the GROUP 1041 constant values as record 1.
    ///
    /// No continuity check applies: record 1 is always written as read.
    pub fn write_constant_values<R, F>(
        scanner: &mut LineScanner<R>,
        writer: &mut EphemerisWriter<F>,
        ctx: &ConversionContext,
    ) -> Result<(), Asc2EphError>
    where
        R: BufRead,
        F: Read + Write + Seek,
    {
        let count = ctx.constant_count;
        let first = scanner.scan_values("constant values", values_on_line(count, 0))?;
        let values = read_record_values(scanner, count, first)?;
        writer.write_f64s_at(record_offset(1, ctx.record_byte_size()), &values)
    }

    /// Append every record of one data file.
    ///
    /// Arguments
    /// -----------------
    /// * `scanner`: The data file, positioned at its start.
    /// * `writer`: Output stream.
    /// * `ctx`: Conversion context; its continuity state is updated with
    ///   each accepted record.
    ///
    /// Return
    /// ----------
    /// * The counters of this file once its end is reached.
    /// * [`FormatError::CoefficientCountMismatch`] if a record does not hold
    ///   `NCOEFF` values, [`Asc2EphError::DataGap`] on an out-of-sequence
    ///   record, [`Asc2EphError::EndOfFile`] if the file ends inside a record.
    ///   Records accepted before the failure stay written.
    pub fn append_file<R, F>(
        &mut self,
        scanner: &mut LineScanner<R>,
        writer: &mut EphemerisWriter<F>,
        ctx: &mut ConversionContext,
    ) -> Result<FileStats, Asc2EphError>
    where
        R: BufRead,
        F: Read + Write + Seek,
    {
        let count = ctx.coefficients_per_record;
        let record_size = ctx.record_byte_size();
        let mut stats = FileStats {
            file: scanner.name().to_string(),
            ..FileStats::default()
        };

        while let Some(header) = next_record_header(scanner)? {
            if header.coefficient_count != count as i64 {
                return Err(FormatError::CoefficientCountMismatch {
                    record: header.number,
                    expected: count,
                    found: header.coefficient_count,
                }
                .into());
            }
            stats.records_read += 1;

            let needed = values_on_line(count, 0).max(2);
            let first = scanner.scan_values("record dates", needed)?;
            let span = JdSpan::new(first.values[0], first.values[1]);

            match classify(ctx.previous_span, span) {
                Continuity::Duplication => {
                    debug!(record = header.number, %span, "skipping duplicate record");
                    skip_lines(scanner, lines_per_record(count) - 1)?;
                    stats.duplicates_skipped += 1;
                    self.duplicates_skipped += 1;
                }
                Continuity::OutOfSequence { previous, found } => {
                    return Err(Asc2EphError::DataGap {
                        file: stats.file,
                        record: header.number,
                        previous,
                        found,
                    });
                }
                Continuity::NotChecked(accepted) | Continuity::Continuation(accepted) => {
                    let values = read_record_values(scanner, count, first)?;
                    writer.write_f64s_at(record_offset(self.next_record, record_size), &values)?;
                    ctx.accept_span(accepted);
                    self.next_record += 1;
                    self.records_written += 1;
                    stats.records_written += 1;
                }
            }
        }

        info!(
            file = %stats.file,
            read = stats.records_read,
            written = stats.records_written,
            duplicates = stats.duplicates_skipped,
            "data file appended"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod test_data_records {
    use super::*;
    use std::io::Cursor;

    /// Render a record the way the DE ASCII files do, zero padding the last line.
    fn record_text(number: usize, values: &[f64]) -> String {
        let mut text = format!("{number:6}{:6}\n", values.len());
        for line in values.chunks(VALUES_PER_LINE) {
            for i in 0..VALUES_PER_LINE {
                let v = line.get(i).copied().unwrap_or(0.0);
                text.push_str(&format!(" {:25.18E}", v).replace('E', "D"));
            }
            text.push('\n');
        }
        text
    }

    fn record_values(start: f64, end: f64, count: usize) -> Vec<f64> {
        let mut values = vec![start, end];
        values.extend((2..count).map(|i| start + i as f64 * 0.25));
        values
    }

    fn scanner(name: &str, text: String) -> LineScanner<Cursor<Vec<u8>>> {
        LineScanner::new(Cursor::new(text.into_bytes()), name)
    }

    fn ctx(count: usize) -> ConversionContext {
        ConversionContext::new(2 * count, count)
    }

    fn written(writer: EphemerisWriter<Cursor<Vec<u8>>>, count: usize) -> Vec<Vec<f64>> {
        let bytes = writer.into_inner().into_inner();
        let record_size = count * 8;
        bytes[2 * record_size..]
            .chunks(record_size)
            .map(|record| {
                record
                    .chunks_exact(8)
                    .map(|b| f64::from_le_bytes(b.try_into().unwrap()))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_lines_per_record() {
        assert_eq!(lines_per_record(6), 2);
        assert_eq!(lines_per_record(7), 3);
        assert_eq!(lines_per_record(8), 3);
        assert_eq!(lines_per_record(1018), 340);
    }

    #[test]
    fn test_contiguous_records_are_written() {
        let count = 8;
        let r1 = record_values(2440400.5, 2441000.5, count);
        let r2 = record_values(2441000.5, 2441600.5, count);
        let text = record_text(1, &r1) + &record_text(2, &r2);

        let mut ctx = ctx(count);
        let mut writer = EphemerisWriter::new(Cursor::new(Vec::new()));
        let mut assembler = DataRecordAssembler::new();
        let stats = assembler
            .append_file(&mut scanner("ascp2440.440", text), &mut writer, &mut ctx)
            .unwrap();

        assert_eq!(stats.records_written, 2);
        assert_eq!(stats.duplicates_skipped, 0);
        assert_eq!(ctx.first_observed_jd, Some(2440400.5));
        assert_eq!(ctx.last_observed_jd(), Some(2441600.5));
        assert_eq!(written(writer, count), vec![r1, r2]);
    }

    #[test]
    fn test_overlapping_files_skip_duplicate() {
        let count = 7;
        let r1 = record_values(0.5, 32.5, count);
        let r2 = record_values(32.5, 64.5, count);
        let r3 = record_values(64.5, 96.5, count);
        let file_a = record_text(1, &r1) + &record_text(2, &r2);
        let file_b = record_text(1, &r2) + &record_text(2, &r3);

        let mut ctx = ctx(count);
        let mut writer = EphemerisWriter::new(Cursor::new(Vec::new()));
        let mut assembler = DataRecordAssembler::new();
        assembler
            .append_file(&mut scanner("a", file_a), &mut writer, &mut ctx)
            .unwrap();
        let stats_b = assembler
            .append_file(&mut scanner("b", file_b), &mut writer, &mut ctx)
            .unwrap();

        assert_eq!(stats_b.records_read, 2);
        assert_eq!(stats_b.duplicates_skipped, 1);
        assert_eq!(assembler.records_written(), 3);
        assert_eq!(written(writer, count), vec![r1, r2, r3]);
    }

    #[test]
    fn test_gap_aborts_after_valid_records() {
        let count = 6;
        let r1 = record_values(0.5, 32.5, count);
        let r2 = record_values(64.5, 96.5, count);
        let text = record_text(1, &r1) + &record_text(2, &r2);

        let mut ctx = ctx(count);
        let mut writer = EphemerisWriter::new(Cursor::new(Vec::new()));
        let result = DataRecordAssembler::new().append_file(
            &mut scanner("gap", text),
            &mut writer,
            &mut ctx,
        );

        assert_eq!(
            result,
            Err(Asc2EphError::DataGap {
                file: "gap".into(),
                record: 2,
                previous: JdSpan::new(0.5, 32.5),
                found: JdSpan::new(64.5, 96.5),
            })
        );
        assert_eq!(written(writer, count), vec![r1]);
    }

    #[test]
    fn test_wrong_coefficient_count() {
        let r1 = record_values(0.5, 32.5, 9);
        let mut ctx = ctx(8);
        let mut writer = EphemerisWriter::new(Cursor::new(Vec::new()));
        let result = DataRecordAssembler::new().append_file(
            &mut scanner("bad", record_text(1, &r1)),
            &mut writer,
            &mut ctx,
        );
        assert_eq!(
            result,
            Err(FormatError::CoefficientCountMismatch {
                record: 1,
                expected: 8,
                found: 9
            }
            .into())
        );
    }

    #[test]
    fn test_truncated_record() {
        let count = 9;
        let text = record_text(1, &record_values(0.5, 32.5, count));
        let truncated: String = text.lines().take(3).map(|l| format!("{l}\n")).collect();

        let mut ctx = ctx(count);
        let mut writer = EphemerisWriter::new(Cursor::new(Vec::new()));
        let result = DataRecordAssembler::new().append_file(
            &mut scanner("short", truncated),
            &mut writer,
            &mut ctx,
        );
        assert_eq!(
            result,
            Err(Asc2EphError::EndOfFile("short (coefficients)".into()))
        );
    }

    #[test]
    fn test_empty_file_and_blank_lines() {
        let count = 6;
        let mut ctx = ctx(count);
        let mut writer = EphemerisWriter::new(Cursor::new(Vec::new()));
        let mut assembler = DataRecordAssembler::new();

        let stats = assembler
            .append_file(&mut scanner("empty", String::new()), &mut writer, &mut ctx)
            .unwrap();
        assert_eq!(stats.records_read, 0);

        let text = record_text(1, &record_values(0.5, 32.5, count)) + "\n\n";
        let stats = assembler
            .append_file(&mut scanner("trailing", text), &mut writer, &mut ctx)
            .unwrap();
        assert_eq!(stats.records_written, 1);
    }

    #[test]
    fn test_constant_values_record() {
        let mut ctx = ctx(8);
        ctx.constant_count = 5;
        let values = [440.0, 149597870.7, 81.30056907, 1.0, 2.0];
        let text: String = record_text(0, &values)
            .lines()
            .skip(1)
            .map(|l| format!("{l}\n"))
            .collect();

        let mut writer = EphemerisWriter::new(Cursor::new(Vec::new()));
        let mut header = scanner("header", text);
        DataRecordAssembler::write_constant_values(&mut header, &mut writer, &ctx).unwrap();

        let bytes = writer.into_inner().into_inner();
        let decoded: Vec<f64> = bytes[64..]
            .chunks_exact(8)
            .map(|b| f64::from_le_bytes(b.try_into().unwrap()))
            .collect();
        assert_eq!(decoded, values);
        assert_eq!(ctx.previous_span, None);
    }
}
