#![allow(dead_code)]

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

pub const AU: f64 = 149597870.7;
pub const EMRAT: f64 = 81.30056907;
pub const DENUM: f64 = 440.0;

/// Pointer table of 402-coefficient records (bodies 0 and 11 only).
const SMALL_POINTERS: [&str; 3] = [
    "     3   303   303   303   303   303   303   303   303   303   303   303   403   403   403",
    "   100     0     0     0     0     0     0     0     0     0     0    50     0     0     0",
    "     1     0     0     0     0     0     0     0     0     0     0     1     0     0     0",
];

/// DE440 pointer table, 1018-coefficient records.
const DE440_POINTERS: [&str; 3] = [
    "     3   171   231   309   342   366   387   405   423   441   753   819   899  1019  1019",
    "    14    10    13    11     8     7     6     6     6    13    11    10    10     0     0",
    "     4     2     2     1     1     1     1     1     1     8     2     4     4     0     0",
];

/// Description of a synthetic ASCII header.
#[derive(Debug, Clone)]
pub struct HeaderFixture {
    pub ncoeff: usize,
    pub span: [f64; 3],
    pub names: Vec<String>,
    pub values: Vec<f64>,
    /// Emit the two DE430+ pointer columns.
    pub extended: bool,
}

impl HeaderFixture {
    /// `count` constants with DENUM, AU and EMRAT at the given positions.
    pub fn new(ncoeff: usize, count: usize, positions: [usize; 3]) -> Self {
        let mut names: Vec<String> = (0..count).map(|i| format!("C{i:05}")).collect();
        let mut values: Vec<f64> = (0..count).map(|i| i as f64 + 0.25).collect();
        for (position, (name, value)) in positions
            .into_iter()
            .zip([("DENUM", DENUM), ("AU", AU), ("EMRAT", EMRAT)])
        {
            names[position] = name.to_string();
            values[position] = value;
        }
        HeaderFixture {
            ncoeff,
            span: [2440400.5, 2470000.5, 32.0],
            names,
            values,
            extended: false,
        }
    }

    /// 400 constants in 402-coefficient records.
    pub fn standard() -> Self {
        Self::new(402, 400, [0, 9, 10])
    }

    pub fn index_of(&self, name: &str) -> usize {
        self.names.iter().position(|n| n == name).unwrap()
    }

    pub fn text(&self) -> String {
        let mut text = format!("KSIZE= {:5}    NCOEFF= {:5}\n\n", 2 * self.ncoeff, self.ncoeff);

        text.push_str("GROUP   1010\n\n");
        text.push_str("JPL Planetary Ephemeris DE440/LE440\n");
        text.push_str("Start Epoch: JED=  2440400.5 1969 JUN 28 00:00:00\n");
        text.push_str("Final Epoch: JED=  2470000.5 2050 OCT 08 00:00:00\n\n");

        text.push_str("GROUP   1030\n\n");
        text.push_str(&values_lines(&self.span));
        text.push('\n');

        text.push_str("GROUP   1040\n\n");
        text.push_str(&format!("{:6}\n", self.names.len()));
        for chunk in self.names.chunks(10) {
            let line: String = chunk.iter().map(|n| format!("  {n:<6}")).collect();
            text.push_str(&format!("{line:<80}\n"));
        }
        text.push('\n');

        text.push_str("GROUP   1041\n\n");
        text.push_str(&format!("{:6}\n", self.values.len()));
        text.push_str(&values_lines(&self.values));
        text.push('\n');

        text.push_str("GROUP   1050\n\n");
        let pointers = match self.ncoeff {
            1018 => DE440_POINTERS,
            _ => SMALL_POINTERS,
        };
        for line in pointers {
            let line = if self.extended { line } else { &line[..78] };
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

/// Values three per line in Fortran `D` notation, zero padding the last line.
pub fn values_lines(values: &[f64]) -> String {
    let mut text = String::new();
    for chunk in values.chunks(3) {
        for i in 0..3 {
            let value = chunk.get(i).copied().unwrap_or(0.0);
            text.push_str(&format!("  {value:.17E}").replace('E', "D"));
        }
        text.push('\n');
    }
    text
}

/// Coefficients of one data record covering `[start, end]`.
pub fn record_values(start: f64, end: f64, ncoeff: usize) -> Vec<f64> {
    let mut values = vec![start, end];
    values.extend((2..ncoeff).map(|i| start / 1e6 + i as f64 * 1e-3));
    values
}

/// Data file text holding one record per span.
pub fn data_text(spans: &[(f64, f64)], ncoeff: usize) -> String {
    spans
        .iter()
        .enumerate()
        .map(|(i, (start, end))| {
            format!("{:6}{:6}\n", i + 1, ncoeff) + &values_lines(&record_values(*start, *end, ncoeff))
        })
        .collect()
}

/// Consecutive spans of `length` days starting at `start`.
pub fn spans(start: f64, length: f64, count: usize) -> Vec<(f64, f64)> {
    (0..count)
        .map(|i| {
            let s = start + i as f64 * length;
            (s, s + length)
        })
        .collect()
}

/// Temporary directory holding the ASCII inputs and the binary output.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Workspace {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self, name: &str) -> Utf8PathBuf {
        Utf8Path::from_path(self.dir.path()).unwrap().join(name)
    }

    pub fn write(&self, name: &str, text: &str) -> Utf8PathBuf {
        let path = self.path(name);
        fs::write(&path, text).unwrap();
        path
    }

    pub fn read(&self, name: &str) -> Vec<u8> {
        fs::read(self.path(name)).unwrap()
    }
}

pub fn f64_at(bytes: &[u8], offset: usize) -> f64 {
    f64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap())
}

pub fn i32_at(bytes: &[u8], offset: usize) -> i32 {
    i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
}
