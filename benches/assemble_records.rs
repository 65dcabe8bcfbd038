use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use asc2eph::{
    ascii::{
        data_records::DataRecordAssembler,
        scanner::{parse_fortran_values, LineScanner},
    },
    binary::writer::EphemerisWriter,
    context::ConversionContext,
};

const NCOEFF: usize = 1018;

/// Text of `count` contiguous DE440-sized records.
fn data_file(count: usize) -> Vec<u8> {
    let mut text = String::new();
    for record in 0..count {
        let start = 2287184.5 + record as f64 * 32.0;
        text.push_str(&format!("{:6}{:6}\n", record + 1, NCOEFF));
        let values: Vec<f64> = (0..NCOEFF)
            .map(|i| match i {
                0 => start,
                1 => start + 32.0,
                _ => (i as f64).sin() * 1e7,
            })
            .collect();
        for line in values.chunks(3) {
            for i in 0..3 {
                let v = line.get(i).copied().unwrap_or(0.0);
                text.push_str(&format!("  {v:.17E}").replace('E', "D"));
            }
            text.push('\n');
        }
    }
    text.into_bytes()
}

fn bench_fortran_values(c: &mut Criterion) {
    let line = "  0.2287184500000000000D+07  0.2287216500000000000D+07 -0.4533770429199142D+08";
    c.bench_function("parse_fortran_values/one_line", |b| {
        b.iter(|| parse_fortran_values(black_box(line)))
    });
}

fn bench_append_file(c: &mut Criterion) {
    let text = data_file(64);

    c.bench_function("append_file/64_records_1018_coeffs", |b| {
        b.iter_batched(
            || {
                (
                    LineScanner::new(Cursor::new(text.clone()), "ascp.bench"),
                    EphemerisWriter::new(Cursor::new(Vec::with_capacity(66 * NCOEFF * 8))),
                    ConversionContext::new(2 * NCOEFF, NCOEFF),
                )
            },
            |(mut scanner, mut writer, mut ctx)| {
                let mut assembler = DataRecordAssembler::new();
                let stats = assembler
                    .append_file(&mut scanner, &mut writer, &mut ctx)
                    .unwrap();
                black_box(stats)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_fortran_values, bench_append_file);
criterion_main!(benches);
