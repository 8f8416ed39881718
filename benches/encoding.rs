//! Benchmarks for segment estimation and the full encode pipeline.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(clippy::expect_used, clippy::cast_possible_truncation)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use xlencode::export::write_xlsx;
use xlencode::pipeline::process;
use xlencode::{estimate, CellValue, Document};

fn campaign(rows: usize) -> Document {
    let mut data = vec![
        vec![CellValue::from("Campaign")],
        vec![
            CellValue::from("Name"),
            CellValue::from("Phone"),
            CellValue::from("Message"),
        ],
    ];
    for i in 0..rows {
        let message = if i % 3 == 0 {
            format!("Olá {i}, a sua encomenda está pronta para levantamento 😀")
        } else {
            format!("Hi {i}, your order has shipped! Track it at example.com/t/{i}")
        };
        data.push(vec![
            CellValue::from(format!("Contact {i}")),
            CellValue::from(format!("+1555{i:07}")),
            CellValue::from(message),
        ]);
    }
    Document::new(data)
}

/// Estimation across the single/concatenated boundaries
fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate");
    for (name, text) in [
        ("gsm_short", "Hello, World!".to_string()),
        ("gsm_long", "a".repeat(480)),
        ("ucs2_long", format!("ç{}", "b".repeat(300))),
    ] {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("estimate", name), &text, |b, text| {
            b.iter(|| estimate(black_box(text)))
        });
    }
    group.finish();
}

/// End-to-end: parse, transform and write a generated workbook
fn bench_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("process");
    for rows in [100, 5000] {
        let data = write_xlsx(&campaign(rows), "Campaign").expect("Failed to build workbook");
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("xlsx", rows), &data, |b, data| {
            b.iter(|| process(black_box(data), "campaign.xlsx").expect("Failed to process"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_estimate, bench_process);
criterion_main!(benches);
