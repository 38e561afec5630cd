//! Criterion benchmarks for anlz header and codec operations.
//!
//! Run with: cargo bench --bench header_codec
//!
//! These benchmarks track regression in the hot paths:
//! - header parse/serialize
//! - diagnose() over raw header bytes
//! - write_scaled_data() / read_data() through an in-memory stream

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::{ArrayD, IxDyn, ShapeBuilder};

use anlz::analyze::{diagnose, read_data, write_scaled_data, AnalyzeHeader, DataType, HeaderVariant};

/// Create a shaped test volume in F-order
fn create_test_volume(shape: &[usize]) -> ArrayD<f64> {
    let numel: usize = shape.iter().product();
    let data: Vec<f64> = (0..numel).map(|i| (i % 256) as f64).collect();
    let c_order = ArrayD::from_shape_vec(shape.to_vec(), data).unwrap();
    let mut f_order = ArrayD::zeros(IxDyn(shape).f());
    f_order.assign(&c_order);
    f_order
}

fn shaped_header(shape: &[usize], dtype: DataType) -> AnalyzeHeader {
    let mut hdr = AnalyzeHeader::new(HeaderVariant::Spm2);
    hdr.set_data_shape(shape).unwrap();
    hdr.set_data_dtype(dtype);
    hdr
}

fn bench_header_parse(c: &mut Criterion) {
    let bytes = shaped_header(&[64, 64, 64], DataType::Int16).to_bytes();

    c.bench_function("header_parse", |b| {
        b.iter(|| {
            let hdr = AnalyzeHeader::from_bytes(black_box(&bytes), HeaderVariant::Spm2).unwrap();
            black_box(hdr)
        })
    });

    c.bench_function("header_diagnose", |b| {
        b.iter(|| black_box(diagnose(black_box(&bytes), HeaderVariant::Spm2)))
    });
}

fn bench_scaled_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaled_codec");

    for &shape in &[[32, 32, 32], [64, 64, 64], [128, 128, 64]] {
        let volume = create_test_volume(&shape);
        let nbytes = (shape.iter().product::<usize>() * 2) as u64;
        let label = format!("{}x{}x{}", shape[0], shape[1], shape[2]);

        group.throughput(Throughput::Bytes(nbytes));
        group.bench_with_input(BenchmarkId::new("write", &label), &volume, |b, volume| {
            b.iter(|| {
                let mut hdr = shaped_header(&shape, DataType::Int16);
                let mut stream = Cursor::new(Vec::new());
                write_scaled_data(&mut hdr, black_box(volume), &mut stream).unwrap();
                black_box(stream)
            })
        });

        let mut hdr = shaped_header(&shape, DataType::Int16);
        let mut stream = Cursor::new(Vec::new());
        write_scaled_data(&mut hdr, &volume, &mut stream).unwrap();

        group.throughput(Throughput::Bytes(nbytes));
        group.bench_with_input(BenchmarkId::new("read", &label), &hdr, |b, hdr| {
            b.iter(|| {
                let data = read_data(black_box(hdr), &mut stream).unwrap();
                black_box(data)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_header_parse, bench_scaled_roundtrip);
criterion_main!(benches);
