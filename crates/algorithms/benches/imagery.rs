//! Benchmarks for imagery algorithms

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use eofuse_algorithms::imagery::{pansharpen, stretch, SharpenParams, StretchParams};
use eofuse_core::{GeoTransform, Raster};

fn create_band(size: usize, base: f64) -> Raster<f64> {
    let mut r = Raster::new(size, size);
    r.set_transform(GeoTransform::new(0.0, size as f64, 1.0, -1.0));
    for row in 0..size {
        for col in 0..size {
            let v = base + ((row * 7 + col * 13) % 200) as f64;
            r.set(row, col, v).unwrap();
        }
    }
    r
}

fn bench_stretch(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/stretch");
    let params = StretchParams::default();
    for size in [256, 512, 1024, 2048] {
        let band = create_band(size, 100.0);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| stretch(black_box(&band), &params).unwrap())
        });
    }
    group.finish();
}

fn bench_pansharpen(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/pansharpen");
    let params = SharpenParams::default();
    for size in [85, 171, 341] {
        // ALI tile geometry: pan is 3n + 1 for multispectral n + 1
        let pan = create_band(3 * (size - 1) + 1, 300.0);
        let bands: Vec<Raster<f64>> = (0..9).map(|i| create_band(size, 50.0 + i as f64 * 10.0)).collect();
        let refs: Vec<&Raster<f64>> = bands.iter().collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| pansharpen(black_box(&pan), black_box(&refs), &params).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_stretch, bench_pansharpen);
criterion_main!(benches);
