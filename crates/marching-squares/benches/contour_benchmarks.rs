//! Benchmarks for contour line and isoband generation.
//!
//! Run with: cargo bench --package marching-squares --bench contour_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use marching_squares::{
    generate_contour_levels, generate_contours, generate_contours_batch, generate_isobands,
    ContourOptions, Grid, IntervalLevelRangeIterator, LevelGenerator,
};
use rand::Rng;

/// Generate a smooth temperature-like field with hills and valleys.
fn generate_smooth_field(width: usize, height: usize) -> Vec<f64> {
    let mut data = vec![0.0f64; width * height];

    for y in 0..height {
        for x in 0..width {
            let fx = x as f64 / width as f64;
            let fy = y as f64 / height as f64;

            // Create multiple overlapping sine waves for a realistic pattern
            let v1 = (fx * std::f64::consts::PI * 4.0).sin() * 20.0;
            let v2 = (fy * std::f64::consts::PI * 4.0).sin() * 20.0;
            let v3 = ((fx + fy) * std::f64::consts::PI * 2.0).sin() * 10.0;

            data[y * width + x] = 50.0 + v1 + v2 + v3;
        }
    }
    data
}

/// Generate a field with random noise (more contour segments).
fn generate_noisy_field(width: usize, height: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    let base = generate_smooth_field(width, height);
    base.iter().map(|&v| v + rng.gen_range(-5.0..5.0)).collect()
}

/// Punch random no-data holes into a field.
fn with_holes(mut data: Vec<f64>, ratio: f64) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    for v in data.iter_mut() {
        if rng.gen_bool(ratio) {
            *v = f64::NAN;
        }
    }
    data
}

// =============================================================================
// LEVEL GENERATION BENCHMARKS
// =============================================================================

fn bench_generate_contour_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_contour_levels");

    let ranges = [
        (0.0f64, 100.0, 10.0, "0-100_by_10"),
        (0.0f64, 100.0, 2.0, "0-100_by_2"),
        (-50.0f64, 50.0, 5.0, "neg50-50_by_5"),
        (900.0f64, 1100.0, 4.0, "pressure_4hPa"),
    ];

    for (min, max, interval, name) in ranges {
        group.bench_with_input(
            BenchmarkId::new("levels", name),
            &(min, max, interval),
            |b, &(min, max, interval)| {
                b.iter(|| generate_contour_levels(black_box(min), black_box(max), black_box(interval)));
            },
        );
    }

    group.finish();
}

fn bench_level_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_range");
    let levels = IntervalLevelRangeIterator::new(0.0, 0.5, None).unwrap();

    group.bench_function("interval_range_iter", |b| {
        b.iter(|| {
            let range = levels.range(black_box(-10.3), black_box(42.7)).unwrap();
            range.iter(&levels).map(|(_, l)| l).sum::<f64>()
        });
    });

    group.finish();
}

// =============================================================================
// CONTOUR LINE BENCHMARKS
// =============================================================================

fn bench_generate_contours(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_contours");

    let sizes = [(64, 64), (128, 128), (256, 256), (512, 512)];
    let options = ContourOptions::interval(10.0, 0.0);

    for (width, height) in sizes {
        let smooth_data = generate_smooth_field(width, height);
        let noisy_data = generate_noisy_field(width, height);

        group.throughput(Throughput::Elements((width * height) as u64));

        group.bench_with_input(
            BenchmarkId::new("smooth", format!("{}x{}", width, height)),
            &smooth_data,
            |b, data| {
                b.iter(|| generate_contours(black_box(data), width, height, &options));
            },
        );

        // Noisy data produces many short lines and saddles
        group.bench_with_input(
            BenchmarkId::new("noisy", format!("{}x{}", width, height)),
            &noisy_data,
            |b, data| {
                b.iter(|| generate_contours(black_box(data), width, height, &options));
            },
        );
    }

    group.finish();
}

// =============================================================================
// ISOBAND BENCHMARKS
// =============================================================================

fn bench_generate_isobands(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_isobands");
    group.sample_size(20); // Slower benchmark

    let sizes = [(128, 128), (256, 256)];

    for (width, height) in sizes {
        let data = generate_smooth_field(width, height);
        let holes = with_holes(data.clone(), 0.01);

        group.throughput(Throughput::Elements((width * height) as u64));

        for interval in [20.0, 5.0] {
            let options = ContourOptions::interval(interval, 0.0);
            group.bench_with_input(
                BenchmarkId::new(format!("interval_{}", interval), format!("{}x{}", width, height)),
                &data,
                |b, data| {
                    b.iter(|| generate_isobands(black_box(data), width, height, &options));
                },
            );
        }

        let options = ContourOptions::interval(10.0, 0.0);
        group.bench_with_input(
            BenchmarkId::new("with_nodata", format!("{}x{}", width, height)),
            &holes,
            |b, data| {
                b.iter(|| generate_isobands(black_box(data), width, height, &options));
            },
        );
    }

    group.finish();
}

// =============================================================================
// BATCH BENCHMARKS
// =============================================================================

fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_contours_batch");
    group.sample_size(20);

    let (width, height) = (128, 128);
    let fields: Vec<Vec<f64>> = (0..16).map(|_| generate_noisy_field(width, height)).collect();
    let grids: Vec<Grid> = fields.iter().map(|d| Grid::new(d, width, height)).collect();
    let options = ContourOptions::interval(10.0, 0.0);

    group.throughput(Throughput::Elements((grids.len() * width * height) as u64));
    group.bench_function("parallel_16x128x128", |b| {
        b.iter(|| generate_contours_batch(black_box(&grids), &options));
    });
    group.bench_function("sequential_16x128x128", |b| {
        b.iter(|| {
            grids
                .iter()
                .map(|g| generate_contours(black_box(g.data), g.width, g.height, &options))
                .collect::<Vec<_>>()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_generate_contour_levels,
    bench_level_range,
    bench_generate_contours,
    bench_generate_isobands,
    bench_batch,
);
criterion_main!(benches);
