use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;
use survey_math::interp::resample;
use survey_math::smoothing::moving_average_columns;
use survey_types::config::{Kernel, Resampling};

/// One hour of 16 Hz survey magnetometer data onto a 4.5 s plasma grid.
fn fgm_like() -> (Array1<i64>, Array2<f64>, Array1<i64>) {
    let mut rng = StdRng::seed_from_u64(7);
    let n = 3600 * 16;
    let src = Array1::from_iter((0..n).map(|i| i as i64 * 62_500_000));
    let values = Array2::from_shape_fn((n, 3), |_| rng.gen_range(-20.0..20.0));
    let dst = Array1::from_iter((0..800).map(|i| i as i64 * 4_500_000_000));
    (src, values, dst)
}

fn bench_resample_linear(c: &mut Criterion) {
    let (src, values, dst) = fgm_like();
    c.bench_function("resample_linear_57600x3", |b| {
        b.iter(|| black_box(resample(src.view(), values.view(), dst.view(), Resampling::Linear)))
    });
}

fn bench_resample_box(c: &mut Criterion) {
    let (src, values, dst) = fgm_like();
    let mut group = c.benchmark_group("resample_box");
    group.sample_size(20);
    group.bench_function("box_57600x3", |b| {
        b.iter(|| black_box(resample(src.view(), values.view(), dst.view(), Resampling::Box)))
    });
    group.finish();
}

fn bench_spin_average(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let flux = Array2::from_shape_fn((1440, 14), |_| rng.gen_range(1e2..1e5));
    c.bench_function("spin_average_1440x14_w5", |b| {
        b.iter(|| black_box(moving_average_columns(flux.view(), 5, Kernel::Gauss)))
    });
}

criterion_group!(
    benches,
    bench_resample_linear,
    bench_resample_box,
    bench_spin_average
);
criterion_main!(benches);
