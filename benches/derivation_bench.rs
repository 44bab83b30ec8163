use chrono::{Duration, TimeZone, Utc};
use criterion::{Criterion, criterion_group, criterion_main};
use kpi_rs::core::{AxisScale, Point, RawPoint, RawSeries, Viewport, smooth_points};
use kpi_rs::render::LabelSettings;
use kpi_rs::{DataRepresentationBuilder, RepresentationConfig};
use std::hint::black_box;

fn generated_series(count: usize, len: usize) -> Vec<RawSeries> {
    let start = Utc
        .with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
        .single()
        .expect("valid start date");
    (0..count)
        .map(|s| {
            let points = (0..len)
                .map(|i| {
                    let t = i as f64;
                    let value = 100.0 + (t * 0.13 + s as f64).sin() * 25.0 + t * 0.02;
                    RawPoint::new(start + Duration::days(i as i64), value)
                })
                .collect();
            RawSeries::new(format!("kpi-{s}"), points)
        })
        .collect()
}

fn bench_axis_scale_round_trip(c: &mut Criterion) {
    let scale = AxisScale::new(0.0, 10_000.0)
        .expect("valid scale")
        .with_range(0.0, 1920.0)
        .expect("pixel range");

    c.bench_function("axis_scale_round_trip", |b| {
        b.iter(|| {
            let px = scale.apply(black_box(4_321.123));
            let _ = scale.invert(px);
        })
    });
}

fn bench_smoothing_5k(c: &mut Criterion) {
    let start = Utc
        .with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
        .single()
        .expect("valid start date");
    let points: Vec<Point> = (0..5_000)
        .map(|i| {
            let t = i as f64;
            Point::new(start + Duration::hours(i as i64), (t * 0.07).sin() * 50.0, i)
        })
        .collect();

    c.bench_function("smoothing_5k_steps_8", |b| {
        b.iter(|| {
            let _ = smooth_points(black_box(&points), black_box(8));
        })
    });
}

fn bench_build_representation_12x365(c: &mut Criterion) {
    let input = generated_series(12, 365);
    let builder = DataRepresentationBuilder::new(
        RepresentationConfig::new(Viewport::new(1600, 900))
            .with_smoothing(true)
            .with_stale_threshold_days(7),
    )
    .with_default_formatters();

    c.bench_function("build_representation_12x365", |b| {
        b.iter(|| {
            let _ = builder
                .build(black_box(&input))
                .expect("build should succeed");
        })
    });
}

fn bench_labels_12(c: &mut Criterion) {
    let input = generated_series(12, 90);
    let representation = DataRepresentationBuilder::new(RepresentationConfig::new(
        Viewport::new(1600, 900),
    ))
    .with_default_formatters()
    .build(&input)
    .expect("build should succeed");
    let settings = LabelSettings::default();

    c.bench_function("labels_12", |b| {
        b.iter(|| {
            let _ = representation.labels(black_box(&settings));
        })
    });
}

criterion_group!(
    benches,
    bench_axis_scale_round_trip,
    bench_smoothing_5k,
    bench_build_representation_12x365,
    bench_labels_12
);
criterion_main!(benches);
