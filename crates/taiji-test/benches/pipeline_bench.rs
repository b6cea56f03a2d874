//! Benchmarks for the per-frame pipeline

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use taiji_core::{Landmark, Timestamp};
use taiji_pose::{angle_at, evaluate, evaluate_localized, JointTable, Locale, Projection, ToleranceTable};
use taiji_runtime::{Controller, ReferencePosture, RuntimeConfig};
use taiji_session::{HistoryPolicy, Session};
use taiji_source::{FrameSource, LimbAngles, SyntheticConfig, SyntheticSource};

fn base_frame() -> taiji_core::LandmarkFrame {
    let source = SyntheticSource::new(SyntheticConfig::default());
    let base = LimbAngles::base_stance();
    source.skeleton(Timestamp::ZERO, base, base)
}

fn bench_angle_at(c: &mut Criterion) {
    let frame = base_frame();
    let a = *frame.landmark(Landmark::LeftShoulder).unwrap();
    let b = *frame.landmark(Landmark::LeftElbow).unwrap();
    let d = *frame.landmark(Landmark::LeftWrist).unwrap();

    c.bench_function("angle_at_planar", |bench| {
        bench.iter(|| angle_at(black_box(&a), black_box(&b), black_box(&d), Projection::Planar))
    });

    c.bench_function("angle_at_spatial", |bench| {
        bench.iter(|| angle_at(black_box(&a), black_box(&b), black_box(&d), Projection::Spatial))
    });
}

fn bench_extract(c: &mut Criterion) {
    let frame = base_frame();
    let table = JointTable::standard();

    c.bench_function("extract_standard_table", |b| {
        b.iter(|| black_box(table.extract(black_box(&frame))))
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let angles = JointTable::standard().extract(&base_frame());
    let tolerances = ToleranceTable::tai_chi_fundamentals();

    c.bench_function("evaluate_english", |b| {
        b.iter(|| black_box(evaluate(black_box(&angles), &tolerances)))
    });

    c.bench_function("evaluate_japanese", |b| {
        b.iter(|| black_box(evaluate_localized(black_box(&angles), &tolerances, Locale::Japanese)))
    });
}

fn bench_session_ingest(c: &mut Criterion) {
    let angles = JointTable::standard().extract(&base_frame());
    let evaluation = evaluate(&angles, &ToleranceTable::tai_chi_fundamentals());

    let mut session = Session::new();
    session.start();
    c.bench_function("session_ingest", |b| {
        b.iter(|| session.ingest(black_box(&evaluation)))
    });

    let mut session = Session::new().with_history(HistoryPolicy::Retain {
        capacity: Some(600),
    });
    session.start();
    c.bench_function("session_ingest_with_history", |b| {
        b.iter(|| session.ingest(black_box(&evaluation)))
    });
}

fn bench_synthetic_frame(c: &mut Criterion) {
    let mut source = SyntheticSource::new(SyntheticConfig::default());

    c.bench_function("synthetic_next_frame", |b| {
        b.iter(|| black_box(source.next_frame()))
    });
}

fn bench_controller_step(c: &mut Criterion) {
    let source = SyntheticSource::new(SyntheticConfig::default());
    let mut controller = Controller::new(source, ReferencePosture::default(), RuntimeConfig::default());
    controller.session().start();

    c.bench_function("controller_step", |b| b.iter(|| black_box(controller.step())));
}

criterion_group!(
    benches,
    bench_angle_at,
    bench_extract,
    bench_evaluate,
    bench_session_ingest,
    bench_synthetic_frame,
    bench_controller_step,
);
criterion_main!(benches);
