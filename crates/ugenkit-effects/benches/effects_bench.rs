//! Criterion benchmarks for ugenkit reverbs
//!
//! Run with: cargo bench -p ugenkit-effects
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ugenkit_core::Processor;
use ugenkit_effects::{Reverb, ReverbKind, ReverbParams};

const SAMPLE_RATE: u32 = 48000;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_reverb(c: &mut Criterion, kind: ReverbKind) {
    let mut group = c.benchmark_group(kind.id());
    let channels = if kind == ReverbKind::FreeVerb { 1 } else { 2 };

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                let mut reverb = Reverb::from_id(kind.id(), SAMPLE_RATE).unwrap();
                let params: ReverbParams = reverb.default_params();
                let mut left = vec![0.0f32; block_size];
                let mut right = vec![0.0f32; block_size];
                b.iter(|| {
                    if channels == 1 {
                        reverb
                            .process_mono(black_box(&input), &mut left, &params)
                            .unwrap();
                    } else {
                        reverb
                            .process(
                                &[black_box(&input[..]), &input[..]],
                                &mut [&mut left[..], &mut right[..]],
                                &params,
                            )
                            .unwrap();
                    }
                    black_box(left[0])
                })
            },
        );
    }

    group.finish();
}

fn bench_freeverb(c: &mut Criterion) {
    bench_reverb(c, ReverbKind::FreeVerb);
}

fn bench_freeverb2(c: &mut Criterion) {
    bench_reverb(c, ReverbKind::FreeVerb2);
}

fn bench_gverb(c: &mut Criterion) {
    bench_reverb(c, ReverbKind::GVerb);
}

/// Parameter change on every block, so every call ramps.
fn bench_gverb_automation(c: &mut Criterion) {
    use ugenkit_effects::FdnParams;

    let input = generate_test_signal(256);
    c.bench_function("gverb_automated_256", |b| {
        let mut reverb = Reverb::from_id("gverb", SAMPLE_RATE).unwrap();
        let mut left = vec![0.0f32; 256];
        let mut right = vec![0.0f32; 256];
        let mut decay = 1.0;
        b.iter(|| {
            decay = if decay > 8.0 { 1.0 } else { decay * 1.05 };
            let params = FdnParams {
                decay_time: black_box(decay),
                ..FdnParams::default()
            };
            reverb
                .process(
                    &[&input[..], &input[..]],
                    &mut [&mut left[..], &mut right[..]],
                    &params.into(),
                )
                .unwrap();
            black_box(left[0])
        })
    });
}

criterion_group!(
    benches,
    bench_freeverb,
    bench_freeverb2,
    bench_gverb,
    bench_gverb_automation,
);
criterion_main!(benches);
