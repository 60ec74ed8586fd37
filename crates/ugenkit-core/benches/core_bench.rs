//! Criterion benchmarks for ugenkit-core primitives
//!
//! Run with: cargo bench -p ugenkit-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ugenkit_core::{
    BiquadFilter, ControlSmoother, Damper, DelayLine, Diffuser, FilterParams, FilterResponse,
    Processor, zap_gremlins,
};

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

fn bench_biquad(c: &mut Criterion) {
    let mut group = c.benchmark_group("BiquadFilter");

    for response in FilterResponse::ALL {
        let params = if response.uses_bandwidth() {
            FilterParams::band(1000.0, 0.5)
        } else {
            FilterParams::new(1000.0)
        };
        for &block_size in BLOCK_SIZES {
            let input = generate_test_signal(block_size);
            let mut output = vec![0.0f32; block_size];

            group.bench_with_input(
                BenchmarkId::new(response.id(), block_size),
                &block_size,
                |b, _| {
                    let mut filter = BiquadFilter::new(response, SAMPLE_RATE, block_size).unwrap();
                    b.iter(|| {
                        filter
                            .process_mono(black_box(&input), &mut output, &params)
                            .unwrap();
                        black_box(&output);
                    });
                },
            );
        }
    }

    // Coefficient glide on every block
    group.bench_function("lpf_sweep_256", |b| {
        let input = generate_test_signal(256);
        let mut output = vec![0.0f32; 256];
        let mut filter = BiquadFilter::new(FilterResponse::LowPass, SAMPLE_RATE, 256).unwrap();
        let mut freq = 200.0;
        b.iter(|| {
            freq = if freq > 8000.0 { 200.0 } else { freq * 1.01 };
            filter
                .process_mono(&input, &mut output, &FilterParams::new(black_box(freq)))
                .unwrap();
            black_box(&output);
        });
    });

    group.bench_function("coefficient_calc", |b| {
        let w = 2.0 * std::f64::consts::PI / f64::from(SAMPLE_RATE);
        b.iter(|| black_box(FilterResponse::BandPass.coefficients(black_box(1000.0), 0.5, w)));
    });

    group.finish();
}

fn bench_smoothers(c: &mut Criterion) {
    let mut group = c.benchmark_group("ControlSmoother");

    for id in ["ramp", "lag"] {
        for &block_size in BLOCK_SIZES {
            let input = generate_test_signal(block_size);
            let mut output = vec![0.0f32; block_size];

            group.bench_with_input(BenchmarkId::new(id, block_size), &block_size, |b, _| {
                let mut smoother = ControlSmoother::from_id(id, SAMPLE_RATE, 1).unwrap();
                b.iter(|| {
                    smoother
                        .process_mono(black_box(&input), &mut output, &0.01)
                        .unwrap();
                    black_box(&output);
                });
            });
        }
    }

    group.finish();
}

fn bench_diffuser(c: &mut Criterion) {
    let mut group = c.benchmark_group("Diffuser");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                let mut diffuser = Diffuser::new(379, 0.625);
                b.iter(|| {
                    for &sample in &input {
                        black_box(diffuser.process(black_box(sample)));
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_damped_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("DampedDelay");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::from_parameter(block_size),
            &block_size,
            |b, _| {
                let mut line = DelayLine::new(1557);
                let mut damper = Damper::new(0.2);
                b.iter(|| {
                    for &sample in &input {
                        let out = damper.process(line.oldest());
                        line.write(zap_gremlins(black_box(sample) + 0.84 * out));
                        black_box(out);
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_biquad,
    bench_smoothers,
    bench_diffuser,
    bench_damped_delay,
);
criterion_main!(benches);
