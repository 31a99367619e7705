//! Criterion benchmarks for ampsim-core DSP primitives
//!
//! Run with: cargo bench -p ampsim-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ampsim_core::{
    Biquad, BiquadCoefficients, Convolver, DirectConvolver, FilterKind, InterpolatedDelay, Lfo,
    OversampleFactor, Oversampler, PartitionedConvolver, fast_tanh,
};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn decaying_ir(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (i as f32 * 0.37).sin() * (-(i as f32) / (len as f32 * 0.25)).exp())
        .collect()
}

fn bench_biquad(c: &mut Criterion) {
    let mut group = c.benchmark_group("Biquad");

    let coeffs = BiquadCoefficients::design(FilterKind::Peaking, 48000.0, 800.0, 1.5, 2.0);

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(BenchmarkId::new("process", block_size), &block_size, |b, _| {
            let mut biquad = Biquad::with_coefficients(coeffs);
            b.iter(|| {
                for &sample in &input {
                    black_box(biquad.process(black_box(sample)));
                }
            });
        });
    }

    // Coefficient calculation cost
    group.bench_function("coefficient_design", |b| {
        b.iter(|| {
            black_box(BiquadCoefficients::design(
                black_box(FilterKind::HighShelf),
                black_box(48000.0),
                black_box(3000.0),
                black_box(0.7),
                black_box(1.5),
            ))
        });
    });

    group.finish();
}

fn bench_saturation(c: &mut Criterion) {
    let input = generate_test_signal(1024);
    c.bench_function("fast_tanh/1024", |b| {
        b.iter(|| {
            for &sample in &input {
                black_box(fast_tanh(black_box(sample * 8.0)));
            }
        });
    });
}

fn bench_oversampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("Oversampler");
    let input = generate_test_signal(256);

    for factor in [OversampleFactor::X2, OversampleFactor::X4, OversampleFactor::X8] {
        group.bench_with_input(
            BenchmarkId::new("tanh", factor.factor()),
            &factor,
            |b, &factor| {
                let mut os = Oversampler::new(factor, 1);
                let mut buffer = input.clone();
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    os.process_block(0, &mut buffer, |x| fast_tanh(x * 8.0));
                    black_box(&buffer);
                });
            },
        );
    }

    group.finish();
}

fn bench_chorus_delay(c: &mut Criterion) {
    let input = generate_test_signal(256);
    c.bench_function("InterpolatedDelay/modulated_256", |b| {
        let mut delay = InterpolatedDelay::from_time(SAMPLE_RATE, 0.02);
        let mut lfo = Lfo::new(SAMPLE_RATE, 1.5);
        b.iter(|| {
            for &sample in &input {
                let d = 240.0 + lfo.next() * 144.0;
                black_box(delay.write_then_read(sample, d));
            }
        });
    });
}

fn bench_convolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("Convolution");
    let input = generate_test_signal(256);

    for &ir_len in &[256usize, 2048] {
        let ir = decaying_ir(ir_len);

        group.bench_with_input(BenchmarkId::new("direct", ir_len), &ir, |b, ir| {
            let mut conv = DirectConvolver::new(ir).unwrap();
            let mut buffer = input.clone();
            b.iter(|| {
                buffer.copy_from_slice(&input);
                conv.process_block(&mut buffer);
                black_box(&buffer);
            });
        });

        group.bench_with_input(BenchmarkId::new("partitioned", ir_len), &ir, |b, ir| {
            let mut conv = PartitionedConvolver::new(ir, 64).unwrap();
            let mut buffer = input.clone();
            b.iter(|| {
                buffer.copy_from_slice(&input);
                conv.process_block(&mut buffer);
                black_box(&buffer);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_biquad,
    bench_saturation,
    bench_oversampler,
    bench_chorus_delay,
    bench_convolution
);
criterion_main!(benches);
