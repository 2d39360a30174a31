//! Benchmarks for delay line operations.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use phasepluck::dsp::delay::DelayLine;

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    // Delay lengths (in samples)
    let lengths: &[usize] = &[
        48,   // 1kHz at 48kHz
        218,  // A3
        2401, // 20Hz, the longest string line
    ];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for &len in lengths {
            let mut delay = DelayLine::new(2401);
            delay.resize_resampled(len);
            let mut output = vec![0.0f32; size];
            group.bench_with_input(BenchmarkId::new(format!("push_{len}"), size), &size, |b, _| {
                b.iter(|| {
                    for (out, &x) in output.iter_mut().zip(&input) {
                        *out = delay.next_sample(black_box(x));
                    }
                })
            });
        }
    }

    // Resample between two neighbouring lengths
    let mut delay = DelayLine::new(2401);
    delay.resize_resampled(218);
    delay.fill_with(|i| (i as f32 * 0.1).sin());
    let mut long = true;
    group.bench_function("resize_resampled", |b| {
        b.iter(|| {
            long = !long;
            delay.resize_resampled(black_box(if long { 218 } else { 206 }));
        })
    });

    group.finish();
}
