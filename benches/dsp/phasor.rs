//! Benchmarks for the phase accumulator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use phasepluck::dsp::{math, Phasor};

use crate::BLOCK_SIZES;

pub fn bench_phasor(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/phasor");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut phasor = Phasor::new(440.0, 48_000.0);
        group.bench_with_input(BenchmarkId::new("ramp", size), &size, |b, _| {
            b.iter(|| phasor.render(black_box(&mut buffer)))
        });

        // Ramp through the sine shaper, the inner loop of the pulse saws
        let mut phasor = Phasor::new(440.0, 48_000.0);
        group.bench_with_input(BenchmarkId::new("sine01", size), &size, |b, _| {
            b.iter(|| {
                for sample in buffer.iter_mut() {
                    *sample = math::sine01(phasor.next_sample());
                }
                black_box(&buffer);
            })
        });
    }

    group.finish();
}
