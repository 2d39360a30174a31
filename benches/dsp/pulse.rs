//! Benchmarks for the pulse oscillator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use phasepluck::{dsp::PulseOscillator, ParameterSnapshot};

use crate::BLOCK_SIZES;

pub fn bench_pulse(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/pulse");

    // Low notes feed back hardest; high notes barely at all
    let notes: &[(&str, f32)] = &[("low", 55.0), ("mid", 440.0), ("high", 7_040.0)];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for &(label, frequency) in notes {
            let mut osc = PulseOscillator::new();
            let params = ParameterSnapshot {
                frequency,
                pulse_width: 0.3,
                ..ParameterSnapshot::default()
            };
            group.bench_with_input(BenchmarkId::new(label, size), &size, |b, _| {
                b.iter(|| osc.render(black_box(&mut buffer), black_box(&params), 48_000.0))
            });
        }
    }

    group.finish();
}
