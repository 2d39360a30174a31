//! Benchmarks for the plucked string.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use phasepluck::{
    dsp::{Excitation, KarplusString},
    ParameterSnapshot,
};

use crate::BLOCK_SIZES;

pub fn bench_string(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/string");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let params = ParameterSnapshot {
            frequency: 220.0,
            feedback: 0.996,
            ..ParameterSnapshot::default()
        };

        let mut string = KarplusString::new(48_000.0);
        string.render(&mut buffer, &params);
        string.pluck();
        group.bench_with_input(BenchmarkId::new("ringing", size), &size, |b, _| {
            b.iter(|| string.render(black_box(&mut buffer), black_box(&params)))
        });

        // Frequency changes every block: the resampling retune path
        let mut string = KarplusString::new(48_000.0);
        string.pluck();
        let mut toggle = false;
        group.bench_with_input(BenchmarkId::new("retune", size), &size, |b, _| {
            b.iter(|| {
                toggle = !toggle;
                let params = ParameterSnapshot {
                    frequency: if toggle { 220.0 } else { 233.08 },
                    ..params
                };
                string.render(black_box(&mut buffer), black_box(&params));
            })
        });
    }
    group.finish();

    // Pluck cost depends on the line length, not the block size
    let mut group = c.benchmark_group("dsp/string_pluck");
    for (label, frequency) in [("a1", 55.0f32), ("a4", 440.0)] {
        for excitation in [Excitation::Noise, Excitation::Impulse] {
            let mut string = KarplusString::new(48_000.0);
            string.set_frequency(frequency);
            string.set_excitation(excitation);
            group.bench_function(format!("{label}_{excitation:?}").to_lowercase(), |b| {
                b.iter(|| string.pluck())
            });
        }
    }
    group.finish();
}
