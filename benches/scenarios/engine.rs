//! Benchmarks for the full engine callback.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use phasepluck::{Algorithm, Engine, EngineConfig, ParamId, SharedParams};

use crate::BLOCK_SIZES;

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/process_interleaved");
    let params = SharedParams::new();
    params.set(ParamId::Frequency, 220.0);

    for &size in BLOCK_SIZES {
        // Stereo output, the common device layout
        let mut data = vec![0.0f32; size * 2];

        for algorithm in [Algorithm::Pulse, Algorithm::String] {
            let config = EngineConfig::default().with_algorithm(algorithm);
            let Ok(mut engine) = Engine::offline(config) else {
                continue;
            };
            engine.pluck();

            let label = format!("{algorithm:?}").to_lowercase();
            group.bench_with_input(BenchmarkId::new(label, size), &size, |b, _| {
                b.iter(|| engine.process_interleaved(black_box(&params), black_box(&mut data), 2))
            });
        }
    }

    group.finish();
}
