//! Host callback benchmarks.
//!
//! These model what an audio device callback does each period: take a
//! parameter snapshot, drain plucks, render, and broadcast to the channels.

mod engine;

pub use engine::bench_engine;
