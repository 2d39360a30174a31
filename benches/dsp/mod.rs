//! Benchmarks for low-level DSP primitives.

mod delay;
mod phasor;
mod pulse;
mod string;

pub use delay::bench_delay;
pub use phasor::bench_phasor;
pub use pulse::bench_pulse;
pub use string::bench_string;
