//! Low-level DSP primitives the voices are built from.
//!
//! These components are allocation-free after construction and realtime-safe,
//! making them safe to run directly inside the audio callback. They stay
//! focused on the signal-processing math; parameter plumbing and control
//! events live in the engine.

/// Circular delay line with resampling resize.
pub mod delay;
/// Shared math helpers and the sine shaper.
pub mod math;
/// Seeded white-noise source.
pub mod noise;
/// Normalized phase accumulator.
pub mod phasor;
/// Phase-distortion pulse oscillator built from two feedback saws.
pub mod pulse;
/// Karplus-Strong plucked string.
pub mod string;

pub use phasor::Phasor;
pub use pulse::PulseOscillator;
pub use string::{Excitation, KarplusString, StringState};
