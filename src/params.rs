//! Parameter surface: the per-block snapshot the synthesis code reads, the
//! declared ranges of every control, and a lock-free store the control thread
//! writes into.
//!
//! The audio thread never looks parameters up by name. Once per block it
//! calls [`SharedParams::snapshot`] and hands the resulting
//! [`ParameterSnapshot`] to the voice by reference.

use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::math::{amp_to_db, db_to_amp, map_range, mtof};

/// Lowest MIDI note accepted by [`SharedParams::set_note`].
pub const MIN_NOTE: f32 = 36.0;
/// Highest MIDI note accepted by [`SharedParams::set_note`].
pub const MAX_NOTE: f32 = 96.0;
/// Quietest gain accepted by [`SharedParams::set_gain_db`].
pub const MIN_GAIN_DB: f32 = -60.0;

/// Feedback coefficient at decay = 0.
pub const MIN_STRING_FEEDBACK: f32 = 0.95;
/// Feedback coefficient at the top of the decay range.
pub const MAX_STRING_FEEDBACK: f32 = 0.999;
const MAX_DECAY: f32 = 0.999;
const DEFAULT_DECAY: f32 = 0.5;

/// Resolved physical values, constant for one processing block.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSnapshot {
    /// Linear output gain
    pub gain: f32,
    /// Oscillator / string frequency in Hz
    pub frequency: f32,
    /// Phase offset between the two saws, 0..1
    pub pulse_width: f32,
    /// String feedback coefficient (already mapped from decay)
    pub feedback: f32,
    /// String loop damping, 0..1
    pub filter_amount: f32,
}

impl Default for ParameterSnapshot {
    fn default() -> Self {
        Self {
            gain: ParamId::Gain.spec().default,
            frequency: ParamId::Frequency.spec().default,
            pulse_width: ParamId::PulseWidth.spec().default,
            feedback: decay_to_feedback(DEFAULT_DECAY),
            filter_amount: ParamId::FilterAmount.spec().default,
        }
    }
}

/// Map the user-facing decay control onto the string feedback coefficient.
///
/// 0.0 → 0.95 (short), 0.999 → 0.999 (long). Out-of-range input is clamped.
pub fn decay_to_feedback(decay: f32) -> f32 {
    let decay = if decay.is_nan() { 0.0 } else { decay.clamp(0.0, MAX_DECAY) };
    map_range(decay, 0.0, MAX_DECAY, MIN_STRING_FEEDBACK, MAX_STRING_FEEDBACK)
}

/// How a normalized 0..1 control position maps onto the value range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamCurve {
    Linear,
    /// Equal control travel per octave (min must be > 0)
    Exponential,
    /// Equal control travel per dB from `MIN_GAIN_DB` up to `max`; the
    /// bottom of the travel is exact silence
    Decibel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    Gain,
    Frequency,
    PulseWidth,
    /// String model only
    Decay,
    /// String model only
    FilterAmount,
}

impl ParamId {
    pub const ALL: [ParamId; 5] = [
        ParamId::Gain,
        ParamId::Frequency,
        ParamId::PulseWidth,
        ParamId::Decay,
        ParamId::FilterAmount,
    ];

    pub fn spec(self) -> &'static ParamSpec {
        &PARAMS[self as usize]
    }
}

/// Declared range, default and curve of one control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub id: ParamId,
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub curve: ParamCurve,
}

impl ParamSpec {
    /// Clamp into `[min, max]`. NaN falls back to the default.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }

    /// Value → control position in [0, 1].
    pub fn normalize(&self, value: f32) -> f32 {
        let value = self.clamp(value);
        match self.curve {
            ParamCurve::Linear => (value - self.min) / (self.max - self.min),
            ParamCurve::Exponential => (value / self.min).ln() / (self.max / self.min).ln(),
            ParamCurve::Decibel => {
                if value <= 0.0 {
                    return 0.0;
                }
                let top = amp_to_db(self.max);
                let db = amp_to_db(value).clamp(MIN_GAIN_DB, top);
                (db - MIN_GAIN_DB) / (top - MIN_GAIN_DB)
            }
        }
    }

    /// Control position in [0, 1] → value.
    pub fn denormalize(&self, position: f32) -> f32 {
        let t = if position.is_nan() { 0.0 } else { position.clamp(0.0, 1.0) };
        let value = match self.curve {
            ParamCurve::Linear => self.min + t * (self.max - self.min),
            ParamCurve::Exponential => self.min * (self.max / self.min).powf(t),
            ParamCurve::Decibel if t == 0.0 => 0.0,
            ParamCurve::Decibel => {
                db_to_amp(MIN_GAIN_DB + t * (amp_to_db(self.max) - MIN_GAIN_DB))
            }
        };
        self.clamp(value)
    }
}

/// Indexed by `ParamId as usize`.
pub static PARAMS: [ParamSpec; 5] = [
    ParamSpec {
        id: ParamId::Gain,
        name: "gain",
        min: 0.0,
        max: 4.0,
        default: 1.0,
        curve: ParamCurve::Decibel,
    },
    ParamSpec {
        id: ParamId::Frequency,
        name: "frequency",
        min: 20.0,
        max: 20_000.0,
        default: 440.0,
        curve: ParamCurve::Exponential,
    },
    ParamSpec {
        id: ParamId::PulseWidth,
        name: "pulse_width",
        min: 0.0,
        max: 1.0,
        default: 0.5,
        curve: ParamCurve::Linear,
    },
    ParamSpec {
        id: ParamId::Decay,
        name: "decay",
        min: 0.0,
        max: MAX_DECAY,
        default: DEFAULT_DECAY,
        curve: ParamCurve::Linear,
    },
    ParamSpec {
        id: ParamId::FilterAmount,
        name: "filter_amount",
        min: 0.0,
        max: 1.0,
        default: 0.5,
        curve: ParamCurve::Linear,
    },
];

/// f32 stored as raw bits in an `AtomicU32`.
#[derive(Debug)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Lock-free parameter store shared between the control and audio threads.
///
/// Each value is an independent relaxed atomic: a snapshot taken while the
/// control thread is mid-update may mix old and new values across fields.
/// That is acceptable for continuous controls because the next block reads
/// the settled values. Discrete events (plucks) do not go through here; see
/// [`crate::control`].
#[derive(Debug)]
pub struct SharedParams {
    values: [AtomicF32; 5],
}

impl SharedParams {
    pub fn new() -> Self {
        Self {
            values: PARAMS.map(|spec| AtomicF32::new(spec.default)),
        }
    }

    /// Store `value` clamped to the declared range of `id`.
    pub fn set(&self, id: ParamId, value: f32) {
        self.values[id as usize].store(id.spec().clamp(value));
    }

    pub fn get(&self, id: ParamId) -> f32 {
        self.values[id as usize].load()
    }

    /// Set the frequency from a MIDI note (clamped to 36..96).
    pub fn set_note(&self, note: f32) {
        let note = if note.is_nan() { 60.0 } else { note.clamp(MIN_NOTE, MAX_NOTE) };
        self.set(ParamId::Frequency, mtof(note));
    }

    /// Set the gain in dB (clamped to -60..0).
    pub fn set_gain_db(&self, db: f32) {
        let db = if db.is_nan() { 0.0 } else { db.clamp(MIN_GAIN_DB, 0.0) };
        self.set(ParamId::Gain, db_to_amp(db));
    }

    /// Read every value once and resolve it for the synthesis code.
    pub fn snapshot(&self) -> ParameterSnapshot {
        ParameterSnapshot {
            gain: self.get(ParamId::Gain),
            frequency: self.get(ParamId::Frequency),
            pulse_width: self.get(ParamId::PulseWidth),
            feedback: decay_to_feedback(self.get(ParamId::Decay)),
            filter_amount: self.get(ParamId::FilterAmount),
        }
    }
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new()
    }
}
