#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::{delay::DelayLine, noise::Noise};
use crate::params::ParameterSnapshot;

/*
Karplus-Strong Plucked String
=============================

A string is modeled as a loop: a burst of energy runs around a delay line,
and every trip around the loop it is slightly filtered and slightly
attenuated. The delay length sets the pitch; the loss per trip sets the
decay; the filter rounds off the harmonics so the tone mellows as it rings.

Vocabulary
----------

  period      Delay-line length in samples: round(sample_rate / frequency).
              One trip around the loop is one cycle of the output.

  feedback    Energy kept per trip, in (0, 1). 0.996 at 220 Hz rings for
              seconds; 0.95 dies within a few hundred milliseconds. At 1.0 or
              above the loop never loses energy, so it is clamped below that.

  damping     Weight `b` of the two-tap loop filter
              y = (1 − b)·x[n] + b·x[n−1]. b = 0.5 is the classic
              Karplus-Strong average (darkest, fastest treble decay);
              b = 0 disables filtering and every harmonic decays at exactly
              the feedback rate.

  excitation  What a pluck writes into the line: a burst of white noise
              (bright, realistic attack) or a single impulse (soft, pure).


The Loop
--------

               ┌──────────────── delay line (period samples) ───────────┐
    pluck ───► │ x[n−N] ... x[n−1]                                       │
               └──────┬──────────────────────────────────────────────────┘
                      │ tap (oldest sample) ───────────────────────────► output
                      ▼
              y = (1−b)·tap + b·previous_tap
                      │
                    × feedback
                      │
                      └──────────► written back at the cursor

The output is the tap before the filter and feedback are applied, so the
first period after a pluck plays the excitation itself.


Retuning While Ringing
----------------------

When the frequency changes the line length changes with it. Rather than
clearing the line (an audible click and a dead string), the stored cycle is
resampled into the new length: the tone keeps ringing at the new pitch. The
line is preallocated for the lowest supported pitch, so retuning never
allocates.


States
------

    Idle ──pluck──► Excited ──one period──► Idle

Idle covers both silence and a decaying tail; the decay is asymptotic and
there is no terminal state. A pluck is accepted in either state and simply
restarts the string.
*/

/// Lowest frequency the delay line is sized for.
pub const MIN_FREQUENCY_HZ: f32 = 20.0;
/// Shortest allowed delay line.
pub const MIN_LINE_LENGTH: usize = 2;
/// Feedback is clamped to `[0, MAX_FEEDBACK]` so the loop always loses energy.
pub const MAX_FEEDBACK: f32 = 0.9999;

const DEFAULT_FEEDBACK: f32 = 0.996;
const DEFAULT_FILTER_AMOUNT: f32 = 0.5;

/// Signal written into the line on a pluck.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Excitation {
    /// Zero-mean white-noise burst filling the whole line
    #[default]
    Noise,
    /// A single unit sample followed by silence
    Impulse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringState {
    /// Silent or decaying
    Idle,
    /// The excitation burst is still being read out
    Excited,
}

pub struct KarplusString {
    line: DelayLine,
    noise: Noise,
    sample_rate: f32,
    frequency: f32,
    feedback: f32,
    damping: f32,
    last_tap: f32,
    excitation: Excitation,
    excited_remaining: usize,
}

impl KarplusString {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_seed(sample_rate, 1)
    }

    /// Create a string whose noise excitation is seeded with `seed`.
    pub fn with_seed(sample_rate: f32, seed: u32) -> Self {
        let mut string = Self {
            line: DelayLine::new(MIN_LINE_LENGTH),
            noise: Noise::new(seed),
            sample_rate: 0.0,
            frequency: 0.0,
            feedback: DEFAULT_FEEDBACK,
            damping: 0.5 * DEFAULT_FILTER_AMOUNT,
            last_tap: 0.0,
            excitation: Excitation::default(),
            excited_remaining: 0,
        };
        string.set_sample_rate(sample_rate);
        string
    }

    /// Resize the delay line storage for a new sample rate.
    ///
    /// Allocates; call from a configuration path, never from the audio
    /// callback. Clears the string. A non-positive sample rate leaves a
    /// minimum-length line that is never excited (silence).
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        let sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            0.0
        };
        let capacity = if sample_rate > 0.0 {
            (sample_rate / MIN_FREQUENCY_HZ).ceil() as usize + 1
        } else {
            MIN_LINE_LENGTH
        };

        self.sample_rate = sample_rate;
        self.line = DelayLine::new(capacity.max(MIN_LINE_LENGTH));
        self.last_tap = 0.0;
        self.excited_remaining = 0;

        if self.frequency > 0.0 {
            let frequency = self.frequency;
            self.set_frequency(frequency);
        }
    }

    /// Delay length for `hertz`, clamped to `[MIN_LINE_LENGTH, capacity]`.
    ///
    /// Non-positive or non-finite requests map to the longest line.
    pub fn line_length_for(&self, hertz: f32) -> usize {
        let capacity = self.line.capacity();
        if !(hertz.is_finite() && hertz > 0.0) || self.sample_rate <= 0.0 {
            return capacity;
        }
        // Saturating cast: huge ratios hit the capacity, NaN becomes 0
        let len = (self.sample_rate / hertz).round() as usize;
        len.clamp(MIN_LINE_LENGTH, capacity)
    }

    /// Retune the string. Content already in the line is resampled.
    pub fn set_frequency(&mut self, hertz: f32) {
        self.frequency = hertz;
        let len = self.line_length_for(hertz);
        if len != self.line.active_len() {
            self.line.resize_resampled(len);
            self.excited_remaining = self.excited_remaining.min(len);
        }
    }

    /// Per-period energy retention, clamped to `[0, MAX_FEEDBACK]`.
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = if feedback.is_nan() {
            0.0
        } else {
            feedback.clamp(0.0, MAX_FEEDBACK)
        };
    }

    /// Loop filter amount in [0, 1]; 1.0 is the classic two-sample average.
    pub fn set_damping(&mut self, filter_amount: f32) {
        let amount = if filter_amount.is_nan() {
            DEFAULT_FILTER_AMOUNT
        } else {
            filter_amount.clamp(0.0, 1.0)
        };
        self.damping = 0.5 * amount;
    }

    pub fn set_excitation(&mut self, excitation: Excitation) {
        self.excitation = excitation;
    }

    /// Write a fresh excitation over the whole line, restarting the string.
    pub fn pluck(&mut self) {
        if self.sample_rate <= 0.0 {
            return;
        }

        match self.excitation {
            Excitation::Noise => {
                let noise = &mut self.noise;
                self.line.fill_with(|_| noise.next_sample());
                self.line.remove_mean();
            }
            Excitation::Impulse => {
                self.line.fill_with(|i| if i == 0 { 1.0 } else { 0.0 });
            }
        }

        self.last_tap = 0.0;
        self.excited_remaining = self.line.active_len();
    }

    /// Produce one output sample and feed the filtered tap back into the line.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let tap = self.line.tap();
        let filtered = (1.0 - self.damping) * tap + self.damping * self.last_tap;
        self.last_tap = tap;
        self.line.push(filtered * self.feedback);
        self.excited_remaining = self.excited_remaining.saturating_sub(1);
        tap
    }

    /// Render a block with parameters held constant for its duration.
    pub fn render(&mut self, buffer: &mut [f32], params: &ParameterSnapshot) {
        self.set_frequency(params.frequency);
        self.set_feedback(params.feedback);
        self.set_damping(params.filter_amount);

        for sample in buffer.iter_mut() {
            *sample = self.next_sample() * params.gain;
        }
    }

    /// Silence the line (stream restart). Parameters are kept.
    pub fn reset(&mut self) {
        self.line.reset();
        self.last_tap = 0.0;
        self.excited_remaining = 0;
    }

    pub fn state(&self) -> StringState {
        if self.excited_remaining > 0 {
            StringState::Excited
        } else {
            StringState::Idle
        }
    }

    /// Current delay length in samples.
    pub fn period(&self) -> usize {
        self.line.active_len()
    }

    pub fn capacity(&self) -> usize {
        self.line.capacity()
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    pub fn damping(&self) -> f32 {
        self.damping
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Energy currently stored in the loop (sum of squares).
    pub fn energy(&self) -> f32 {
        self.line.energy()
    }
}
