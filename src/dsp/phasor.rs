/*
Phase Accumulator
=================

Every periodic waveform needs a clock that says "where in the cycle are we?".
A phasor is that clock: a ramp that climbs from 0.0 towards 1.0 and then
snaps back, once per cycle.

Vocabulary
----------

  increment   How far the phase moves per sample, in cycles.
              increment = frequency / sample_rate
              At 440 Hz and 48 kHz: 440 / 48000 ≈ 0.00917 cycles/sample.

  offset      A constant bias added to the output (not to the stored phase).
              Two phasors with the same increment and offsets 0.0 and 0.5 run
              exactly half a cycle apart.

  wrap        Bringing the phase back into [0, 1) by subtracting 1.0.


The Ramp
--------

    1.0 ┤    ╱│    ╱│    ╱│
        │   ╱ │   ╱ │   ╱ │
        │  ╱  │  ╱  │  ╱  │
    0.0 ┼─╱───┴─╱───┴─╱───┴──→ samples
         │←───→│
       sample_rate / frequency samples


Single-Subtraction Wrap
-----------------------

The wrap is a single `if phase >= 1.0 { phase -= 1.0 }`. That is only
correct while the increment stays below 1.0, i.e. while the frequency is
below the sample rate: one step can never carry the phase more than one
cycle past the boundary. This is a precondition of `set_frequency`, not
something the phasor tries to paper over. Audio-rate oscillators sit far
below it (20 kHz at 44.1 kHz is an increment of 0.45).
*/

/// Normalized phase accumulator producing a ramp in [0, 1).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Phasor {
    /// Per-sample phase increment (cycles per sample)
    increment: f32,
    /// Running phase, kept in [0, 1) by the wrap
    phase: f32,
    /// Constant bias added to each output
    offset: f32,
}

impl Phasor {
    /// Create a phasor running at `hertz` for the given sample rate.
    pub fn new(hertz: f32, sample_rate: f32) -> Self {
        let mut phasor = Self::default();
        phasor.set_frequency(hertz, sample_rate);
        phasor
    }

    /// Start the output `offset` cycles ahead of the stored phase.
    pub fn with_offset(mut self, offset: f32) -> Self {
        self.set_offset(offset);
        self
    }

    /// Store `hertz / sample_rate` as the per-sample increment.
    ///
    /// A non-positive sample rate, or a negative / non-finite frequency,
    /// sets the increment to zero and the phasor holds still (silence).
    ///
    /// Precondition: `hertz < sample_rate`. The single-subtraction wrap in
    /// [`next_sample`](Self::next_sample) is wrong for increments of 1.0 or
    /// more.
    pub fn set_frequency(&mut self, hertz: f32, sample_rate: f32) {
        let increment = if sample_rate > 0.0 && hertz.is_finite() && hertz > 0.0 {
            hertz / sample_rate
        } else {
            0.0
        };
        debug_assert!(
            increment < 1.0,
            "phasor increment {increment} must stay below one cycle per sample"
        );
        self.increment = increment;
    }

    /// Set the constant phase bias. Expected in [0, 1).
    pub fn set_offset(&mut self, offset: f32) {
        self.offset = offset;
    }

    /// Zero phase, increment and offset.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.increment = 0.0;
        self.offset = 0.0;
    }

    /// Return the current phase (plus offset) and advance by one sample.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        let mut output = self.phase + self.offset;
        if output >= 1.0 {
            output -= 1.0;
        }

        self.phase += self.increment;
        output
    }

    /// Fill `buffer` with consecutive phase values.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    pub fn increment(&self) -> f32 {
        self.increment
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }
}
