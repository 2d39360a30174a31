use crate::dsp::math::lerp;

/// Circular delay line whose active length can change without allocating.
///
/// Storage is sized once, at construction, to `capacity` samples. The active
/// length is anywhere in `[1, capacity]`; `tap` always returns the sample
/// written exactly `len` pushes ago.
pub struct DelayLine {
    buffer: Vec<f32>,
    scratch: Vec<f32>,
    len: usize,
    write_pos: usize,
}

impl DelayLine {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: vec![0.0; capacity],
            scratch: vec![0.0; capacity],
            len: capacity,
            write_pos: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Samples between a write and its read; never below one.
    pub fn active_len(&self) -> usize {
        self.len
    }

    /// The oldest sample in the line (written `len` samples ago).
    #[inline]
    pub fn tap(&self) -> f32 {
        self.buffer[self.write_pos]
    }

    /// Overwrite the oldest sample and advance the cursor.
    #[inline]
    pub fn push(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos += 1;
        if self.write_pos >= self.len {
            self.write_pos = 0;
        }
    }

    /// Push `sample` and return the one it displaced.
    #[inline]
    pub fn next_sample(&mut self, sample: f32) -> f32 {
        let delayed = self.tap();
        self.push(sample);
        delayed
    }

    /// Overwrite the whole active region, oldest sample first.
    pub fn fill_with(&mut self, mut f: impl FnMut(usize) -> f32) {
        for (i, slot) in self.buffer[..self.len].iter_mut().enumerate() {
            *slot = f(i);
        }
        self.write_pos = 0;
    }

    /// Subtract the mean of the active region so it carries no DC.
    pub fn remove_mean(&mut self) {
        let active = &mut self.buffer[..self.len];
        let mean = active.iter().sum::<f32>() / active.len() as f32;
        for slot in active.iter_mut() {
            *slot -= mean;
        }
    }

    /// Change the active length, stretching the current contents to fit.
    ///
    /// The stored cycle is linearly resampled (treating it as periodic) into
    /// the new length, so a line holding a decaying waveform keeps its shape
    /// and level and only its pitch changes. `new_len` is clamped to
    /// `[1, capacity]`.
    pub fn resize_resampled(&mut self, new_len: usize) {
        let new_len = new_len.clamp(1, self.capacity());
        if new_len == self.len {
            return;
        }

        let old_len = self.len;
        let step = old_len as f32 / new_len as f32;
        for i in 0..new_len {
            let pos = i as f32 * step;
            let j0 = (pos as usize).min(old_len - 1);
            let j1 = if j0 + 1 == old_len { 0 } else { j0 + 1 };
            let a = self.buffer[(self.write_pos + j0) % old_len];
            let b = self.buffer[(self.write_pos + j1) % old_len];
            self.scratch[i] = lerp(a, b, pos - j0 as f32);
        }

        self.buffer[..new_len].copy_from_slice(&self.scratch[..new_len]);
        self.len = new_len;
        self.write_pos = 0;
    }

    /// Sum of squares over the active region.
    pub fn energy(&self) -> f32 {
        self.buffer[..self.len].iter().map(|x| x * x).sum()
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.scratch.fill(0.0);
        self.write_pos = 0;
    }
}
