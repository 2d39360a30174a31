#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::string::Excitation,
    engine::Algorithm,
    error::{ConfigError, Result},
    MAX_BLOCK_SIZE,
};

/// Everything an [`Engine`](crate::engine::Engine) needs before the stream
/// starts.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Largest block the host will ask for in one call
    pub max_block_size: usize,
    pub algorithm: Algorithm,
    pub excitation: Excitation,
    /// Pending plucks the control queue can hold
    pub control_queue_capacity: usize,
    /// Seed for the string's noise excitation
    pub seed: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            max_block_size: MAX_BLOCK_SIZE,
            algorithm: Algorithm::default(),
            excitation: Excitation::default(),
            control_queue_capacity: 64,
            seed: 0x5EED_1234,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_max_block_size(mut self, max_block_size: usize) -> Self {
        self.max_block_size = max_block_size;
        self
    }

    pub fn with_excitation(mut self, excitation: Excitation) -> Self {
        self.excitation = excitation;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.max_block_size == 0 || self.max_block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::InvalidBlockSize {
                got: self.max_block_size,
                max: MAX_BLOCK_SIZE,
            });
        }
        if self.control_queue_capacity == 0 {
            return Err(ConfigError::InvalidQueueCapacity);
        }
        Ok(())
    }
}
