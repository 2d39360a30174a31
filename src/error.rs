//! Errors raised while configuring an engine. Rendering itself never fails.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("sample rate must be a positive finite number, got {0}")]
    InvalidSampleRate(f32),

    #[error("block size must be between 1 and {max}, got {got}")]
    InvalidBlockSize { got: usize, max: usize },

    #[error("control queue capacity must be at least 1")]
    InvalidQueueCapacity,
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
