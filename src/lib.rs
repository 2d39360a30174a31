pub mod config;
pub mod control; // Pluck events across threads
pub mod dsp;
pub mod engine;
pub mod error;
pub mod params; // Snapshot, ranges and the shared store

pub use config::EngineConfig;
pub use engine::{Algorithm, Engine};
pub use error::ConfigError;
pub use params::{ParamId, ParameterSnapshot, SharedParams};

pub const MAX_BLOCK_SIZE: usize = 2048;
