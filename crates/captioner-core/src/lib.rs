//! Captioner Core — shared error type and environment configuration.

pub mod config;
pub mod error;

pub use config::{BackendKind, CaptionerConfig, ModelConfig};
pub use error::{Error, Result};
