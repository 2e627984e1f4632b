//! SpinFlow Core - Volume-Reactive Animator Domain
//!
//! This crate contains the audio-reactive domain model for SpinFlow:
//! - Running-baseline volume tracking and the visual parameters derived
//!   from it (rotation, saturation, grain)
//! - Ripple events spawned by volume peaks and their decay rules
//! - The spectrum-source abstraction the animator consumes
//! - An FFT-backed byte-spectrum analyzer and the cpal capture backend
//!   that feeds it

#![warn(missing_docs)]

use thiserror::Error;

pub mod analyzer;
pub mod animator;
#[cfg(feature = "audio")]
pub mod capture;
pub mod logging;
pub mod ripple;
pub mod spectrum;
pub mod visual;

pub use analyzer::{ByteSpectrumAnalyzer, SpectrumAnalyzerConfig};
pub use animator::{AnimatorConfig, VolumeAnimator};
#[cfg(feature = "audio")]
pub use capture::{CaptureBackend, CaptureSource};
pub use logging::LogConfig;
pub use ripple::{Ripple, RippleField};
pub use spectrum::{normalized_mean, SpectrumSource, MAX_BIN_VALUE};
pub use visual::VisualFrame;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// The audio backend could not be opened or died mid-stream
    #[error("audio backend error: {0}")]
    AudioBackend(String),

    /// Rejected analyzer configuration
    #[error("invalid analyzer config: {0}")]
    InvalidConfig(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
