//! Error types for the engine.
//!
//! Two families: construction errors surface to the caller and decide whether a
//! session can exist at all; synthesis errors are per voice and never leave the
//! scheduler.

use thiserror::Error;

/// Errors raised while opening an output or constructing an [`Engine`](crate::Engine).
#[derive(Debug, Error)]
pub enum EngineError {
    /// No default output device is available.
    #[error("no audio output device available")]
    NoDevice,

    /// A named device was requested but not found.
    #[error("requested device not found: {0}")]
    DeviceNotFound(String),

    /// The device reported a sample rate the engine cannot run at.
    #[error("invalid device sample rate: {0}")]
    InvalidSampleRate(f32),

    /// Querying or configuring the device failed.
    #[error("device configuration error: {0}")]
    DeviceConfig(String),

    /// The device offers a sample format the engine cannot write.
    #[error("unsupported device sample format: {0}")]
    UnsupportedFormat(String),

    /// Building or starting the output stream failed.
    #[error("output stream error: {0}")]
    Stream(String),

    /// The scheduler thread could not be spawned.
    #[error("failed to spawn scheduler thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Errors raised while rendering a single voice. Always recovered by dropping the voice.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SynthError {
    /// The mixer's intake queue is full.
    #[error("mixer queue full; voice dropped")]
    QueueFull,

    /// The requested start time is not a finite clock value.
    #[error("invalid start time: {0}")]
    InvalidTime(f64),

    /// The requested oscillator frequency is not usable.
    #[error("invalid frequency: {0} Hz")]
    InvalidFrequency(f32),
}

/// Result type for engine construction.
pub type EngineResult<T> = Result<T, EngineError>;
