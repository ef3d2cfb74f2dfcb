//! Audio backend error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during audio operations
#[derive(Error, Debug)]
pub enum AudioError {
    /// Failed to get default device
    #[error("Failed to get default audio device: {0}")]
    NoDefaultDevice(String),

    /// Device not found
    #[error("Audio device not found: {0}")]
    DeviceNotFound(String),

    /// Failed to get device configuration
    #[error("Failed to get device config: {0}")]
    ConfigError(String),

    /// Failed to build audio stream
    #[error("Failed to build audio stream: {0}")]
    StreamBuildError(String),

    /// Failed to start/play stream
    #[error("Failed to start audio stream: {0}")]
    StreamPlayError(String),

    /// The backend could not accept samples (device gone, consumer dropped)
    #[error("Audio write failed: {0}")]
    WriteFailed(String),

    /// File output error (wav backend)
    #[error("Audio file error: {path}: {reason}")]
    FileError { path: PathBuf, reason: String },

    /// Resampler construction or processing failed
    #[error("Resampler error: {0}")]
    Resampler(String),

    /// Output rate is too far above the input rate for the buffer sizing
    #[error(
        "Output rate {out_rate}Hz must be less than {max_ratio}x the input rate {in_rate}Hz"
    )]
    RateRatioExceeded {
        out_rate: u32,
        in_rate: u32,
        max_ratio: u32,
    },
}

/// Result type for audio operations
pub type AudioResult<T> = Result<T, AudioError>;
