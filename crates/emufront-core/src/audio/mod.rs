//! Audio output for the emulator frontend
//!
//! # Architecture
//!
//! - **Backends** ([`AudioBackend`]): registered descriptors that open an
//!   [`AudioDriver`] instance. Built in: `cpal` (with the `cpal-backend`
//!   feature), `wav` and `null`.
//! - **Pipeline** ([`AudioPipeline`]): owns the open instance, the resampler
//!   and the sample buffers. It turns the core's int16 output into
//!   device-rate blocks in the backend's preferred format.
//!
//! Everything runs on the caller's thread except the CPAL callback, which only
//! sees a lock-free ring buffer.
//!
//! # Example Usage
//!
//! ```ignore
//! use emufront_core::audio::AudioPipeline;
//! use emufront_core::config::AudioConfig;
//! use emufront_core::DriverRegistry;
//!
//! let registry = DriverRegistry::with_builtin();
//! let mut pipeline = AudioPipeline::init(&AudioConfig::default(), &registry)?;
//! pipeline.push_samples(&core_samples);
//! ```

mod backend;
mod convert;
mod error;
mod null_backend;
mod pipeline;
mod resampler;
mod wav_backend;

#[cfg(feature = "cpal-backend")]
mod cpal_backend;

pub use backend::{AudioBackend, AudioDriver, AudioInitParams, SampleBuf};
pub use convert::{f32_to_i16, i16_to_f32, quantize_into};
pub use error::{AudioError, AudioResult};
pub use null_backend::{NullAudio, NullAudioDriver};
pub use pipeline::{
    check_rate_ratio, chunk_frames_for, AudioPipeline, BufferCapacities, PipelineState,
    BLOCK_CHUNK_FRAMES, MAX_CHUNK_FRAMES, MAX_RATIO, NONBLOCK_CHUNK_FRAMES,
};
pub use resampler::{
    create_resampler, AudioResampler, HermiteResampler, ResamplerQuality, RubatoResampler,
    RESAMPLER_BLOCK_FRAMES,
};
pub use wav_backend::{WavAudio, WavAudioDriver, DEFAULT_WAV_PATH};

#[cfg(feature = "cpal-backend")]
pub use cpal_backend::{CpalAudio, CpalAudioDriver};
