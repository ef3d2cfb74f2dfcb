//! Audio pipeline: core samples in, device-rate blocks out
//!
//! The emulated core submits interleaved stereo int16 samples at its own rate.
//! The pipeline normalizes them into a raw buffer and, each time a full chunk
//! has accumulated, resamples it to the output rate, converts it to the
//! backend's preferred format and writes it.
//!
//! ```text
//! i16 samples ──► raw (StereoSample) ──► resampler ──► f32 ──┬──► backend (float)
//!                 chunk_frames                                └──► quantize ──► backend (i16)
//! ```
//!
//! Chunk size depends on the sync mode. Blocking writes use small chunks so the
//! backend's stall paces the frontend finely. Non-blocking writes (sync off or
//! fast-forward) use large chunks, which keeps dropped audio from turning into
//! line noise.
//!
//! Audio is best-effort: a backend that fails to open or stops accepting
//! writes disables the pipeline for the rest of the run. The only fatal checks
//! are the driver name and the rate ratio.

use crate::config::AudioConfig;
use crate::driver::{Backend, DriverRegistry, DriverResult};
use crate::types::{as_interleaved, StereoSample, CHANNELS};

use super::backend::{AudioBackend, AudioDriver, AudioInitParams, SampleBuf};
use super::convert::quantize_into;
use super::error::{AudioError, AudioResult};
use super::resampler::{create_resampler, AudioResampler};

/// Chunk size in frames while writes block
pub const BLOCK_CHUNK_FRAMES: usize = 64;

/// Chunk size in frames while writes don't block
pub const NONBLOCK_CHUNK_FRAMES: usize = 2048;

/// Output rate must stay strictly below `in_rate * MAX_RATIO`
pub const MAX_RATIO: u32 = 16;

/// Largest chunk either sync mode uses
pub const MAX_CHUNK_FRAMES: usize = if BLOCK_CHUNK_FRAMES > NONBLOCK_CHUNK_FRAMES {
    BLOCK_CHUNK_FRAMES
} else {
    NONBLOCK_CHUNK_FRAMES
};

/// Chunk size for a sync mode
#[inline]
pub fn chunk_frames_for(nonblock: bool) -> usize {
    if nonblock {
        NONBLOCK_CHUNK_FRAMES
    } else {
        BLOCK_CHUNK_FRAMES
    }
}

/// Reject output rates the converted-output buffers can't hold
pub fn check_rate_ratio(out_rate: u32, in_rate: u32) -> AudioResult<()> {
    if u64::from(out_rate) >= u64::from(in_rate) * u64::from(MAX_RATIO) {
        return Err(AudioError::RateRatioExceeded {
            out_rate,
            in_rate,
            max_ratio: MAX_RATIO,
        });
    }
    Ok(())
}

/// Lifecycle of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No backend: configured off, failed to open, or failed while streaming
    Disabled,
    /// Backend open and buffers allocated, nothing submitted yet
    Buffered,
    /// At least one submission has been made
    Streaming,
    /// Torn down by the owner
    TornDown,
}

/// Sample capacities of the three pipeline buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferCapacities {
    pub raw: usize,
    pub resampled: usize,
    pub quantized: usize,
}

/// Everything that exists only while a backend is open
struct AudioStream {
    driver: Box<dyn AudioDriver>,
    backend: &'static str,
    resampler: Box<dyn AudioResampler>,
    use_float: bool,
    nonblock: bool,
    chunk_frames: usize,
    /// Normalized input awaiting a flush. Its length is the write cursor.
    raw: Vec<StereoSample>,
    resampled: Vec<f32>,
    quantized: Vec<i16>,
}

impl AudioStream {
    fn push(&mut self, samples: &[i16]) -> AudioResult<()> {
        for frame in samples.chunks_exact(CHANNELS) {
            self.raw.push(StereoSample::from_i16(frame[0], frame[1]));
            if self.raw.len() >= self.chunk_frames {
                self.flush()?;
            }
        }
        Ok(())
    }

    /// Resample, convert and write whatever the raw buffer holds
    fn flush(&mut self) -> AudioResult<()> {
        self.resampled.clear();
        self.resampler
            .process(as_interleaved(&self.raw), &mut self.resampled)?;
        self.raw.clear();

        let block = if self.use_float {
            SampleBuf::Float(&self.resampled)
        } else {
            quantize_into(&self.resampled, &mut self.quantized);
            SampleBuf::Int16(&self.quantized)
        };
        if block.is_empty() {
            return Ok(());
        }

        let accepted = self.driver.write(block)?;
        if accepted < block.len() {
            log::trace!(
                "{} accepted {}/{} samples",
                self.backend,
                accepted,
                block.len()
            );
        }
        Ok(())
    }

    fn set_nonblock(&mut self, nonblock: bool) -> AudioResult<()> {
        self.nonblock = nonblock;
        self.driver.set_nonblock_state(nonblock);
        self.chunk_frames = chunk_frames_for(nonblock);
        if self.raw.len() >= self.chunk_frames {
            self.flush()?;
        }
        Ok(())
    }
}

/// The audio pipeline
///
/// Owns the audio backend instance. Every operation is a no-op once the
/// pipeline is disabled or torn down.
pub struct AudioPipeline {
    stream: Option<AudioStream>,
    state: PipelineState,
}

impl AudioPipeline {
    /// A pipeline that never produces sound
    pub fn disabled() -> Self {
        Self {
            stream: None,
            state: PipelineState::Disabled,
        }
    }

    /// Resolve the configured backend and open it
    ///
    /// Fails only on an unknown driver name or an output rate at or above
    /// `MAX_RATIO` times the input rate. A backend or resampler that fails to
    /// open leaves the pipeline disabled.
    pub fn init(config: &AudioConfig, registry: &DriverRegistry) -> DriverResult<Self> {
        if !config.enable {
            log::info!("Audio disabled by config");
            return Ok(Self::disabled());
        }

        let backend = registry.resolve_audio(&config.driver)?;
        check_rate_ratio(config.out_rate, config.in_rate)?;

        Ok(Self::open(backend, config))
    }

    fn open(backend: &dyn AudioBackend, config: &AudioConfig) -> Self {
        let params = AudioInitParams {
            device: config.device_name(),
            rate: config.out_rate,
            latency_ms: config.latency,
        };

        let mut driver = match backend.init(&params) {
            Ok(driver) => driver,
            Err(e) => {
                log::warn!(
                    "Failed to open audio driver \"{}\": {}. Continuing without sound.",
                    backend.ident(),
                    e
                );
                return Self::disabled();
            }
        };

        let resampler =
            match create_resampler(config.resampler, config.in_rate, config.out_rate, CHANNELS) {
                Ok(resampler) => resampler,
                Err(e) => {
                    log::warn!("Failed to create resampler: {}. Continuing without sound.", e);
                    return Self::disabled();
                }
            };

        let use_float = driver.use_float();
        let nonblock = !config.sync;
        if nonblock {
            driver.set_nonblock_state(true);
        }
        let chunk_frames = chunk_frames_for(nonblock);

        let out_samples = MAX_CHUNK_FRAMES * MAX_RATIO as usize * CHANNELS;

        log::info!(
            "Audio: {} at {}Hz (core {}Hz), {} samples, {} chunks of {} frames",
            backend.ident(),
            config.out_rate,
            config.in_rate,
            if use_float { "float" } else { "int16" },
            if nonblock { "non-blocking" } else { "blocking" },
            chunk_frames
        );

        Self {
            stream: Some(AudioStream {
                driver,
                backend: backend.ident(),
                resampler,
                use_float,
                nonblock,
                chunk_frames,
                raw: Vec::with_capacity(MAX_CHUNK_FRAMES),
                resampled: Vec::with_capacity(out_samples),
                quantized: Vec::with_capacity(out_samples),
            }),
            state: PipelineState::Buffered,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// True while a backend is open and accepting samples
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Active chunk size in frames
    pub fn chunk_frames(&self) -> Option<usize> {
        self.stream.as_ref().map(|s| s.chunk_frames)
    }

    /// Whether the backend gets float samples
    pub fn uses_float(&self) -> Option<bool> {
        self.stream.as_ref().map(|s| s.use_float)
    }

    pub fn is_nonblocking(&self) -> Option<bool> {
        self.stream.as_ref().map(|s| s.nonblock)
    }

    /// Frames waiting in the raw buffer for the next flush
    pub fn buffered_frames(&self) -> usize {
        self.stream.as_ref().map_or(0, |s| s.raw.len())
    }

    pub fn buffer_capacities(&self) -> Option<BufferCapacities> {
        self.stream.as_ref().map(|s| BufferCapacities {
            raw: s.raw.capacity() * CHANNELS,
            resampled: s.resampled.capacity(),
            quantized: s.quantized.capacity(),
        })
    }

    /// Submit interleaved stereo samples from the core
    ///
    /// A trailing odd sample is ignored.
    pub fn push_samples(&mut self, samples: &[i16]) {
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        self.state = PipelineState::Streaming;

        if let Err(e) = stream.push(samples) {
            self.degrade(e);
        }
    }

    /// Submit a single stereo frame
    #[inline]
    pub fn push_frame(&mut self, left: i16, right: i16) {
        self.push_samples(&[left, right]);
    }

    /// Switch between blocking and non-blocking delivery
    pub fn set_nonblock(&mut self, nonblock: bool) {
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        if stream.nonblock == nonblock {
            return;
        }

        log::debug!(
            "Audio switching to {} writes",
            if nonblock { "non-blocking" } else { "blocking" }
        );
        if let Err(e) = stream.set_nonblock(nonblock) {
            self.degrade(e);
        }
    }

    /// Pause the backend. Buffered samples are kept.
    pub fn stop(&mut self) -> bool {
        match self.stream.as_mut() {
            Some(stream) => {
                let ok = stream.driver.stop();
                if !ok {
                    log::warn!("{} failed to pause", stream.backend);
                }
                ok
            }
            None => true,
        }
    }

    /// Resume after [`stop`](Self::stop)
    pub fn start(&mut self) -> bool {
        match self.stream.as_mut() {
            Some(stream) => {
                let ok = stream.driver.start();
                if !ok {
                    log::warn!("{} failed to resume", stream.backend);
                }
                ok
            }
            None => true,
        }
    }

    /// Release the backend, the resampler and every buffer
    ///
    /// Safe to call any number of times.
    pub fn teardown(&mut self) {
        if let Some(stream) = self.stream.take() {
            log::debug!("Closing audio driver \"{}\"", stream.backend);
            drop(stream);
        }
        self.state = PipelineState::TornDown;
    }

    fn degrade(&mut self, err: AudioError) {
        log::error!("Audio failed: {}. Continuing without sound.", err);
        self.stream = None;
        self.state = PipelineState::Disabled;
    }
}

impl Default for AudioPipeline {
    fn default() -> Self {
        Self::disabled()
    }
}
