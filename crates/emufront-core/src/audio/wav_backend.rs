//! WAV file audio backend
//!
//! Records the pipeline's output to a 16-bit stereo WAV file instead of a
//! sound card. The configured device name is used as the output path.
//! Writes never block, so this backend does not pace the frontend.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use crate::driver::Backend;

use super::backend::{AudioBackend, AudioDriver, AudioInitParams, SampleBuf};
use super::convert::f32_to_i16;
use super::error::{AudioError, AudioResult};

/// Output file used when no device name is configured
pub const DEFAULT_WAV_PATH: &str = "emufront-audio.wav";

/// Descriptor for the `wav` audio backend
pub struct WavAudio;

impl Backend for WavAudio {
    fn ident(&self) -> &'static str {
        "wav"
    }
}

impl AudioBackend for WavAudio {
    fn init(&self, params: &AudioInitParams<'_>) -> AudioResult<Box<dyn AudioDriver>> {
        let path = PathBuf::from(params.device.unwrap_or(DEFAULT_WAV_PATH));
        let driver = WavAudioDriver::create(path, params.rate)?;
        Ok(Box::new(driver))
    }
}

/// Instance of the `wav` audio backend
pub struct WavAudioDriver {
    path: PathBuf,
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    frames_written: u64,
}

impl WavAudioDriver {
    /// Create the output file and write the WAV header
    pub fn create(path: PathBuf, sample_rate: u32) -> AudioResult<Self> {
        let spec = hound::WavSpec {
            channels: crate::types::CHANNELS as u16,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = hound::WavWriter::create(&path, spec).map_err(|e| AudioError::FileError {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        log::info!("Recording audio to {:?} ({}Hz, 16-bit stereo)", path, sample_rate);

        Ok(Self {
            path,
            writer: Some(writer),
            frames_written: 0,
        })
    }

    /// Number of stereo frames written so far
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    fn file_error(&self, e: hound::Error) -> AudioError {
        AudioError::FileError {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }
}

impl AudioDriver for WavAudioDriver {
    fn write(&mut self, samples: SampleBuf<'_>) -> AudioResult<usize> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(AudioError::WriteFailed("wav writer already closed".to_string()));
        };

        let result = match samples {
            SampleBuf::Int16(s) => s.iter().try_for_each(|&v| writer.write_sample(v)),
            SampleBuf::Float(s) => s.iter().try_for_each(|&v| writer.write_sample(f32_to_i16(v))),
        };
        result.map_err(|e| self.file_error(e))?;

        self.frames_written += samples.frames() as u64;
        Ok(samples.len())
    }

    fn set_nonblock_state(&mut self, _nonblock: bool) {
        // File writes never stall
    }
}

impl Drop for WavAudioDriver {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            match writer.finalize() {
                Ok(()) => log::info!(
                    "Closed {:?} ({} frames)",
                    self.path,
                    self.frames_written
                ),
                Err(e) => log::error!("Failed to finalize {:?}: {}", self.path, e),
            }
        }
    }
}
