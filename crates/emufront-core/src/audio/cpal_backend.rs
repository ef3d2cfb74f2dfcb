//! CPAL audio backend
//!
//! The pipeline runs on the frontend thread while CPAL pulls samples from its
//! own audio thread. The two meet in a lock-free SPSC ring buffer:
//!
//! ```text
//! ┌──────────────────┐   write()    ┌─────────────────────┐   pop()   ┌───────────────────┐
//! │  Audio pipeline  │─────────────►│  rtrb ring (f32)    │──────────►│ CPAL audio thread │
//! │ (frontend thread)│  sleeps when │  latency-sized      │  silence  │  (output stream)  │
//! └──────────────────┘  ring full   └─────────────────────┘  on empty └───────────────────┘
//! ```
//!
//! In blocking mode `write` waits for room, so the frontend runs at the
//! device's playback rate. In non-blocking mode it takes what fits and drops
//! the rest.

use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, SampleRate, Stream, StreamConfig};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::driver::Backend;
use crate::types::CHANNELS;

use super::backend::{AudioBackend, AudioDriver, AudioInitParams, SampleBuf};
use super::convert::i16_to_f32;
use super::error::{AudioError, AudioResult};

/// How long a blocking write sleeps while the ring is full
const FULL_RING_BACKOFF: Duration = Duration::from_millis(1);

/// Smallest ring we allocate, in frames
const MIN_RING_FRAMES: usize = 1024;

/// Descriptor for the `cpal` audio backend
pub struct CpalAudio;

impl Backend for CpalAudio {
    fn ident(&self) -> &'static str {
        "cpal"
    }
}

impl AudioBackend for CpalAudio {
    fn init(&self, params: &AudioInitParams<'_>) -> AudioResult<Box<dyn AudioDriver>> {
        Ok(Box::new(CpalAudioDriver::open(params)?))
    }
}

/// Find the output device by name on the default host, or its default device
fn find_device(name: Option<&str>) -> AudioResult<cpal::Device> {
    let host = cpal::default_host();
    match name {
        Some(name) => host
            .output_devices()
            .map_err(|e| AudioError::ConfigError(e.to_string()))?
            .find(|d: &cpal::Device| d.name().ok().as_deref() == Some(name))
            .ok_or_else(|| AudioError::DeviceNotFound(name.to_string())),
        None => host
            .default_output_device()
            .ok_or_else(|| AudioError::NoDefaultDevice("no output device available".to_string())),
    }
}

/// Pick an f32 stereo-capable config that supports `rate`
fn output_config(device: &cpal::Device, rate: u32) -> AudioResult<StreamConfig> {
    let supported = device
        .supported_output_configs()
        .map_err(|e| AudioError::ConfigError(e.to_string()))?
        .filter(|c| c.sample_format() == SampleFormat::F32)
        .filter(|c| c.channels() >= CHANNELS as u16)
        .find(|c| rate >= c.min_sample_rate().0 && rate <= c.max_sample_rate().0)
        .ok_or_else(|| {
            AudioError::ConfigError(format!("no f32 stereo output config at {}Hz", rate))
        })?;

    Ok(StreamConfig {
        channels: supported.channels(),
        sample_rate: SampleRate(rate),
        buffer_size: BufferSize::Default,
    })
}

fn build_output_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    mut consumer: Consumer<f32>,
) -> AudioResult<Stream> {
    let channels = config.channels as usize;

    device
        .build_output_stream(
            config,
            move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    // Only pop whole frames so left/right never swap on underrun
                    let (left, right) = if consumer.slots() >= CHANNELS {
                        (
                            consumer.pop().unwrap_or(0.0),
                            consumer.pop().unwrap_or(0.0),
                        )
                    } else {
                        (0.0, 0.0)
                    };
                    frame[0] = left;
                    if channels > 1 {
                        frame[1] = right;
                    }
                    for ch in frame.iter_mut().skip(2) {
                        *ch = 0.0;
                    }
                }
            },
            move |err| {
                log::error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| AudioError::StreamBuildError(e.to_string()))
}

/// Instance of the `cpal` audio backend
pub struct CpalAudioDriver {
    stream: Stream,
    producer: Producer<f32>,
    nonblock: bool,
}

impl CpalAudioDriver {
    pub fn open(params: &AudioInitParams<'_>) -> AudioResult<Self> {
        let device = find_device(params.device)?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        let config = output_config(&device, params.rate)?;

        let latency_frames = (u64::from(params.rate) * u64::from(params.latency_ms) / 1000) as usize;
        let ring_frames = latency_frames.max(MIN_RING_FRAMES);
        let (producer, consumer) = RingBuffer::new(ring_frames * CHANNELS);

        let stream = build_output_stream(&device, &config, consumer)?;
        stream
            .play()
            .map_err(|e| AudioError::StreamPlayError(e.to_string()))?;

        log::info!(
            "Audio device: {} ({} channels, {}Hz, ring {} frames / ~{:.1}ms)",
            device_name,
            config.channels,
            params.rate,
            ring_frames,
            ring_frames as f32 * 1000.0 / params.rate as f32
        );

        Ok(Self {
            stream,
            producer,
            nonblock: false,
        })
    }
}

impl AudioDriver for CpalAudioDriver {
    fn write(&mut self, samples: SampleBuf<'_>) -> AudioResult<usize> {
        let total = samples.frames() * CHANNELS;
        let mut written = 0;

        while written < total {
            if self.producer.is_abandoned() {
                return Err(AudioError::WriteFailed("audio stream closed".to_string()));
            }

            let room = self.producer.slots().min(total - written);
            let room = room - room % CHANNELS;
            if room == 0 {
                if self.nonblock {
                    break;
                }
                std::thread::sleep(FULL_RING_BACKOFF);
                continue;
            }

            let chunk = self
                .producer
                .write_chunk_uninit(room)
                .map_err(|e| AudioError::WriteFailed(e.to_string()))?;
            let range = written..written + room;
            written += match samples {
                SampleBuf::Float(s) => chunk.fill_from_iter(s[range].iter().copied()),
                SampleBuf::Int16(s) => chunk.fill_from_iter(s[range].iter().map(|&v| i16_to_f32(v))),
            };
        }

        Ok(written)
    }

    fn set_nonblock_state(&mut self, nonblock: bool) {
        self.nonblock = nonblock;
    }

    fn use_float(&self) -> bool {
        true
    }

    fn stop(&mut self) -> bool {
        self.stream.pause().is_ok()
    }

    fn start(&mut self) -> bool {
        self.stream.play().is_ok()
    }
}
