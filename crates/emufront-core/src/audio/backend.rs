//! Audio backend trait for platform-specific implementations
//!
//! A backend is split in two halves:
//! - [`AudioBackend`]: the immutable descriptor registered at startup. It knows
//!   its identifier and how to open an instance.
//! - [`AudioDriver`]: the opened instance. It is owned by the audio pipeline and
//!   released exactly once when dropped.
//!
//! Backends that run their own audio thread (CPAL) only talk to the pipeline
//! through the synchronous `write`/`set_nonblock_state` contract.

use crate::driver::Backend;

use super::error::AudioResult;

/// Parameters handed to [`AudioBackend::init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioInitParams<'a> {
    /// Device name, `None` = use the backend's default device
    pub device: Option<&'a str>,
    /// Desired output sample rate in Hz
    pub rate: u32,
    /// Latency hint in milliseconds
    pub latency_ms: u32,
}

/// A block of interleaved stereo samples in the backend's preferred format
#[derive(Debug, Clone, Copy)]
pub enum SampleBuf<'a> {
    /// Normalized float samples
    Float(&'a [f32]),
    /// Signed 16-bit samples
    Int16(&'a [i16]),
}

impl SampleBuf<'_> {
    /// Number of samples (not frames) in the block
    pub fn len(&self) -> usize {
        match self {
            SampleBuf::Float(s) => s.len(),
            SampleBuf::Int16(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of stereo frames in the block
    pub fn frames(&self) -> usize {
        self.len() / crate::types::CHANNELS
    }

    /// Size of the block in bytes
    pub fn byte_len(&self) -> usize {
        match self {
            SampleBuf::Float(s) => std::mem::size_of_val(*s),
            SampleBuf::Int16(s) => std::mem::size_of_val(*s),
        }
    }
}

/// Audio backend descriptor
///
/// One value per compiled-in backend, registered in
/// [`DriverRegistry`](crate::driver::DriverRegistry).
pub trait AudioBackend: Backend {
    /// Open the backend. An error leaves audio disabled for the run.
    fn init(&self, params: &AudioInitParams<'_>) -> AudioResult<Box<dyn AudioDriver>>;
}

/// An opened audio backend instance
pub trait AudioDriver {
    /// Write a block of interleaved stereo samples
    ///
    /// In blocking mode this may sleep until the device has consumed enough
    /// audio; that stall paces the whole frontend. In non-blocking mode it
    /// returns immediately with however many samples fit, which may be fewer
    /// than offered.
    ///
    /// Returns the number of samples accepted.
    fn write(&mut self, samples: SampleBuf<'_>) -> AudioResult<usize>;

    /// Switch between blocking and non-blocking writes
    fn set_nonblock_state(&mut self, nonblock: bool);

    /// Whether the backend wants float samples instead of int16
    fn use_float(&self) -> bool {
        false
    }

    /// Pause output. Returns false if the backend failed to pause.
    fn stop(&mut self) -> bool {
        true
    }

    /// Resume output after [`stop`](Self::stop)
    fn start(&mut self) -> bool {
        true
    }
}
