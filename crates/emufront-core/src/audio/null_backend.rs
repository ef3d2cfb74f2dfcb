//! Null audio backend: accepts and discards everything

use crate::driver::Backend;

use super::backend::{AudioBackend, AudioDriver, AudioInitParams, SampleBuf};
use super::error::AudioResult;

/// Descriptor for the `null` audio backend
pub struct NullAudio;

impl Backend for NullAudio {
    fn ident(&self) -> &'static str {
        "null"
    }
}

impl AudioBackend for NullAudio {
    fn init(&self, params: &AudioInitParams<'_>) -> AudioResult<Box<dyn AudioDriver>> {
        log::debug!("null audio opened at {}Hz", params.rate);
        Ok(Box::new(NullAudioDriver::default()))
    }
}

/// Instance of the `null` audio backend
#[derive(Debug, Default)]
pub struct NullAudioDriver {
    samples_written: u64,
    nonblock: bool,
}

impl NullAudioDriver {
    /// Total samples accepted since init
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    pub fn is_nonblocking(&self) -> bool {
        self.nonblock
    }
}

impl AudioDriver for NullAudioDriver {
    fn write(&mut self, samples: SampleBuf<'_>) -> AudioResult<usize> {
        self.samples_written += samples.len() as u64;
        Ok(samples.len())
    }

    fn set_nonblock_state(&mut self, nonblock: bool) {
        self.nonblock = nonblock;
    }

    fn use_float(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_accepts_everything() {
        let params = AudioInitParams {
            device: None,
            rate: 48000,
            latency_ms: 64,
        };
        let mut driver = NullAudio.init(&params).unwrap();
        assert!(driver.use_float());
        assert_eq!(driver.write(SampleBuf::Float(&[0.0; 128])).unwrap(), 128);
        driver.set_nonblock_state(true);
        assert_eq!(driver.write(SampleBuf::Int16(&[0; 64])).unwrap(), 64);
    }
}
