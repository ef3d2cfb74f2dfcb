//! Test tone source standing in for an emulated core

use std::f32::consts::TAU;

/// Peak amplitude, about -6 dBFS
const AMPLITUDE: f32 = 16384.0;

/// Stereo sine generator producing core-format int16 samples
pub struct ToneGenerator {
    phase: f32,
    step: f32,
}

impl ToneGenerator {
    pub fn new(frequency: f32, sample_rate: u32) -> Self {
        Self {
            phase: 0.0,
            step: TAU * frequency / sample_rate as f32,
        }
    }

    /// Replace `out` with `frames` interleaved stereo frames
    pub fn fill(&mut self, out: &mut Vec<i16>, frames: usize) {
        out.clear();
        for _ in 0..frames {
            let sample = (self.phase.sin() * AMPLITUDE) as i16;
            out.push(sample);
            out.push(sample);
            self.phase = (self.phase + self.step) % TAU;
        }
    }
}
