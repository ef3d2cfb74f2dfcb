//! Sample rate conversion from the emulated core's rate to the device rate
//!
//! Two families are available, selected by [`ResamplerQuality`]:
//! - **Hermite**: a cheap stateful cubic Hermite interpolator with no latency
//!   beyond two frames of history.
//! - **rubato**: polynomial (`Fast`) or windowed-sinc (`Medium`, `Best`)
//!   resamplers. rubato works on fixed input blocks, so the wrapper
//!   accumulates frames and runs a block whenever one is full.
//!
//! All resamplers take and produce interleaved samples.

use rubato::{
    FastFixedIn, PolynomialDegree, Resampler, SincFixedIn, SincInterpolationParameters,
    SincInterpolationType, WindowFunction,
};
use serde::{Deserialize, Serialize};

use super::error::{AudioError, AudioResult};

/// Frames per rubato processing block
///
/// Both pipeline chunk sizes are multiples of this, so a full chunk never
/// leaves a partial block behind.
pub const RESAMPLER_BLOCK_FRAMES: usize = 64;

/// Resampler quality setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResamplerQuality {
    /// Cubic Hermite interpolation (cheapest)
    Hermite,
    /// Cubic polynomial interpolation via rubato
    #[default]
    Fast,
    /// Short windowed-sinc filter
    Medium,
    /// Long windowed-sinc filter
    Best,
}

/// A streaming resampler working on interleaved samples
pub trait AudioResampler: Send {
    /// Resample `input` and append the result to `output`
    ///
    /// Returns the number of frames appended. Stateful resamplers may hold back
    /// some input until enough has arrived.
    fn process(&mut self, input: &[f32], output: &mut Vec<f32>) -> AudioResult<usize>;

    /// Short name for logging
    fn name(&self) -> &'static str;
}

/// Create a resampler for `in_rate -> out_rate` with `channels` interleaved channels
pub fn create_resampler(
    quality: ResamplerQuality,
    in_rate: u32,
    out_rate: u32,
    channels: usize,
) -> AudioResult<Box<dyn AudioResampler>> {
    if in_rate == 0 || out_rate == 0 || channels == 0 {
        return Err(AudioError::Resampler(format!(
            "invalid resampler setup: {}Hz -> {}Hz, {} channels",
            in_rate, out_rate, channels
        )));
    }

    let ratio = f64::from(out_rate) / f64::from(in_rate);
    let resampler: Box<dyn AudioResampler> = match quality {
        ResamplerQuality::Hermite => Box::new(HermiteResampler::new(ratio, channels)),
        _ => Box::new(RubatoResampler::new(quality, ratio, channels)?),
    };

    log::debug!(
        "Created {} resampler: {}Hz -> {}Hz (ratio {:.4}), {} channels",
        resampler.name(),
        in_rate,
        out_rate,
        ratio,
        channels
    );

    Ok(resampler)
}

// ═══════════════════════════════════════════════════════════════════════════
// Hermite
// ═══════════════════════════════════════════════════════════════════════════

#[inline]
fn hermite_kernel(mu: f32, a: f32, b: f32, c: f32, d: f32) -> f32 {
    let mu2 = mu * mu;
    let mu3 = mu2 * mu;
    let m0 = (c - a) * 0.5;
    let m1 = (d - b) * 0.5;

    let a0 = 2.0 * mu3 - 3.0 * mu2 + 1.0;
    let a1 = mu3 - 2.0 * mu2 + mu;
    let a2 = mu3 - mu2;
    let a3 = -2.0 * mu3 + 3.0 * mu2;

    a0 * b + a1 * m0 + a2 * m1 + a3 * c
}

/// Cubic Hermite resampler
///
/// Keeps four frames of history per channel and interpolates between the two
/// middle ones.
pub struct HermiteResampler {
    channels: usize,
    step: f64,
    phase: f64,
    history: Vec<[f32; 4]>,
}

impl HermiteResampler {
    /// `ratio` is output rate / input rate
    pub fn new(ratio: f64, channels: usize) -> Self {
        Self {
            channels,
            step: 1.0 / ratio,
            phase: 0.0,
            history: vec![[0.0; 4]; channels],
        }
    }
}

impl AudioResampler for HermiteResampler {
    fn process(&mut self, input: &[f32], output: &mut Vec<f32>) -> AudioResult<usize> {
        let mut produced = 0;

        for frame in input.chunks_exact(self.channels) {
            for (hist, &sample) in self.history.iter_mut().zip(frame) {
                hist.rotate_left(1);
                hist[3] = sample;
            }

            while self.phase < 1.0 {
                let mu = self.phase as f32;
                for hist in &self.history {
                    output.push(hermite_kernel(mu, hist[0], hist[1], hist[2], hist[3]));
                }
                produced += 1;
                self.phase += self.step;
            }
            self.phase -= 1.0;
        }

        Ok(produced)
    }

    fn name(&self) -> &'static str {
        "hermite"
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// rubato
// ═══════════════════════════════════════════════════════════════════════════

enum RubatoEngine {
    Fast(FastFixedIn<f32>),
    Sinc(SincFixedIn<f32>),
}

/// Block-based wrapper around rubato's fixed-input resamplers
pub struct RubatoResampler {
    engine: RubatoEngine,
    channels: usize,
    /// Deinterleaved input block being filled
    input_block: Vec<Vec<f32>>,
    /// Frames currently in `input_block`
    filled: usize,
    /// Deinterleaved output scratch, sized for the largest block rubato emits
    output_block: Vec<Vec<f32>>,
}

impl RubatoResampler {
    pub fn new(quality: ResamplerQuality, ratio: f64, channels: usize) -> AudioResult<Self> {
        let construction = |e: rubato::ResamplerConstructionError| AudioError::Resampler(e.to_string());

        let engine = match quality {
            ResamplerQuality::Medium | ResamplerQuality::Best => {
                let params = if quality == ResamplerQuality::Best {
                    SincInterpolationParameters {
                        sinc_len: 256,
                        f_cutoff: 0.95,
                        oversampling_factor: 256,
                        interpolation: SincInterpolationType::Cubic,
                        window: WindowFunction::BlackmanHarris2,
                    }
                } else {
                    SincInterpolationParameters {
                        sinc_len: 64,
                        f_cutoff: 0.91,
                        oversampling_factor: 128,
                        interpolation: SincInterpolationType::Linear,
                        window: WindowFunction::Hann2,
                    }
                };
                RubatoEngine::Sinc(
                    SincFixedIn::<f32>::new(ratio, 1.0, params, RESAMPLER_BLOCK_FRAMES, channels)
                        .map_err(construction)?,
                )
            }
            _ => RubatoEngine::Fast(
                FastFixedIn::<f32>::new(
                    ratio,
                    1.0,
                    PolynomialDegree::Cubic,
                    RESAMPLER_BLOCK_FRAMES,
                    channels,
                )
                .map_err(construction)?,
            ),
        };

        let output_block = match &engine {
            RubatoEngine::Fast(r) => r.output_buffer_allocate(true),
            RubatoEngine::Sinc(r) => r.output_buffer_allocate(true),
        };

        Ok(Self {
            engine,
            channels,
            input_block: vec![vec![0.0; RESAMPLER_BLOCK_FRAMES]; channels],
            filled: 0,
            output_block,
        })
    }

    /// Run one full input block and append the interleaved result
    fn run_block(&mut self, output: &mut Vec<f32>) -> AudioResult<usize> {
        let result = match &mut self.engine {
            RubatoEngine::Fast(r) => {
                r.process_into_buffer(&self.input_block, &mut self.output_block, None)
            }
            RubatoEngine::Sinc(r) => {
                r.process_into_buffer(&self.input_block, &mut self.output_block, None)
            }
        };
        let (_, frames_out) = result.map_err(|e| AudioError::Resampler(e.to_string()))?;

        output.reserve(frames_out * self.channels);
        for frame in 0..frames_out {
            for channel in &self.output_block {
                output.push(channel[frame]);
            }
        }

        Ok(frames_out)
    }
}

impl AudioResampler for RubatoResampler {
    fn process(&mut self, input: &[f32], output: &mut Vec<f32>) -> AudioResult<usize> {
        let mut produced = 0;

        for frame in input.chunks_exact(self.channels) {
            for (channel, &sample) in self.input_block.iter_mut().zip(frame) {
                channel[self.filled] = sample;
            }
            self.filled += 1;

            if self.filled == RESAMPLER_BLOCK_FRAMES {
                self.filled = 0;
                produced += self.run_block(output)?;
            }
        }

        Ok(produced)
    }

    fn name(&self) -> &'static str {
        match self.engine {
            RubatoEngine::Fast(_) => "rubato-polynomial",
            RubatoEngine::Sinc(_) => "rubato-sinc",
        }
    }
}
