//! Sample format conversion between the resampler (f32) and int16 backends

/// Converts a normalized f32 sample to i16.
///
/// Scales by 32768, rounds to nearest and clamps to [-32768, 32767], so
/// -1.0 maps to -32768 and +1.0 saturates at 32767.
#[inline]
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample * 32768.0).round().clamp(-32768.0, 32767.0) as i16
}

/// Converts an i16 sample to normalized f32 in [-1.0, 1.0).
#[inline]
pub fn i16_to_f32(sample: i16) -> f32 {
    f32::from(sample) / 32768.0
}

/// Quantizes all of `input` into `output`, which is cleared first.
///
/// Returns the number of samples written.
pub fn quantize_into(input: &[f32], output: &mut Vec<i16>) -> usize {
    output.clear();
    output.extend(input.iter().map(|&s| f32_to_i16(s)));
    output.len()
}
