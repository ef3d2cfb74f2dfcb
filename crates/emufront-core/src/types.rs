//! Common types for emufront
//!
//! Sample and frame types shared between the audio pipeline, the backends and
//! the driver facade.

/// Audio sample type used between resampler and backends (normalized float)
pub type Sample = f32;

/// Number of interleaved channels the emulated core produces
pub const CHANNELS: usize = 2;

/// Nominal line count of the emulated display, used for windowed geometry
pub const BASE_HEIGHT: u32 = 224;

/// A single stereo frame (left and right channels)
///
/// Uses `#[repr(C)]` to ensure predictable memory layout: [left, right].
/// This enables zero-copy conversion between `&[StereoSample]` and `&[f32]`
/// (interleaved format) using bytemuck.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StereoSample {
    pub left: Sample,
    pub right: Sample,
}

impl StereoSample {
    /// Create a new stereo sample
    #[inline]
    pub fn new(left: Sample, right: Sample) -> Self {
        Self { left, right }
    }

    /// Create a silent stereo sample
    #[inline]
    pub fn silence() -> Self {
        Self::default()
    }

    /// Build a normalized frame from the core's signed 16-bit output
    #[inline]
    pub fn from_i16(left: i16, right: i16) -> Self {
        Self {
            left: crate::audio::i16_to_f32(left),
            right: crate::audio::i16_to_f32(right),
        }
    }
}

/// View a slice of stereo frames as interleaved samples
#[inline]
pub fn as_interleaved(frames: &[StereoSample]) -> &[Sample] {
    bytemuck::cast_slice(frames)
}

/// Driver category, used for resolution and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverKind {
    Audio,
    Video,
    Input,
}

impl DriverKind {
    /// Lowercase name used in log and error messages
    pub fn name(&self) -> &'static str {
        match self {
            DriverKind::Audio => "audio",
            DriverKind::Video => "video",
            DriverKind::Input => "input",
        }
    }
}

impl std::fmt::Display for DriverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleaved_view() {
        let frames = [StereoSample::new(0.25, -0.25), StereoSample::new(0.5, -0.5)];
        assert_eq!(as_interleaved(&frames), &[0.25, -0.25, 0.5, -0.5]);
    }

    #[test]
    fn test_from_i16_normalizes() {
        let s = StereoSample::from_i16(i16::MIN, 16384);
        assert_eq!(s.left, -1.0);
        assert_eq!(s.right, 0.5);
    }

    #[test]
    fn test_driver_kind_display() {
        assert_eq!(DriverKind::Audio.to_string(), "audio");
        assert_eq!(DriverKind::Input.to_string(), "input");
    }
}
