//! Buffer geometry and color table for image filters
//!
//! Filters are sized around a 256×256 base frame. A filter reports the largest
//! output it can produce for a 512×512 hint; each dimension is padded to a
//! power of two and the larger one decides the integer scale. Reports that
//! would need more than [`MAX_SCALE`] are rejected.

/// Size hint passed to `filter_size` in both dimensions
pub const SIZE_HINT: u32 = 512;

/// Edge length of the unscaled frame the output buffer is built around
pub const BASE_SIZE: u32 = 256;

/// Largest integer scale a filter may ask for (a 2048×2048 output buffer)
pub const MAX_SCALE: u32 = 8;

/// Entries in the 15-bit color table
pub const COLORMAP_LEN: usize = 1 << 15;

/// Output buffer layout for a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterGeometry {
    /// Integer upscale factor, at least 1
    pub scale: u32,
    /// Pixels along one edge of the square output buffer
    pub edge: u32,
    /// Bytes per output line
    pub pitch: usize,
}

impl FilterGeometry {
    /// Geometry for a filter that reported `width`×`height` for the size hint
    ///
    /// Returns `None` when the padded size overflows or the scale would exceed
    /// [`MAX_SCALE`].
    pub fn from_reported_size(width: u32, height: u32) -> Option<Self> {
        let pow2_w = width.checked_next_power_of_two()?;
        let pow2_h = height.checked_next_power_of_two()?;
        let scale = (pow2_w.max(pow2_h) / BASE_SIZE).max(1);
        if scale > MAX_SCALE {
            return None;
        }
        let edge = BASE_SIZE * scale;

        Some(Self {
            scale,
            edge,
            pitch: edge as usize * std::mem::size_of::<u32>(),
        })
    }

    /// Number of u32 pixels in the output buffer
    pub fn buffer_pixels(&self) -> usize {
        let edge = self.edge as usize;
        edge * edge
    }

    pub fn buffer_bytes(&self) -> usize {
        self.buffer_pixels() * std::mem::size_of::<u32>()
    }

    /// Size of the filtered image for a `width`×`height` input
    pub fn output_size(&self, width: u32, height: u32) -> (u32, u32) {
        (width * self.scale, height * self.scale)
    }
}

/// Widen a 5-bit channel to 8 bits, replicating the top bits into the bottom
#[inline]
fn expand5(c: u32) -> u32 {
    (c << 3) | (c >> 2)
}

/// Lookup table from XBGR1555 to 32-bit `RRGGBB00`
pub fn build_colormap() -> Box<[u32]> {
    (0..COLORMAP_LEN as u32)
        .map(|i| {
            let r = expand5((i >> 10) & 31);
            let g = expand5((i >> 5) & 31);
            let b = expand5(i & 31);
            (r << 24) | (g << 16) | (b << 8)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pads_to_power_of_two() {
        let g = FilterGeometry::from_reported_size(300, 200).unwrap();
        assert_eq!(g.scale, 2);
        assert_eq!(g.edge, 512);
        assert_eq!(g.pitch, 512 * 4);
        assert_eq!(g.buffer_bytes(), 512 * 512 * 4);
        assert_eq!(g.output_size(256, 224), (512, 448));
    }

    #[test]
    fn test_larger_dimension_wins() {
        assert_eq!(FilterGeometry::from_reported_size(512, 1100).unwrap().scale, 8);
        assert_eq!(FilterGeometry::from_reported_size(1024, 1024).unwrap().scale, 4);
    }

    #[test]
    fn test_oversized_report_rejected() {
        // Padding would overflow u32
        assert_eq!(FilterGeometry::from_reported_size(3_000_000_000, 1), None);
        assert_eq!(FilterGeometry::from_reported_size(1, u32::MAX), None);
        // Fits in u32 but asks for scale 256
        assert_eq!(FilterGeometry::from_reported_size(65536, 65536), None);
        // Just past the cap
        assert_eq!(FilterGeometry::from_reported_size(2049, 16), None);
        assert_eq!(
            FilterGeometry::from_reported_size(2048, 16).map(|g| g.scale),
            Some(MAX_SCALE)
        );
    }

    #[test]
    fn test_scale_never_zero() {
        let g = FilterGeometry::from_reported_size(100, 100).unwrap();
        assert_eq!(g.scale, 1);
        assert_eq!(g.buffer_pixels(), 256 * 256);
    }

    #[test]
    fn test_colormap_entries() {
        let map = build_colormap();
        assert_eq!(map.len(), 32768);
        assert_eq!(map[0], 0);
        assert_eq!(map[0x7fff], 0xffff_ff00);
        // Pure red: 31 << 10
        assert_eq!(map[0x7c00], 0xff00_0000);
        // Green 16 -> (16 << 3) | (16 >> 2) = 132
        assert_eq!(map[16 << 5], 132 << 16);
        assert_eq!(map[1], 8 << 8);
    }
}
