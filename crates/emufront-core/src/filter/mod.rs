//! Image filter plugins
//!
//! A filter is a shared library exporting two C functions:
//!
//! ```c
//! void filter_size(unsigned *width, unsigned *height);
//! void filter_render(uint32_t *colormap, uint32_t *output, unsigned outpitch,
//!                    const uint16_t *input, unsigned pitch,
//!                    unsigned width, unsigned height);
//! ```
//!
//! `filter_render` upscales an XBGR1555 frame into a 32-bit buffer using the
//! supplied color table. Filters are optional: anything that goes wrong while
//! loading one is logged and the frontend runs unfiltered.

mod geometry;

use std::ffi::c_uint;
use std::path::{Path, PathBuf};

use libloading::Library;
use thiserror::Error;

use crate::video::VideoFrame;

pub use geometry::{
    build_colormap, FilterGeometry, BASE_SIZE, COLORMAP_LEN, MAX_SCALE, SIZE_HINT,
};

type FilterSizeFn = unsafe extern "C" fn(width: *mut c_uint, height: *mut c_uint);
type FilterRenderFn = unsafe extern "C" fn(
    colormap: *const u32,
    output: *mut u32,
    outpitch: c_uint,
    input: *const u16,
    pitch: c_uint,
    width: c_uint,
    height: c_uint,
);

/// Errors from loading or running a filter plugin
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Failed to load filter '{path}': {reason}")]
    LoadFailed { path: PathBuf, reason: String },

    #[error("Filter '{path}' does not export `{symbol}`: {reason}")]
    MissingSymbol {
        path: PathBuf,
        symbol: &'static str,
        reason: String,
    },

    #[error("Filter '{path}' reports an unusable output size {width}x{height} (scale limit {max_scale})")]
    UnsupportedSize {
        path: PathBuf,
        width: u32,
        height: u32,
        max_scale: u32,
    },

    #[error("Frame {width}x{height} does not fit the {max}x{max} filter input")]
    FrameTooLarge { width: u32, height: u32, max: u32 },

    #[error("Frame data holds {got} pixels, {need} needed")]
    ShortFrame { got: usize, need: usize },
}

/// A loaded filter with its output buffer and color table
pub struct FilterPlugin {
    path: PathBuf,
    render_fn: FilterRenderFn,
    geometry: FilterGeometry,
    buffer: Vec<u32>,
    colormap: Box<[u32]>,
    // Keeps the code behind `render_fn` mapped
    _library: Option<Library>,
}

impl FilterPlugin {
    /// Load the filter at `path` and size its output buffer
    pub fn load(path: &Path) -> Result<Self, FilterError> {
        log::info!("Loading filter from {:?}", path);

        let library = unsafe {
            Library::new(path).map_err(|e| FilterError::LoadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        };

        let missing = |symbol: &'static str, e: libloading::Error| FilterError::MissingSymbol {
            path: path.to_path_buf(),
            symbol,
            reason: e.to_string(),
        };

        let (size_fn, render_fn) = unsafe {
            let size = library
                .get::<FilterSizeFn>(b"filter_size\0")
                .map_err(|e| missing("filter_size", e))?;
            let render = library
                .get::<FilterRenderFn>(b"filter_render\0")
                .map_err(|e| missing("filter_render", e))?;
            (*size, *render)
        };

        Self::from_entry_points(path, size_fn, render_fn, Some(library))
    }

    /// Size the output buffer for a filter whose entry points are already resolved
    ///
    /// `library`, when given, is the module the two functions live in and is
    /// kept loaded for as long as the filter.
    pub(crate) fn from_entry_points(
        path: &Path,
        size_fn: FilterSizeFn,
        render_fn: FilterRenderFn,
        library: Option<Library>,
    ) -> Result<Self, FilterError> {
        let mut width: c_uint = SIZE_HINT;
        let mut height: c_uint = SIZE_HINT;
        unsafe { size_fn(&mut width, &mut height) };

        let geometry = FilterGeometry::from_reported_size(width, height).ok_or_else(|| {
            FilterError::UnsupportedSize {
                path: path.to_path_buf(),
                width,
                height,
                max_scale: MAX_SCALE,
            }
        })?;
        log::info!(
            "Filter reports {}x{}, using scale {} ({}x{} buffer)",
            width,
            height,
            geometry.scale,
            geometry.edge,
            geometry.edge
        );

        Ok(Self {
            path: path.to_path_buf(),
            render_fn,
            geometry,
            buffer: vec![0; geometry.buffer_pixels()],
            colormap: build_colormap(),
            _library: library,
        })
    }

    pub fn scale(&self) -> u32 {
        self.geometry.scale
    }

    pub fn geometry(&self) -> FilterGeometry {
        self.geometry
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Filter an XBGR1555 frame into the output buffer
    ///
    /// `pitch` is in bytes. The returned frame borrows the output buffer until
    /// the next call.
    pub fn render(
        &mut self,
        input: &[u16],
        width: u32,
        height: u32,
        pitch: usize,
    ) -> Result<VideoFrame<'_>, FilterError> {
        check_frame(input.len(), width, height, pitch)?;

        unsafe {
            (self.render_fn)(
                self.colormap.as_ptr(),
                self.buffer.as_mut_ptr(),
                self.geometry.pitch as c_uint,
                input.as_ptr(),
                pitch as c_uint,
                width,
                height,
            );
        }

        let (out_width, out_height) = self.geometry.output_size(width, height);
        Ok(VideoFrame::rgb32(
            &self.buffer,
            out_width,
            out_height,
            self.geometry.pitch,
        ))
    }
}

/// Check that a frame fits the filter input and that `len` pixels cover it
///
/// `pitch` is in bytes. The last line only needs `width` pixels.
pub fn check_frame(len: usize, width: u32, height: u32, pitch: usize) -> Result<(), FilterError> {
    if width > BASE_SIZE || height > BASE_SIZE {
        return Err(FilterError::FrameTooLarge {
            width,
            height,
            max: BASE_SIZE,
        });
    }

    let stride = pitch / std::mem::size_of::<u16>();
    let need = match height {
        0 => 0,
        h => stride * (h as usize - 1) + width as usize,
    };
    if len < need {
        return Err(FilterError::ShortFrame { got: len, need });
    }
    Ok(())
}

impl Drop for FilterPlugin {
    fn drop(&mut self) {
        log::debug!("Unloading filter {:?}", self.path);
    }
}

/// Load the configured filter, logging instead of failing
///
/// An empty path means no filter is configured.
pub fn load_filter(path: &Path) -> Option<FilterPlugin> {
    if path.as_os_str().is_empty() {
        return None;
    }

    match FilterPlugin::load(path) {
        Ok(filter) => Some(filter),
        Err(e) => {
            log::error!("{}. Running without filter.", e);
            None
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::FramePixels;

    #[test]
    fn test_missing_library_is_load_error() {
        let result = FilterPlugin::load(Path::new("/nonexistent/libfilter.so"));
        assert!(matches!(result, Err(FilterError::LoadFailed { .. })));
    }

    #[test]
    fn test_load_filter_is_soft() {
        assert!(load_filter(Path::new("")).is_none());
        assert!(load_filter(Path::new("/nonexistent/libfilter.so")).is_none());
    }

    #[test]
    fn test_error_messages_name_the_symbol() {
        let err = FilterError::MissingSymbol {
            path: PathBuf::from("hq2x.so"),
            symbol: "filter_render",
            reason: "undefined symbol".to_string(),
        };
        assert!(err.to_string().contains("`filter_render`"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_library_without_filter_symbols() {
        match FilterPlugin::load(Path::new("libc.so.6")) {
            Err(FilterError::MissingSymbol { symbol, .. }) => assert_eq!(symbol, "filter_size"),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("libc is not a filter"),
        }
    }

    #[test]
    fn test_oversized_filter_is_rejected() {
        for size_fn in [testing::huge_size as FilterSizeFn, testing::wide_size] {
            let result = FilterPlugin::from_entry_points(
                Path::new("huge.so"),
                size_fn,
                testing::nearest4_render_fn(),
                None,
            );
            match result {
                Err(FilterError::UnsupportedSize { max_scale, .. }) => {
                    assert_eq!(max_scale, MAX_SCALE)
                }
                _ => panic!("expected UnsupportedSize"),
            }
        }
    }

    #[test]
    fn test_check_frame_bounds() {
        assert!(check_frame(256 * 224, 256, 224, 512).is_ok());
        assert!(check_frame(0, 0, 0, 0).is_ok());
        // Last line only needs `width` pixels
        assert!(check_frame(320 * 2 + 100, 100, 3, 640).is_ok());

        assert!(matches!(
            check_frame(usize::MAX, 257, 224, 514),
            Err(FilterError::FrameTooLarge { width: 257, max: 256, .. })
        ));
        assert!(matches!(
            check_frame(256 * 224, 256, 257, 512),
            Err(FilterError::FrameTooLarge { height: 257, .. })
        ));
        assert!(matches!(
            check_frame(256 * 224 - 1, 256, 224, 512),
            Err(FilterError::ShortFrame { got: 57343, need: 57344 })
        ));
    }

    #[test]
    fn test_render_upscales_through_colormap() {
        let mut filter = testing::nearest4();
        assert_eq!(filter.scale(), 4);
        assert_eq!(filter.geometry().edge, 1024);

        // 2x2 frame: white, black / red, darkest blue
        let input = [0x7fff, 0x0000, 0x7c00, 0x0001];
        let frame = filter.render(&input, 2, 2, 4).unwrap();
        assert!(frame.is_rgb32());
        assert_eq!((frame.width, frame.height), (8, 8));
        assert_eq!(frame.pitch, 1024 * 4);

        let FramePixels::Rgb32(pixels) = frame.pixels else {
            panic!("expected RGB32 output");
        };
        assert_eq!(pixels[0], 0xffff_ff00);
        assert_eq!(pixels[3], 0xffff_ff00);
        assert_eq!(pixels[4], 0);
        assert_eq!(pixels[4 * 1024], 0xff00_0000);
        assert_eq!(pixels[7 * 1024 + 7], 8 << 8);
    }

    #[test]
    fn test_render_rejects_bad_frames() {
        let mut filter = testing::nearest4();
        let input = vec![0u16; 16];
        assert!(matches!(
            filter.render(&input, 300, 2, 600),
            Err(FilterError::FrameTooLarge { .. })
        ));
        assert!(matches!(
            filter.render(&input, 8, 4, 16),
            Err(FilterError::ShortFrame { got: 16, need: 32 })
        ));
    }
}
