//! Output geometry and mode handed to the video backend

use crate::config::VideoConfig;
use crate::types::BASE_HEIGHT;

/// Texture scale without a filter, enough for hi-res modes
pub const DEFAULT_INPUT_SCALE: u32 = 2;

/// Parameters for [`VideoBackend::init`](super::VideoBackend::init)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
    pub force_aspect: bool,
    pub smooth: bool,
    /// Input texture size as a multiple of 256
    pub input_scale: u32,
    /// Frames arrive as RGB32 (filter output) rather than XBGR1555
    pub rgb32: bool,
}

impl VideoInfo {
    /// Geometry for `config`, with `filter_scale` set when a filter is active
    pub fn from_config(config: &VideoConfig, filter_scale: Option<u32>) -> Self {
        let (width, height) = if config.fullscreen {
            (config.fullscreen_x, config.fullscreen_y)
        } else {
            let base = BASE_HEIGHT as f32;
            (
                (base * config.xscale * config.aspect_ratio) as u32,
                (base * config.yscale) as u32,
            )
        };

        Self {
            width,
            height,
            fullscreen: config.fullscreen,
            vsync: config.vsync,
            force_aspect: config.force_aspect,
            smooth: config.smooth,
            input_scale: filter_scale.unwrap_or(DEFAULT_INPUT_SCALE),
            rgb32: filter_scale.is_some(),
        }
    }
}
