//! Frontend configuration
//!
//! One YAML document with a section per driver category:
//!
//! ```yaml
//! audio:
//!   driver: cpal
//!   out_rate: 48000
//!   in_rate: 31950
//!   sync: true
//! video:
//!   driver: "null"
//!   xscale: 3.0
//! input:
//!   driver: "null"
//! ```
//!
//! Every section and field has a default, so partial files are fine.

mod io;
mod paths;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::audio::ResamplerQuality;

pub use io::{load_config, save_config};
pub use paths::{default_config_dir, default_config_path};

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    pub audio: AudioConfig,
    pub video: VideoConfig,
    pub input: InputConfig,
}

/// Audio settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Master switch. When off the pipeline stays disabled and no backend is resolved.
    pub enable: bool,
    /// Backend identifier (case-insensitive)
    pub driver: String,
    /// Backend-specific device name, empty = backend default
    pub device: String,
    /// Rate the backend plays at (Hz)
    pub out_rate: u32,
    /// Rate the emulated core produces samples at (Hz)
    pub in_rate: u32,
    /// Latency hint passed to the backend (ms)
    pub latency: u32,
    /// Blocking writes pace the frontend to the audio clock
    pub sync: bool,
    pub resampler: ResamplerQuality,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enable: true,
            driver: "null".to_string(),
            device: String::new(),
            out_rate: 48000,
            in_rate: 31950,
            latency: 64,
            sync: true,
            resampler: ResamplerQuality::default(),
        }
    }
}

impl AudioConfig {
    /// Device name as passed to backends: `None` when unset
    pub fn device_name(&self) -> Option<&str> {
        if self.device.is_empty() {
            None
        } else {
            Some(&self.device)
        }
    }
}

/// Video settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub driver: String,
    /// Windowed scale factors relative to the base resolution
    pub xscale: f32,
    pub yscale: f32,
    pub aspect_ratio: f32,
    pub fullscreen: bool,
    pub fullscreen_x: u32,
    pub fullscreen_y: u32,
    pub vsync: bool,
    /// Bilinear filtering when scaling
    pub smooth: bool,
    pub force_aspect: bool,
    /// Image filter plugin (shared library). Empty = no filter.
    pub filter_path: PathBuf,
    /// Directory scanned for `.shader` files. Empty = skip.
    pub shader_dir: PathBuf,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            driver: "null".to_string(),
            xscale: 3.0,
            yscale: 3.0,
            aspect_ratio: 4.0 / 3.0,
            fullscreen: false,
            fullscreen_x: 1280,
            fullscreen_y: 1024,
            vsync: true,
            smooth: true,
            force_aspect: true,
            filter_path: PathBuf::new(),
            shader_dir: PathBuf::new(),
        }
    }
}

/// Input settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub driver: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            driver: "null".to_string(),
        }
    }
}
