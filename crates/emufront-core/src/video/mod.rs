//! Video backends and the bootstrap pieces around them
//!
//! - [`VideoBackend`] / [`VideoDriver`]: descriptor and opened instance
//! - [`VideoInfo`]: window geometry and mode derived from config
//! - [`list_shaders`]: the shader directory listing kept for the run

mod backend;
mod info;
mod null_backend;
mod shader_dir;

pub use backend::{
    FramePixels, VideoBackend, VideoDriver, VideoError, VideoFrame, VideoInit, VideoResult,
};
pub use info::{VideoInfo, DEFAULT_INPUT_SCALE};
pub use null_backend::{NullVideo, NullVideoDriver};
pub use shader_dir::{list_shaders, SHADER_EXTENSION};
