//! Video backend contract

use thiserror::Error;

use crate::driver::Backend;
use crate::input::InputDriver;

use super::info::VideoInfo;

/// Video backend errors
#[derive(Error, Debug)]
pub enum VideoError {
    #[error("Video init failed: {0}")]
    Init(String),

    #[error("Failed to present frame: {0}")]
    Frame(String),
}

/// Result type for video operations
pub type VideoResult<T> = Result<T, VideoError>;

/// Pixel data of one frame
#[derive(Debug, Clone, Copy)]
pub enum FramePixels<'a> {
    /// Native 15-bit output of the emulated core
    Xbgr1555(&'a [u16]),
    /// Filtered output
    Rgb32(&'a [u32]),
}

/// One frame handed to the video backend
#[derive(Debug, Clone, Copy)]
pub struct VideoFrame<'a> {
    pub pixels: FramePixels<'a>,
    pub width: u32,
    pub height: u32,
    /// Bytes between the starts of two lines
    pub pitch: usize,
}

impl<'a> VideoFrame<'a> {
    pub fn xbgr1555(data: &'a [u16], width: u32, height: u32, pitch: usize) -> Self {
        Self {
            pixels: FramePixels::Xbgr1555(data),
            width,
            height,
            pitch,
        }
    }

    pub fn rgb32(data: &'a [u32], width: u32, height: u32, pitch: usize) -> Self {
        Self {
            pixels: FramePixels::Rgb32(data),
            width,
            height,
            pitch,
        }
    }

    pub fn is_rgb32(&self) -> bool {
        matches!(self.pixels, FramePixels::Rgb32(_))
    }
}

/// What a video backend hands back from `init`
pub struct VideoInit {
    pub video: Box<dyn VideoDriver>,
    /// Input instance driven by the video backend itself, if it has one
    pub input: Option<Box<dyn InputDriver>>,
}

impl VideoInit {
    /// Video only, the configured input backend will be opened separately
    pub fn video_only(video: Box<dyn VideoDriver>) -> Self {
        Self { video, input: None }
    }
}

/// Video backend descriptor
pub trait VideoBackend: Backend {
    fn init(&self, info: &VideoInfo) -> VideoResult<VideoInit>;

    /// Whether the input instance returned from `init` is a view into the
    /// video instance rather than a resource of its own
    ///
    /// Such an input is released together with the video instance.
    fn shares_input_instance(&self) -> bool {
        false
    }
}

/// An opened video instance
pub trait VideoDriver {
    /// Present a frame
    fn frame(&mut self, frame: &VideoFrame<'_>) -> VideoResult<()>;

    /// Toggle vsync-style waiting (disabled while fast-forwarding)
    fn set_nonblock_state(&mut self, nonblock: bool);

    /// False once the user has closed the output
    fn alive(&self) -> bool;

    /// Whether the output currently has focus
    fn focus(&self) -> bool {
        true
    }
}
