//! Null video backend: headless, counts frames

use crate::driver::Backend;

use super::backend::{VideoBackend, VideoDriver, VideoFrame, VideoInit, VideoResult};
use super::info::VideoInfo;

/// Descriptor for the `null` video backend
pub struct NullVideo;

impl Backend for NullVideo {
    fn ident(&self) -> &'static str {
        "null"
    }
}

impl VideoBackend for NullVideo {
    fn init(&self, info: &VideoInfo) -> VideoResult<VideoInit> {
        log::debug!(
            "null video opened ({}x{}, input scale {})",
            info.width,
            info.height,
            info.input_scale
        );
        Ok(VideoInit::video_only(Box::new(NullVideoDriver::default())))
    }
}

/// Instance of the `null` video backend
#[derive(Debug, Default)]
pub struct NullVideoDriver {
    frames: u64,
    nonblock: bool,
}

impl NullVideoDriver {
    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    pub fn is_nonblocking(&self) -> bool {
        self.nonblock
    }
}

impl VideoDriver for NullVideoDriver {
    fn frame(&mut self, _frame: &VideoFrame<'_>) -> VideoResult<()> {
        self.frames += 1;
        Ok(())
    }

    fn set_nonblock_state(&mut self, nonblock: bool) {
        self.nonblock = nonblock;
    }

    fn alive(&self) -> bool {
        true
    }
}

impl Drop for NullVideoDriver {
    fn drop(&mut self) {
        log::debug!("null video closed after {} frames", self.frames);
    }
}
