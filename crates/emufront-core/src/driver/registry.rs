//! Backend descriptor registry

use crate::audio::{AudioBackend, NullAudio, WavAudio};
use crate::input::{InputBackend, NullInput};
use crate::types::DriverKind;
use crate::video::{NullVideo, VideoBackend};

use super::{resolve, Backend, DriverResult};

/// Registered backends per category, in registration order
///
/// Resolution walks each list front to back, so the order backends are
/// registered in decides which one wins on duplicate identifiers.
#[derive(Default)]
pub struct DriverRegistry {
    audio: Vec<Box<dyn AudioBackend>>,
    video: Vec<Box<dyn VideoBackend>>,
    input: Vec<Box<dyn InputBackend>>,
}

impl DriverRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every backend compiled into this build
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();

        #[cfg(feature = "cpal-backend")]
        registry.register_audio(crate::audio::CpalAudio);
        registry.register_audio(WavAudio);
        registry.register_audio(NullAudio);

        registry.register_video(NullVideo);
        registry.register_input(NullInput);

        registry
    }

    pub fn register_audio<B: AudioBackend + 'static>(&mut self, backend: B) -> &mut Self {
        log::debug!("Registered audio driver \"{}\"", backend.ident());
        self.audio.push(Box::new(backend));
        self
    }

    pub fn register_video<B: VideoBackend + 'static>(&mut self, backend: B) -> &mut Self {
        log::debug!("Registered video driver \"{}\"", backend.ident());
        self.video.push(Box::new(backend));
        self
    }

    pub fn register_input<B: InputBackend + 'static>(&mut self, backend: B) -> &mut Self {
        log::debug!("Registered input driver \"{}\"", backend.ident());
        self.input.push(Box::new(backend));
        self
    }

    pub fn resolve_audio(&self, name: &str) -> DriverResult<&dyn AudioBackend> {
        resolve(DriverKind::Audio, &self.audio, name)
    }

    pub fn resolve_video(&self, name: &str) -> DriverResult<&dyn VideoBackend> {
        resolve(DriverKind::Video, &self.video, name)
    }

    pub fn resolve_input(&self, name: &str) -> DriverResult<&dyn InputBackend> {
        resolve(DriverKind::Input, &self.input, name)
    }

    /// Registered identifiers for `kind`, in registration order
    pub fn idents(&self, kind: DriverKind) -> Vec<&'static str> {
        match kind {
            DriverKind::Audio => self.audio.iter().map(|b| b.ident()).collect(),
            DriverKind::Video => self.video.iter().map(|b| b.ident()).collect(),
            DriverKind::Input => self.input.iter().map(|b| b.ident()).collect(),
        }
    }
}
