//! The driver facade
//!
//! [`Drivers`] is the one object the run loop talks to. It owns the backend
//! registry, the config it was built from and every open backend instance.
//!
//! Startup brings up video and input first, then audio. Teardown follows the
//! same order. Within video/input teardown the video instance goes first,
//! then the input instance, then the filter and the shader listing.

use std::path::PathBuf;

use crate::audio::AudioPipeline;
use crate::config::FrontendConfig;
use crate::filter::{load_filter, FilterPlugin};
use crate::input::InputDriver;
use crate::video::{list_shaders, VideoDriver, VideoFrame, VideoInfo};

use super::{Backend, DriverError, DriverRegistry, DriverResult};

/// Open video and input instances plus the resources they were set up with
struct VideoStack {
    video: Box<dyn VideoDriver>,
    video_ident: &'static str,
    input: Box<dyn InputDriver>,
    input_ident: &'static str,
    /// Input is a view into the video instance
    shared_input: bool,
    info: VideoInfo,
    filter: Option<FilterPlugin>,
    shaders: Vec<PathBuf>,
}

impl VideoStack {
    fn release(self) {
        let VideoStack {
            video,
            video_ident,
            input,
            input_ident,
            shared_input,
            filter,
            shaders,
            ..
        } = self;

        if shared_input {
            log::debug!("Closing video driver \"{}\" and its input", video_ident);
            drop(video);
            drop(input);
        } else {
            log::debug!("Closing video driver \"{}\"", video_ident);
            drop(video);
            log::debug!("Closing input driver \"{}\"", input_ident);
            drop(input);
        }

        drop(filter);
        drop(shaders);
    }
}

/// Active drivers for one run of the frontend
pub struct Drivers {
    registry: DriverRegistry,
    config: FrontendConfig,
    audio: AudioPipeline,
    video: Option<VideoStack>,
    fast_forward: bool,
}

impl Drivers {
    /// Facade over `registry`. Nothing is opened until [`init_drivers`](Self::init_drivers).
    pub fn new(config: FrontendConfig, registry: DriverRegistry) -> Self {
        Self {
            registry,
            config,
            audio: AudioPipeline::disabled(),
            video: None,
            fast_forward: false,
        }
    }

    /// Facade over the built-in backends
    pub fn with_builtin(config: FrontendConfig) -> Self {
        Self::new(config, DriverRegistry::with_builtin())
    }

    pub fn config(&self) -> &FrontendConfig {
        &self.config
    }

    pub fn registry(&self) -> &DriverRegistry {
        &self.registry
    }

    /// Register extra backends before `init_drivers`
    pub fn registry_mut(&mut self) -> &mut DriverRegistry {
        &mut self.registry
    }

    /// Open video, input and audio
    pub fn init_drivers(&mut self) -> DriverResult<()> {
        self.init_video_input()?;
        self.init_audio()?;
        Ok(())
    }

    /// Close everything `init_drivers` opened. Safe to call repeatedly.
    pub fn uninit_drivers(&mut self) {
        self.uninit_video_input();
        self.uninit_audio();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Audio
    // ─────────────────────────────────────────────────────────────────────

    pub fn init_audio(&mut self) -> DriverResult<()> {
        self.audio.teardown();
        self.audio = AudioPipeline::init(&self.config.audio, &self.registry)?;
        if self.fast_forward {
            self.audio.set_nonblock(true);
        }
        Ok(())
    }

    pub fn uninit_audio(&mut self) {
        self.audio.teardown();
    }

    pub fn audio(&self) -> &AudioPipeline {
        &self.audio
    }

    /// Submit one stereo frame from the core
    #[inline]
    pub fn audio_sample(&mut self, left: i16, right: i16) {
        self.audio.push_frame(left, right);
    }

    /// Submit interleaved stereo samples from the core
    pub fn audio_samples(&mut self, samples: &[i16]) {
        self.audio.push_samples(samples);
    }

    /// Stop waiting on audio and video while fast-forwarding
    pub fn set_fast_forward(&mut self, enabled: bool) {
        if self.fast_forward == enabled {
            return;
        }
        self.fast_forward = enabled;
        log::debug!("Fast-forward {}", if enabled { "on" } else { "off" });

        if let Some(stack) = self.video.as_mut() {
            stack.video.set_nonblock_state(enabled);
        }
        self.audio.set_nonblock(enabled || !self.config.audio.sync);
    }

    pub fn is_fast_forward(&self) -> bool {
        self.fast_forward
    }

    /// Pause audio output, keeping buffered samples
    pub fn pause(&mut self) -> bool {
        self.audio.stop()
    }

    pub fn resume(&mut self) -> bool {
        self.audio.start()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Video and input
    // ─────────────────────────────────────────────────────────────────────

    /// Open the video backend and an input instance for it
    ///
    /// Unknown driver names and a video or input backend that fails to open
    /// are fatal. The filter and the shader listing are optional.
    pub fn init_video_input(&mut self) -> DriverResult<()> {
        self.uninit_video_input();
        let filter = load_filter(&self.config.video.filter_path);
        self.open_video_input(filter)
    }

    /// Open video and input around an already loaded (or absent) filter
    fn open_video_input(&mut self, filter: Option<FilterPlugin>) -> DriverResult<()> {
        let config = &self.config.video;
        let shaders = list_shaders(&config.shader_dir);

        let video_backend = self.registry.resolve_video(&config.driver)?;
        let input_backend = self.registry.resolve_input(&self.config.input.driver)?;

        let info = VideoInfo::from_config(config, filter.as_ref().map(|f| f.scale()));
        log::info!(
            "Video: {}x{}{}, input scale {}, {}",
            info.width,
            info.height,
            if info.fullscreen { " fullscreen" } else { "" },
            info.input_scale,
            if info.rgb32 { "RGB32" } else { "XBGR1555" }
        );

        let init = video_backend
            .init(&info)
            .map_err(|source| DriverError::VideoInit {
                driver: video_backend.ident(),
                source,
            })?;

        let (input, input_ident, shared_input) = match init.input {
            Some(input) => {
                log::info!("Using input from video driver \"{}\"", video_backend.ident());
                (input, video_backend.ident(), video_backend.shares_input_instance())
            }
            None => {
                let input = input_backend
                    .init()
                    .map_err(|source| DriverError::InputInit {
                        driver: input_backend.ident(),
                        source,
                    })?;
                (input, input_backend.ident(), false)
            }
        };

        let mut video = init.video;
        if self.fast_forward {
            video.set_nonblock_state(true);
        }

        self.video = Some(VideoStack {
            video,
            video_ident: video_backend.ident(),
            input,
            input_ident,
            shared_input,
            info,
            filter,
            shaders,
        });
        Ok(())
    }

    pub fn uninit_video_input(&mut self) {
        if let Some(stack) = self.video.take() {
            stack.release();
        }
    }

    pub fn video_info(&self) -> Option<VideoInfo> {
        self.video.as_ref().map(|s| s.info)
    }

    /// Shader files found at startup
    pub fn shaders(&self) -> &[PathBuf] {
        match &self.video {
            Some(stack) => &stack.shaders,
            None => &[],
        }
    }

    /// Scale of the active filter, if one loaded
    pub fn filter_scale(&self) -> Option<u32> {
        self.video
            .as_ref()
            .and_then(|s| s.filter.as_ref())
            .map(|f| f.scale())
    }

    /// Present a core frame (XBGR1555, `pitch` in bytes)
    ///
    /// With a filter loaded the frame is filtered to RGB32 first. Returns
    /// false if no video is open or the backend rejected the frame.
    pub fn video_frame(&mut self, data: &[u16], width: u32, height: u32, pitch: usize) -> bool {
        let Some(stack) = self.video.as_mut() else {
            return false;
        };

        let result = match stack.filter.as_mut() {
            Some(filter) => match filter.render(data, width, height, pitch) {
                Ok(frame) => stack.video.frame(&frame),
                Err(e) => {
                    log::warn!("Dropping frame: {}", e);
                    return true;
                }
            },
            None => stack
                .video
                .frame(&VideoFrame::xbgr1555(data, width, height, pitch)),
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                log::error!("{}", e);
                false
            }
        }
    }

    /// False once the video output has been closed
    pub fn alive(&self) -> bool {
        self.video.as_ref().is_some_and(|s| s.video.alive())
    }

    pub fn focus(&self) -> bool {
        self.video.as_ref().is_some_and(|s| s.video.focus())
    }

    pub fn poll_input(&mut self) {
        if let Some(stack) = self.video.as_mut() {
            stack.input.poll();
        }
    }

    pub fn input_state(&self, port: u32, device: u32, index: u32, id: u32) -> i16 {
        self.video
            .as_ref()
            .map_or(0, |s| s.input.state(port, device, index, id))
    }
}

impl Drop for Drivers {
    fn drop(&mut self) {
        self.uninit_drivers();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::audio::{AudioError, PipelineState, BLOCK_CHUNK_FRAMES, NONBLOCK_CHUNK_FRAMES};
    use crate::driver::Backend;
    use crate::filter;
    use crate::input::{InputBackend, InputError, InputResult};
    use crate::types::DriverKind;
    use crate::video::{VideoBackend, VideoError, VideoInit, VideoResult};

    type Events = Arc<Mutex<Vec<String>>>;

    fn record(events: &Events, event: &str) {
        events.lock().unwrap().push(event.to_string());
    }

    struct MockInputDriver {
        events: Events,
        pressed: i16,
    }

    impl InputDriver for MockInputDriver {
        fn poll(&mut self) {
            record(&self.events, "poll");
        }

        fn state(&self, _port: u32, _device: u32, _index: u32, _id: u32) -> i16 {
            self.pressed
        }
    }

    impl Drop for MockInputDriver {
        fn drop(&mut self) {
            record(&self.events, "drop input");
        }
    }

    struct MockVideoDriver {
        events: Events,
    }

    impl VideoDriver for MockVideoDriver {
        fn frame(&mut self, frame: &VideoFrame<'_>) -> VideoResult<()> {
            let format = if frame.is_rgb32() { " rgb32" } else { "" };
            record(
                &self.events,
                &format!("frame {}x{}{}", frame.width, frame.height, format),
            );
            Ok(())
        }

        fn set_nonblock_state(&mut self, nonblock: bool) {
            record(&self.events, &format!("video nonblock {}", nonblock));
        }

        fn alive(&self) -> bool {
            true
        }
    }

    impl Drop for MockVideoDriver {
        fn drop(&mut self) {
            record(&self.events, "drop video");
        }
    }

    /// Video backend that may hand out its own input
    struct MockVideo {
        events: Events,
        supplies_input: bool,
        shares_input: bool,
        fail: bool,
    }

    impl Backend for MockVideo {
        fn ident(&self) -> &'static str {
            "mock"
        }
    }

    impl VideoBackend for MockVideo {
        fn init(&self, _info: &VideoInfo) -> VideoResult<VideoInit> {
            if self.fail {
                return Err(VideoError::Init("no display".to_string()));
            }
            let video = Box::new(MockVideoDriver {
                events: Arc::clone(&self.events),
            });
            let input: Option<Box<dyn InputDriver>> = if self.supplies_input {
                Some(Box::new(MockInputDriver {
                    events: Arc::clone(&self.events),
                    pressed: 7,
                }))
            } else {
                None
            };
            Ok(VideoInit { video, input })
        }

        fn shares_input_instance(&self) -> bool {
            self.shares_input
        }
    }

    struct MockInput {
        events: Events,
        fail: bool,
    }

    impl Backend for MockInput {
        fn ident(&self) -> &'static str {
            "mock"
        }
    }

    impl InputBackend for MockInput {
        fn init(&self) -> InputResult<Box<dyn InputDriver>> {
            if self.fail {
                return Err(InputError::Init("no devices".to_string()));
            }
            record(&self.events, "init input");
            Ok(Box::new(MockInputDriver {
                events: Arc::clone(&self.events),
                pressed: 1,
            }))
        }
    }

    fn mock_config() -> FrontendConfig {
        let mut config = FrontendConfig::default();
        config.video.driver = "mock".to_string();
        config.input.driver = "mock".to_string();
        config
    }

    fn mock_drivers(events: &Events, supplies_input: bool, shares_input: bool) -> Drivers {
        let mut registry = DriverRegistry::with_builtin();
        registry.register_video(MockVideo {
            events: Arc::clone(events),
            supplies_input,
            shares_input,
            fail: false,
        });
        registry.register_input(MockInput {
            events: Arc::clone(events),
            fail: false,
        });
        Drivers::new(mock_config(), registry)
    }

    fn drop_events(events: &Events) -> Vec<String> {
        events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with("drop"))
            .cloned()
            .collect()
    }

    #[test]
    fn test_builtin_drivers_run_headless() {
        let mut drivers = Drivers::with_builtin(FrontendConfig::default());
        drivers.init_drivers().unwrap();

        assert!(drivers.alive());
        assert!(drivers.audio().is_active());
        assert_eq!(drivers.video_info().map(|i| i.width), Some(896));

        let frame = vec![0u16; 256 * 224];
        assert!(drivers.video_frame(&frame, 256, 224, 512));
        drivers.audio_samples(&[0; 256]);
        drivers.audio_sample(1, -1);
        drivers.poll_input();
        assert_eq!(drivers.input_state(0, 1, 0, 0), 0);
        assert!(drivers.pause());
        assert!(drivers.resume());
    }

    #[test]
    fn test_fallback_input_released_after_video() {
        let events = Events::default();
        let mut drivers = mock_drivers(&events, false, false);
        drivers.init_video_input().unwrap();

        assert!(events.lock().unwrap().contains(&"init input".to_string()));
        assert_eq!(drivers.input_state(0, 1, 0, 0), 1);

        drivers.uninit_video_input();
        assert_eq!(drop_events(&events), vec!["drop video", "drop input"]);
    }

    #[test]
    fn test_shared_input_comes_from_video() {
        let events = Events::default();
        let mut drivers = mock_drivers(&events, true, true);
        drivers.init_video_input().unwrap();

        // The configured input backend is resolved but never opened
        assert!(!events.lock().unwrap().contains(&"init input".to_string()));
        assert_eq!(drivers.input_state(0, 1, 0, 0), 7);

        drivers.poll_input();
        drivers.uninit_video_input();
        assert_eq!(drop_events(&events), vec!["drop video", "drop input"]);
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let events = Events::default();
        let mut drivers = mock_drivers(&events, false, false);
        drivers.init_drivers().unwrap();

        drivers.uninit_drivers();
        drivers.uninit_drivers();
        drop(drivers);

        assert_eq!(drop_events(&events), vec!["drop video", "drop input"]);
    }

    #[test]
    fn test_drop_tears_down() {
        let events = Events::default();
        let mut drivers = mock_drivers(&events, true, false);
        drivers.init_drivers().unwrap();
        drop(drivers);
        assert_eq!(drop_events(&events), vec!["drop video", "drop input"]);
    }

    #[test]
    fn test_reinit_releases_previous_instances() {
        let events = Events::default();
        let mut drivers = mock_drivers(&events, false, false);
        drivers.init_video_input().unwrap();
        drivers.init_video_input().unwrap();
        assert_eq!(drop_events(&events), vec!["drop video", "drop input"]);
        assert!(drivers.alive());
    }

    #[test]
    fn test_unknown_drivers_are_fatal() {
        let mut config = FrontendConfig::default();
        config.video.driver = "sdl".to_string();
        let mut drivers = Drivers::with_builtin(config);
        match drivers.init_drivers() {
            Err(DriverError::NotFound { kind, name, .. }) => {
                assert_eq!(kind, DriverKind::Video);
                assert_eq!(name, "sdl");
            }
            _ => panic!("expected NotFound"),
        }
        assert!(!drivers.alive());

        let mut config = FrontendConfig::default();
        config.input.driver = "joypad".to_string();
        let mut drivers = Drivers::with_builtin(config);
        let err = drivers.init_drivers().err().unwrap();
        assert!(matches!(err, DriverError::NotFound { kind: DriverKind::Input, .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_video_and_input_init_failures_are_fatal() {
        let events = Events::default();
        let mut registry = DriverRegistry::new();
        registry.register_video(MockVideo {
            events: Arc::clone(&events),
            supplies_input: false,
            shares_input: false,
            fail: true,
        });
        registry.register_input(MockInput {
            events: Arc::clone(&events),
            fail: false,
        });
        let mut drivers = Drivers::new(mock_config(), registry);
        assert!(matches!(
            drivers.init_video_input(),
            Err(DriverError::VideoInit { driver: "mock", .. })
        ));

        let mut registry = DriverRegistry::new();
        registry.register_video(MockVideo {
            events: Arc::clone(&events),
            supplies_input: false,
            shares_input: false,
            fail: false,
        });
        registry.register_input(MockInput {
            events: Arc::clone(&events),
            fail: true,
        });
        let mut drivers = Drivers::new(mock_config(), registry);
        assert!(matches!(
            drivers.init_video_input(),
            Err(DriverError::InputInit { .. })
        ));
        // The half-opened video instance was released
        assert_eq!(drop_events(&events), vec!["drop video"]);
    }

    #[test]
    fn test_rate_ratio_is_fatal_after_video() {
        let mut config = FrontendConfig::default();
        config.audio.in_rate = 1000;
        config.audio.out_rate = 16000;
        let mut drivers = Drivers::with_builtin(config);
        assert!(matches!(
            drivers.init_drivers(),
            Err(DriverError::Audio(AudioError::RateRatioExceeded { .. }))
        ));
        assert!(drivers.alive());
        assert!(!drivers.audio().is_active());
    }

    #[test]
    fn test_fast_forward_switches_both_outputs() {
        let events = Events::default();
        let mut drivers = mock_drivers(&events, false, false);
        drivers.init_drivers().unwrap();
        assert_eq!(drivers.audio().chunk_frames(), Some(BLOCK_CHUNK_FRAMES));

        drivers.set_fast_forward(true);
        assert!(drivers.is_fast_forward());
        assert_eq!(drivers.audio().chunk_frames(), Some(NONBLOCK_CHUNK_FRAMES));

        drivers.set_fast_forward(false);
        assert_eq!(drivers.audio().chunk_frames(), Some(BLOCK_CHUNK_FRAMES));

        let events = events.lock().unwrap();
        assert!(events.contains(&"video nonblock true".to_string()));
        assert!(events.contains(&"video nonblock false".to_string()));
    }

    #[test]
    fn test_fast_forward_off_keeps_nonblocking_without_sync() {
        let events = Events::default();
        let mut drivers = mock_drivers(&events, false, false);
        drivers.config.audio.sync = false;
        drivers.init_drivers().unwrap();

        drivers.set_fast_forward(true);
        drivers.set_fast_forward(false);
        assert_eq!(drivers.audio().chunk_frames(), Some(NONBLOCK_CHUNK_FRAMES));
    }

    #[test]
    fn test_frames_reach_video_backend() {
        let events = Events::default();
        let mut drivers = mock_drivers(&events, false, false);
        drivers.init_video_input().unwrap();

        let frame = vec![0u16; 256 * 224];
        assert!(drivers.video_frame(&frame, 256, 224, 512));
        assert!(events.lock().unwrap().contains(&"frame 256x224".to_string()));
        assert!(drivers.shaders().is_empty());
        assert_eq!(drivers.filter_scale(), None);
    }

    #[test]
    fn test_frames_routed_through_filter() {
        let events = Events::default();
        let mut drivers = mock_drivers(&events, false, false);
        drivers
            .open_video_input(Some(filter::testing::nearest4()))
            .unwrap();

        let info = drivers.video_info().unwrap();
        assert_eq!(info.input_scale, filter::testing::NEAREST4_SCALE);
        assert!(info.rgb32);
        assert_eq!(drivers.filter_scale(), Some(4));

        let frame = vec![0x7fffu16; 256 * 224];
        assert!(drivers.video_frame(&frame, 256, 224, 512));
        assert!(events
            .lock()
            .unwrap()
            .contains(&"frame 1024x896 rgb32".to_string()));

        // Too wide for the filter: dropped, not an error
        let wide = vec![0u16; 320 * 224];
        assert!(drivers.video_frame(&wide, 320, 224, 640));
        let frames = events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.starts_with("frame"))
            .count();
        assert_eq!(frames, 1);
    }

    #[test]
    fn test_unloadable_filter_runs_unfiltered() {
        let events = Events::default();
        let mut drivers = mock_drivers(&events, false, false);
        drivers.config.video.filter_path = PathBuf::from("/nonexistent/libfilter.so");
        drivers.init_video_input().unwrap();

        let info = drivers.video_info().unwrap();
        assert_eq!(info.input_scale, 2);
        assert!(!info.rgb32);
        assert_eq!(drivers.filter_scale(), None);
    }

    #[test]
    fn test_audio_teardown_state() {
        let mut drivers = Drivers::with_builtin(FrontendConfig::default());
        drivers.init_audio().unwrap();
        assert_eq!(drivers.audio().state(), PipelineState::Buffered);
        drivers.uninit_audio();
        drivers.uninit_audio();
        assert_eq!(drivers.audio().state(), PipelineState::TornDown);
    }

    #[test]
    fn test_shader_listing_kept_for_the_run() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("crt.shader"), "").unwrap();

        let mut config = FrontendConfig::default();
        config.video.shader_dir = dir.path().to_path_buf();
        let mut drivers = Drivers::with_builtin(config);
        drivers.init_video_input().unwrap();
        assert_eq!(drivers.shaders().len(), 1);

        drivers.uninit_video_input();
        assert!(drivers.shaders().is_empty());
    }
}
