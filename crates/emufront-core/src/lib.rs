//! emufront core - driver selection and audio pipeline for the emulator frontend
//!
//! The crate picks concrete audio, video and input backends at startup and owns
//! their instances for the length of a run. The audio side resamples the
//! emulated core's output to the device rate, converts it to the backend's
//! preferred sample format and delivers it in blocking or non-blocking chunks.

pub mod audio;
pub mod config;
pub mod driver;
pub mod filter;
pub mod input;
pub mod types;
pub mod video;

pub use driver::{DriverError, DriverRegistry, DriverResult, Drivers};
pub use types::*;
