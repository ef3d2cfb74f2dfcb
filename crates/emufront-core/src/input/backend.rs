//! Input backend contract

use thiserror::Error;

use crate::driver::Backend;

/// Errors raised while opening an input backend
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Input init failed: {0}")]
    Init(String),
}

/// Result type for input operations
pub type InputResult<T> = Result<T, InputError>;

/// Input backend descriptor
///
/// Only used when the video backend doesn't supply its own input instance.
pub trait InputBackend: Backend {
    fn init(&self) -> InputResult<Box<dyn InputDriver>>;
}

/// An opened input instance
pub trait InputDriver {
    /// Refresh device state. Called once per frame before any `state` query.
    fn poll(&mut self);

    /// State of control `id` on `device` plugged into `port`
    ///
    /// Buttons report 0 or 1, analog axes the signed axis value. `index`
    /// selects a sub-device for multi-controller devices.
    fn state(&self, port: u32, device: u32, index: u32, id: u32) -> i16;
}
