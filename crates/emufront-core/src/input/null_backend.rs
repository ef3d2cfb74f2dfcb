//! Null input backend: nothing is ever pressed

use crate::driver::Backend;

use super::backend::{InputBackend, InputDriver, InputResult};

/// Descriptor for the `null` input backend
pub struct NullInput;

impl Backend for NullInput {
    fn ident(&self) -> &'static str {
        "null"
    }
}

impl InputBackend for NullInput {
    fn init(&self) -> InputResult<Box<dyn InputDriver>> {
        Ok(Box::new(NullInputDriver::default()))
    }
}

/// Instance of the `null` input backend
#[derive(Debug, Default)]
pub struct NullInputDriver {
    polls: u64,
}

impl NullInputDriver {
    pub fn polls(&self) -> u64 {
        self.polls
    }
}

impl InputDriver for NullInputDriver {
    fn poll(&mut self) {
        self.polls += 1;
    }

    fn state(&self, _port: u32, _device: u32, _index: u32, _id: u32) -> i16 {
        0
    }
}
