//! Input backends
//!
//! A video backend may hand out its own input instance (a windowing backend
//! reading its window's key events). Otherwise the configured input backend
//! is opened on its own.

mod backend;
mod null_backend;

pub use backend::{InputBackend, InputDriver, InputError, InputResult};
pub use null_backend::{NullInput, NullInputDriver};
