//! Fatal driver errors
//!
//! Everything here ends the run: `main` prints [`DriverError::diagnostic`]
//! and exits with [`DriverError::exit_code`]. Soft failures (audio backend
//! init, filter load, shader listing) never surface as a `DriverError`.

use thiserror::Error;

use crate::audio::AudioError;
use crate::input::InputError;
use crate::types::DriverKind;
use crate::video::VideoError;

/// Fatal driver error
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Couldn't find any {kind} driver named \"{name}\"")]
    NotFound {
        kind: DriverKind,
        name: String,
        /// Registered identifiers in registration order
        available: Vec<&'static str>,
    },

    #[error("Cannot open video driver \"{driver}\": {source}")]
    VideoInit {
        driver: &'static str,
        #[source]
        source: VideoError,
    },

    #[error("Cannot init input driver \"{driver}\": {source}")]
    InputInit {
        driver: &'static str,
        #[source]
        source: InputError,
    },

    #[error(transparent)]
    Audio(#[from] AudioError),
}

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

impl DriverError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Human-readable report, including the valid choices for unknown drivers
    pub fn diagnostic(&self) -> String {
        match self {
            DriverError::NotFound { kind, available, .. } => {
                let mut out = format!("{}\nAvailable {} drivers are:", self, kind);
                for ident in available {
                    out.push_str("\n\t");
                    out.push_str(ident);
                }
                out
            }
            other => other.to_string(),
        }
    }
}
