//! Driver selection and lifecycle
//!
//! - [`DriverRegistry`]: the compiled-in (and host-registered) backend
//!   descriptors per category, in a fixed order
//! - [`resolve`]: case-insensitive lookup of a configured identifier
//! - [`Drivers`]: the facade owning the active audio, video and input instances

mod error;
mod facade;
mod registry;

pub use error::{DriverError, DriverResult};
pub use facade::Drivers;
pub use registry::DriverRegistry;

use crate::types::DriverKind;

/// Common surface of every backend descriptor
///
/// Descriptors are immutable and live as long as the registry, so they must
/// be shareable.
pub trait Backend: Send + Sync {
    /// Identifier matched against the configured driver name
    fn ident(&self) -> &'static str;
}

/// Find the backend named `name` in `backends`
///
/// The comparison ignores ASCII case and the first match in registration
/// order wins. With no match, the error lists every registered identifier.
pub fn resolve<'a, B>(kind: DriverKind, backends: &'a [Box<B>], name: &str) -> DriverResult<&'a B>
where
    B: Backend + ?Sized,
{
    match backends.iter().find(|b| b.ident().eq_ignore_ascii_case(name)) {
        Some(backend) => {
            log::info!("Using {} driver \"{}\"", kind, backend.ident());
            Ok(backend.as_ref())
        }
        None => Err(DriverError::NotFound {
            kind,
            name: name.to_string(),
            available: backends.iter().map(|b| b.ident()).collect(),
        }),
    }
}
