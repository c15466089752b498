//! Provider-specific device-code implementations.

#[cfg(feature = "github")]
pub mod github;
