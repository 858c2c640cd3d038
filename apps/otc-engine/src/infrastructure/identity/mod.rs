//! Identity adapters.

/// Static in-process identity directory.
pub mod static_directory;

pub use static_directory::StaticIdentityDirectory;
