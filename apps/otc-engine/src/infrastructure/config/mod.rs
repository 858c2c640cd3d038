//! Dependency wiring.

/// Dependency injection container.
pub mod container;

pub use container::{Container, InMemoryContainer};
