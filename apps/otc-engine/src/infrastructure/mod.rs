//! Infrastructure layer.
//!
//! Adapters for the application's ports: in-memory persistence, the
//! mock banking gateway, the static identity directory, and the
//! dependency injection container.

/// In-memory repository implementations.
pub mod persistence;

/// Banking gateway adapters.
pub mod banking;

/// Identity resolver adapters.
pub mod identity;

/// Dependency wiring.
pub mod config;
