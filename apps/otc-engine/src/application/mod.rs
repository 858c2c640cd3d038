//! Application layer.
//!
//! Services orchestrating the domain, and ports for the external
//! collaborators (banking gateway, identity resolver).

/// Application-level error type and classification.
pub mod errors;

/// Driven ports (interfaces to external systems).
pub mod ports;

/// Orchestration services.
pub mod services;
