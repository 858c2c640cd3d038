//! Tracing Setup
//!
//! Console tracing with an environment filter.
//!
//! # Configuration
//!
//! - `RUST_LOG`: Log level directives (default: `otc_engine=info`)

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber with environment filter.
///
/// Uses a static directive string that is a compile-time constant
/// guaranteed to parse.
///
/// # Panics
///
/// Panics if a subscriber was already installed.
#[allow(clippy::expect_used)]
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                "otc_engine=info"
                    .parse()
                    .expect("static directive 'otc_engine=info' is valid"),
            ),
        )
        .init();
}
