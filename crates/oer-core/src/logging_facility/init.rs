//! Logging initialization module

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for scheduled jobs and servers
    Production,
    /// Test capture mode for deterministic testing
    Test,
}

impl Profile {
    fn default_directives(&self) -> &'static str {
        match self {
            Profile::Development => "oer_core=debug,oer_store=debug,oer_engine=debug",
            Profile::Production | Profile::Test => "oer_core=info,oer_store=info,oer_engine=info",
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Call once at process start; later calls are ignored. `RUST_LOG`
/// overrides the profile's default directives. Output goes to stderr.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(profile.default_directives()));
        match profile {
            Profile::Development => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
            Profile::Production => {
                tracing_subscriber::fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
            Profile::Test => {
                // Tests install their own capture layer via init_test_capture()
                let _ = tracing_subscriber::registry().try_init();
            }
        }
    });
}
