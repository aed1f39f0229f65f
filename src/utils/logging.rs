//! Logging utilities
//!
//! Provides logging setup and configuration.

/// Default filter when `RUST_LOG` is unset: adapter activity and audit records.
const DEFAULT_FILTER: &str = "info";

/// Setup logging for the binary
///
/// `RUST_LOG` overrides the default filter, e.g. `RUST_LOG=audit=info,warn`
/// keeps only audit records and warnings.
pub fn setup_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_FILTER))
        .init();
}
