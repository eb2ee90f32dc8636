//! # Logging
//!
//! Opt-in `tracing` subscriber setup. Library code only emits events;
//! binaries call one of these once at startup. Both respect `RUST_LOG`
//! and fall back to info-level output for this crate.

use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::from_default_env().add_directive(
        "covenant_core=info"
            .parse()
            .expect("static directive parses"),
    )
}

/// Initialize a text-format subscriber on stderr
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter())
        .try_init();
}

/// Initialize a JSON-format subscriber on stderr
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_json() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter())
        .json()
        .try_init();
}
