//! Lyra compiler driver.
//!
//! The library half of the `lyra` binary: command handlers live in
//! [`commands`], tracing setup in [`init_tracing`]. Keeping the handlers
//! in a library crate lets tests drive them without spawning a process.

use std::sync::Once;

pub mod commands;

static TRACING_INIT: Once = Once::new();

/// Install the tracing subscriber for debug output.
///
/// Call once at startup; later calls are no-ops. Output is enabled
/// through the environment, e.g. `RUST_LOG=lyra_parse=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
