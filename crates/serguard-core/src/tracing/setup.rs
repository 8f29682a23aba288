//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the serguard tracing/logging system.
///
/// Reads the `SERGUARD_LOG` environment variable for per-module log levels.
/// Format: `SERGUARD_LOG=serguard_analysis::propagation=debug,serguard_core=warn`
///
/// Falls back to `serguard=info` if `SERGUARD_LOG` is not set or is invalid.
///
/// Calling it more than once is a no-op.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("SERGUARD_LOG")
            .unwrap_or_else(|_| EnvFilter::new("serguard=info"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .init();
    });
}
