//! Console logging setup for the CLI.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directive for a given `-v` count.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "jalsetu=warn",
        1 => "jalsetu=info",
        _ => "jalsetu=debug",
    }
}

/// Initializes stderr logging.
///
/// `RUST_LOG` takes precedence over the verbosity flag. Logs go to stderr
/// so that JSON reports on stdout stay machine-readable.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
