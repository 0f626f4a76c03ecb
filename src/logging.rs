//! Diagnostic logging setup.
//!
//! Reports meant for the user go to stdout through [`crate::output`];
//! everything else (warnings about missing files, per-folder detail) is
//! emitted with `tracing` and written to stderr.

use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "congregation_sync=info";
const VERBOSE_LOG_FILTER: &str = "congregation_sync=debug";

/// Install the global subscriber. `RUST_LOG` wins over `verbose`.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init_logging(verbose: bool) {
    let fallback = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
