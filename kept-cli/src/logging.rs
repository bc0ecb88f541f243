use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Log to stderr so stdout stays free for the run summary. `RUST_LOG`
/// overrides the default filter.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "kept=debug,kept_core=debug" } else { "kept=warn,kept_core=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_thread_ids(false)
        .try_init();
}
