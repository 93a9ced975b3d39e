//! Diagnostic output for the binary.
//!
//! Every crate in the workspace emits `tracing` events; this installs the one
//! subscriber that renders them. Output goes to stderr so that stdout stays
//! free for command results. Verbosity comes from `RUST_LOG`.

use tracing_subscriber::EnvFilter;

use crate::cli::LogFormat;

const DEFAULT_FILTER: &str = "warn";

pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(e) = installed {
        eprintln!("warning: diagnostics disabled: {e}");
    }
}
