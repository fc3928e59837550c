//! Logging setup for the command line tool
//!
//! Logs go to stderr so they never mix with transcript output. `RUST_LOG`
//! takes precedence over the default filter.

use tracing_subscriber::EnvFilter;

/// Default filter without `--verbose`.
const QUIET_FILTER: &str = "error";

/// Default filter with `--verbose`.
const VERBOSE_FILTER: &str = "warn,promptfold_core=debug,promptfold_settings=debug,promptfold=debug";

pub fn default_filter(verbose: bool) -> &'static str {
    if verbose { VERBOSE_FILTER } else { QUIET_FILTER }
}

/// Initialize the global subscriber.
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    tracing::debug!(verbose, "Logging system initialized");
    Ok(())
}
