//! Logging init: human-readable events on stderr, filtered through `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `info` is used, or `debug` when `verbose` is set.
/// Calling this more than once keeps the first subscriber.
pub fn init_logging(verbose: bool) {
  let default_directive = if verbose { "debug" } else { "info" };
  let env_filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

  let _ = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_writer(std::io::stderr)
    .with_ansi(false)
    .with_target(false)
    .try_init();
}
