//! Errors raised while preparing a mirror run.
//!
//! Only setup can fail: the rewriting passes that follow a successful download are
//! best-effort and report problems through their summaries instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a mirror run before or while invoking wget.
#[derive(Debug, Error)]
pub enum MirrorError {
  /// The requested output directory resolves outside the project root.
  #[error(
    "output directory {} must stay under the project root {}",
    .path.display(),
    .root.display()
  )]
  OutsideRoot {
    /// Resolved output directory.
    path: PathBuf,
    /// Project root the directory must live in.
    root: PathBuf,
  },
  /// Neither a system nor a bundled wget could be located.
  #[error("{0}")]
  WgetNotFound(String),
  /// The URL to mirror could not be parsed.
  #[error("invalid URL to mirror: {url}")]
  InvalidBaseUrl {
    /// URL as supplied by the caller.
    url: String,
    /// Parser error.
    #[source]
    source: url::ParseError,
  },
  /// Filesystem failure while preparing the output directory.
  #[error("failed to prepare {}", .path.display())]
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    #[source]
    source: io::Error,
  },
}
