//! Retrieval of remote assets referenced by mirrored pages.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Default per-request timeout for asset downloads.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(20);

/// Failures while retrieving a remote asset.
#[derive(Debug, Error)]
pub enum FetchError {
  /// The HTTP client could not be configured.
  #[error("failed to build HTTP client")]
  Client(#[source] reqwest::Error),
  /// The request could not be sent or timed out.
  #[error("request to {url} failed")]
  Request {
    /// Requested URL.
    url: String,
    /// Transport error.
    #[source]
    source: reqwest::Error,
  },
  /// The server answered with a non-success status.
  #[error("{url} responded with {status}")]
  Status {
    /// Requested URL.
    url: String,
    /// Status returned by the server.
    status: StatusCode,
  },
  /// The response body could not be read.
  #[error("failed to read response body from {url}")]
  Body {
    /// Requested URL.
    url: String,
    /// Transport error.
    #[source]
    source: reqwest::Error,
  },
}

/// Source of remote asset bytes.
pub trait AssetFetcher {
  /// Fetch the body of `url`. Any error leaves the referencing page untouched.
  fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

impl<T: AssetFetcher + ?Sized> AssetFetcher for &T {
  fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
    (**self).fetch(url)
  }
}

/// Blocking HTTP fetcher with a fixed per-request timeout and no retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
  client: reqwest::blocking::Client,
}

impl HttpFetcher {
  /// Build a fetcher whose requests give up after `timeout`.
  pub fn new(timeout: Duration) -> Result<Self, FetchError> {
    let client = reqwest::blocking::Client::builder()
      .timeout(timeout)
      .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(FetchError::Client)?;
    Ok(Self { client })
  }
}

impl AssetFetcher for HttpFetcher {
  fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = self
      .client
      .get(url)
      .send()
      .map_err(|source| FetchError::Request {
        url: url.to_string(),
        source,
      })?;

    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status {
        url: url.to_string(),
        status,
      });
    }

    let body = response.bytes().map_err(|source| FetchError::Body {
      url: url.to_string(),
      source,
    })?;
    Ok(body.to_vec())
  }
}
