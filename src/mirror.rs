//! Mirror orchestrator: prepares the output, runs wget and post-processes the result.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{info, warn};
use url::Url;

use crate::config::MirrorConfig;
use crate::error::MirrorError;
use crate::fetch::{AssetFetcher, HttpFetcher};
use crate::layout::{ensure_output_dir, resolve_output_dir};
use crate::models::{MirrorReport, PostProcessReport};
use crate::rewrite::{ImageLocalizer, rewrite_links_to_local};
use crate::wget::{build_wget_command, find_wget, stream_process_output};

/// High-level helper mirroring one site into a directory under the project root.
#[derive(Debug, Clone)]
pub struct SiteMirror {
  root: PathBuf,
  config: MirrorConfig,
}

impl SiteMirror {
  /// Create a mirror job rooted at `root` with the given settings.
  pub fn new(root: impl Into<PathBuf>, config: MirrorConfig) -> Self {
    Self {
      root: root.into(),
      config,
    }
  }

  /// Settings this job runs with.
  pub fn config(&self) -> &MirrorConfig {
    &self.config
  }

  /// Resolved output directory, validated to live inside the project root.
  pub fn output_dir(&self) -> Result<PathBuf, MirrorError> {
    resolve_output_dir(&self.root, Path::new(&self.config.output_dir))
  }

  /// Mirror the site with wget and make the result browsable offline.
  ///
  /// A non-zero wget exit code is reported in the result and skips post-processing; only
  /// setup problems are returned as errors.
  pub fn run(&self) -> Result<MirrorReport> {
    Url::parse(&self.config.url).map_err(|source| MirrorError::InvalidBaseUrl {
      url: self.config.url.clone(),
      source,
    })?;

    let output_dir = self.output_dir()?;
    ensure_output_dir(&output_dir, self.config.clean)?;
    let wget = find_wget(&self.root, &self.config.bundled_wget)?;

    info!("using wget at {}", wget.display());
    info!("output directory: {}", output_dir.display());

    let command = build_wget_command(
      &wget,
      &output_dir,
      &self.config.url,
      self.config.spider,
      &self.config.reject_regex,
    );
    info!("running command: {command}");

    let exit_code = stream_process_output(&command)?;
    if exit_code != 0 {
      warn!("wget exited with code {exit_code}");
      return Ok(MirrorReport {
        exit_code,
        post_process: None,
      });
    }

    Ok(MirrorReport {
      exit_code,
      post_process: Some(self.post_process(&output_dir)),
    })
  }

  /// Run the rewriting passes over an already mirrored `output_dir`, fetching external
  /// images over HTTP.
  pub fn post_process(&self, output_dir: &Path) -> PostProcessReport {
    if !self.config.localize_external_images {
      return self.post_process_with(output_dir, None::<HttpFetcher>);
    }

    match HttpFetcher::new(self.config.download_timeout()) {
      Ok(fetcher) => self.post_process_with(output_dir, Some(fetcher)),
      Err(err) => {
        warn!("skipping external images: {err:#}");
        self.post_process_with(output_dir, None::<HttpFetcher>)
      }
    }
  }

  /// Run the rewriting passes with a caller-supplied fetcher; `None` skips external images.
  pub fn post_process_with<F: AssetFetcher>(
    &self,
    output_dir: &Path,
    fetcher: Option<F>,
  ) -> PostProcessReport {
    let links = rewrite_links_to_local(output_dir, &self.config.url);

    let images = fetcher.and_then(|fetcher| {
      match ImageLocalizer::new(output_dir, &self.config.url, fetcher) {
        Ok(localizer) => {
          let mut localizer = localizer
            .with_assets_dir(&self.config.external_assets_dir)
            .with_default_extension(&self.config.default_image_extension);
          Some(localizer.localize_tree())
        }
        Err(err) => {
          warn!(
            "cannot resolve output directory {}: {}",
            output_dir.display(),
            err
          );
          None
        }
      }
    });

    PostProcessReport { links, images }
  }
}
