//! Download images hosted on other domains and point `<img>` tags at the local copies.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, warn};

use super::splice::splice;
use super::{EXTERNAL_ASSETS_DIR, url_authority};
use crate::asset_paths::{
  DEFAULT_IMAGE_EXTENSION, content_addressed_name, is_html_asset, relative_url_path,
};
use crate::fetch::AssetFetcher;
use crate::models::{FileRewrite, ImageLocalizeReport, ImageReference};
use crate::site_tree::{collect_files, read_text};

fn image_src_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r#"(?i)<img[^>]+src=["'](?P<src>https?://[^"']+)["']"#)
      .expect("invalid img src regex")
  })
}

/// Locate `<img>` tags whose `src` is an absolute `http`/`https` URL.
///
/// Matching is textual and case-insensitive; each reference's span covers the attribute
/// value only so it can be replaced without disturbing the surrounding markup.
pub fn find_image_references(html: &str) -> Vec<ImageReference> {
  image_src_pattern()
    .captures_iter(html)
    .filter_map(|caps| {
      let src = caps.name("src")?;
      Some(ImageReference {
        span: src.range(),
        url: src.as_str().to_string(),
      })
    })
    .collect()
}

/// Localises externally hosted images referenced by the HTML pages of a mirror.
///
/// Each distinct URL is stored once under the external assets directory using a name derived
/// from the URL itself, so reruns find earlier downloads and skip them. The URL to file mapping
/// lives on the instance and never outlives it.
pub struct ImageLocalizer<F> {
  root: PathBuf,
  assets_dir: PathBuf,
  site_authority: Option<String>,
  default_extension: String,
  fetcher: F,
  local_copies: HashMap<String, PathBuf>,
}

impl<F: AssetFetcher> ImageLocalizer<F> {
  /// Prepare a localizer for the mirror in `output_dir` of the site at `base_url`.
  pub fn new(output_dir: &Path, base_url: &str, fetcher: F) -> io::Result<Self> {
    let root = fs::canonicalize(output_dir)?;
    Ok(Self {
      assets_dir: root.join(EXTERNAL_ASSETS_DIR),
      root,
      site_authority: url_authority(base_url),
      default_extension: DEFAULT_IMAGE_EXTENSION.to_string(),
      fetcher,
      local_copies: HashMap::new(),
    })
  }

  /// Store downloads under `dir_name` instead of the default external assets directory.
  pub fn with_assets_dir(mut self, dir_name: &str) -> Self {
    self.assets_dir = self.root.join(dir_name);
    self
  }

  /// Extension given to downloads whose URL path has none.
  pub fn with_default_extension(mut self, extension: &str) -> Self {
    self.default_extension = extension.to_string();
    self
  }

  /// Directory downloads are written to.
  pub fn assets_dir(&self) -> &Path {
    &self.assets_dir
  }

  /// Localise images in every HTML page under the root, writing pages with `fs::write`.
  pub fn localize_tree(&mut self) -> ImageLocalizeReport {
    self.localize_tree_with(|path, content| fs::write(path, content))
  }

  /// Localise images in every HTML page under the root, persisting pages through `write`.
  pub fn localize_tree_with<W>(&mut self, mut write: W) -> ImageLocalizeReport
  where
    W: FnMut(&Path, &str) -> io::Result<()>,
  {
    let mut report = ImageLocalizeReport::default();

    if let Err(err) = fs::create_dir_all(&self.assets_dir) {
      warn!(
        "cannot create external assets directory {}: {}",
        self.assets_dir.display(),
        err
      );
      return report;
    }

    for file in collect_files(&self.root, is_html_asset) {
      report.files_scanned += 1;

      let content = match read_text(&file) {
        Ok(content) => content,
        Err(err) => {
          warn!("skipping unreadable page {}: {}", file.display(), err);
          report.failed_files += 1;
          continue;
        }
      };

      let Some(file_dir) = file.parent() else {
        continue;
      };

      let rewrite = self.localize_content(file_dir, &content, &mut report);
      if !rewrite.is_changed() {
        continue;
      }

      if let Err(err) = write(&file, &rewrite.content) {
        warn!("failed to write {}: {}", file.display(), err);
        report.failed_files += 1;
        continue;
      }

      report.files_rewritten += 1;
      report.references_rewritten += rewrite.replacements;
    }

    info!(
      "localised {} external image references in {} of {} pages ({} downloads, {} failed)",
      report.references_rewritten,
      report.files_rewritten,
      report.files_scanned,
      report.downloads,
      report.failed_downloads
    );
    report
  }

  /// Rewrite the external image references in `html`, a page stored in `file_dir`.
  pub fn localize_content(
    &mut self,
    file_dir: &Path,
    html: &str,
    report: &mut ImageLocalizeReport,
  ) -> FileRewrite {
    let mut replacements: Vec<(Range<usize>, String)> = Vec::new();

    for reference in find_image_references(html) {
      if !self.is_external(&reference.url) {
        continue;
      }

      let Some(local_copy) = self.local_copy(&reference.url, report) else {
        report.failed_downloads += 1;
        continue;
      };

      replacements.push((reference.span, relative_url_path(file_dir, &local_copy)));
    }

    if replacements.is_empty() {
      return FileRewrite {
        content: html.to_string(),
        replacements: 0,
      };
    }

    FileRewrite {
      content: splice(html, &replacements),
      replacements: replacements.len(),
    }
  }

  fn is_external(&self, url: &str) -> bool {
    match url_authority(url) {
      Some(authority) => self.site_authority.as_deref() != Some(authority.as_str()),
      None => false,
    }
  }

  /// Path of the local copy of `url`, downloading it first when needed.
  fn local_copy(&mut self, url: &str, report: &mut ImageLocalizeReport) -> Option<PathBuf> {
    if let Some(path) = self.local_copies.get(url) {
      return Some(path.clone());
    }

    let destination = self
      .assets_dir
      .join(content_addressed_name(url, &self.default_extension));

    if destination.exists() {
      debug!("reusing {} for {}", destination.display(), url);
    } else {
      let body = match self.fetcher.fetch(url) {
        Ok(body) => body,
        Err(err) => {
          warn!("leaving {url} in place: {err:#}");
          return None;
        }
      };

      if let Err(err) = fs::write(&destination, &body) {
        warn!("failed to store {} at {}: {}", url, destination.display(), err);
        let _ = fs::remove_file(&destination);
        return None;
      }

      debug!("downloaded {} to {}", url, destination.display());
      report.downloads += 1;
    }

    self.local_copies.insert(url.to_string(), destination.clone());
    Some(destination)
  }
}

/// Download externally hosted `<img>` sources of the mirror in `output_dir` and rewrite the
/// pages to reference the local copies.
///
/// Best effort: an unresolvable output directory yields an empty report.
pub fn localize_external_images<F: AssetFetcher>(
  output_dir: &Path,
  base_url: &str,
  fetcher: F,
) -> ImageLocalizeReport {
  match ImageLocalizer::new(output_dir, base_url, fetcher) {
    Ok(mut localizer) => localizer.localize_tree(),
    Err(err) => {
      warn!("cannot resolve output directory {}: {}", output_dir.display(), err);
      ImageLocalizeReport::default()
    }
  }
}
