//! Mirror configuration loader with defaults for every setting.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::asset_paths::DEFAULT_IMAGE_EXTENSION;
use crate::rewrite::EXTERNAL_ASSETS_DIR;
use crate::wget::{BUNDLED_WGET_PATH, DEFAULT_REJECT_REGEX};

/// Name of the configuration file looked up in the project root.
pub const DEFAULT_CONFIG_FILE: &str = "mirror.config.json";

/// Site mirrored when nothing else is configured.
pub const DEFAULT_URL: &str = "https://blog.sixhz.top/";

/// Discoverable configuration describing what to mirror and where to put it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
  /// Root URL to mirror.
  pub url: String,
  /// Output directory, relative to the project root.
  pub output_dir: String,
  /// Remove the output directory before mirroring.
  pub clean: bool,
  /// Run wget in spider mode, checking links without keeping files.
  pub spider: bool,
  /// Regular expression of URLs wget must not follow.
  pub reject_regex: String,
  /// Directory under the output root receiving external images.
  pub external_assets_dir: String,
  /// Extension for external images whose URL carries none.
  pub default_image_extension: String,
  /// Per-request timeout for external image downloads, in seconds.
  pub download_timeout_secs: u64,
  /// Download external images and point pages at the local copies.
  pub localize_external_images: bool,
  /// Location of the bundled wget executable, relative to the project root.
  pub bundled_wget: String,
}

impl Default for MirrorConfig {
  fn default() -> Self {
    Self {
      url: DEFAULT_URL.into(),
      output_dir: "site".into(),
      clean: true,
      spider: false,
      reject_regex: DEFAULT_REJECT_REGEX.into(),
      external_assets_dir: EXTERNAL_ASSETS_DIR.into(),
      default_image_extension: DEFAULT_IMAGE_EXTENSION.into(),
      download_timeout_secs: 20,
      localize_external_images: true,
      bundled_wget: BUNDLED_WGET_PATH.into(),
    }
  }
}

impl MirrorConfig {
  /// Load configuration from the project root.
  ///
  /// When the configuration file does not exist or fails to parse we fall back to default
  /// values so a bare checkout can mirror the default site.
  pub fn discover(project_root: &Path) -> Self {
    let candidate = Self::default_path(project_root);
    Self::from_path(&candidate).unwrap_or_default()
  }

  /// Read configuration from a specific JSON file, if it exists and parses.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
  }

  /// Read configuration from a file the user asked for explicitly.
  pub fn load(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("failed to read config {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
      .with_context(|| format!("failed to parse config {}", path.display()))?;
    if !value.is_object() {
      bail!("config {} must contain a JSON object", path.display());
    }
    serde_json::from_value(value)
      .with_context(|| format!("failed to parse config {}", path.display()))
  }

  /// Path of the configuration file inside `project_root`.
  pub fn default_path(project_root: &Path) -> PathBuf {
    project_root.join(DEFAULT_CONFIG_FILE)
  }

  /// Per-request timeout for external image downloads.
  pub fn download_timeout(&self) -> Duration {
    Duration::from_secs(self.download_timeout_secs)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn discovers_defaults_without_a_config_file() {
    let dir = tempdir().unwrap();
    let config = MirrorConfig::discover(dir.path());
    assert_eq!(config, MirrorConfig::default());
    assert_eq!(config.output_dir, "site");
    assert!(config.clean);
  }

  #[test]
  fn discovers_partial_config_files() {
    let dir = tempdir().unwrap();
    fs::write(
      dir.path().join(DEFAULT_CONFIG_FILE),
      r#"{"url": "https://example.com/", "clean": false}"#,
    )
    .unwrap();

    let config = MirrorConfig::discover(dir.path());
    assert_eq!(config.url, "https://example.com/");
    assert!(!config.clean);
    assert_eq!(config.external_assets_dir, "external_assets");
    assert_eq!(config.download_timeout(), Duration::from_secs(20));
  }

  #[test]
  fn malformed_discovered_config_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "{ not json").unwrap();
    assert_eq!(MirrorConfig::discover(dir.path()), MirrorConfig::default());
  }

  #[test]
  fn explicit_config_must_parse() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.json");
    fs::write(&path, r#"{ "url": 5 }"#).unwrap();
    assert!(MirrorConfig::load(&path).is_err());
    assert!(MirrorConfig::load(&dir.path().join("missing.json")).is_err());
  }

  #[test]
  fn explicit_config_must_be_an_object() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.json");
    fs::write(&path, "[]").unwrap();
    let err = MirrorConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("must contain a JSON object"));
  }

  #[test]
  fn explicit_config_loads_overrides() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.json");
    fs::write(&path, r#"{ "output_dir": "mirror", "download_timeout_secs": 5 }"#).unwrap();
    let config = MirrorConfig::load(&path).unwrap();
    assert_eq!(config.output_dir, "mirror");
    assert_eq!(config.download_timeout(), Duration::from_secs(5));
  }
}
