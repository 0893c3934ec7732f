//! Rewrite same-host absolute URLs to relative references to mirrored files.

use std::fs;
use std::io;
use std::ops::Range;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info, warn};

use super::splice::splice;
use super::url_authority;
use crate::asset_paths::{is_text_asset, normalize_lexically, relative_url_path};
use crate::models::{FileRewrite, LinkRewriteReport, RewriteCandidate};
use crate::site_tree::{collect_files, read_text};

const INDEX_HTML_FILE: &str = "index.html";

/// Rewrites `http://host/...`, `https://host/...` and `//host/...` references inside the
/// text assets of a mirror so they point at the local copies.
///
/// A reference is only rewritten when the file it names exists under the output root;
/// anything else is left exactly as found.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
  root: PathBuf,
  pattern: Regex,
}

impl LinkRewriter {
  /// Prepare a rewriter for the mirror stored in `output_dir` of the site at `base_url`.
  ///
  /// Returns `None` when `base_url` has no host, or when the output directory cannot be
  /// resolved; there is nothing meaningful to rewrite in either case.
  pub fn new(output_dir: &Path, base_url: &str) -> Option<Self> {
    let Some(authority) = url_authority(base_url) else {
      debug!("{base_url} has no host, skipping local link rewriting");
      return None;
    };

    let root = match fs::canonicalize(output_dir) {
      Ok(root) => root,
      Err(err) => {
        warn!("cannot resolve output directory {}: {}", output_dir.display(), err);
        return None;
      }
    };

    let prefixes = ["http://", "https://", "//"]
      .iter()
      .map(|scheme| regex::escape(&format!("{scheme}{authority}")))
      .collect::<Vec<_>>()
      .join("|");
    let pattern = Regex::new(&format!(
      r#"(?P<prefix>{prefixes})(?P<path>/[^\s"'>)]+)"#
    ))
    .ok()?;

    Some(Self { root, pattern })
  }

  /// Canonical output root the rewriter resolves paths against.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Locate every same-host reference in `content`.
  pub fn find_candidates(&self, content: &str) -> Vec<RewriteCandidate> {
    self
      .pattern
      .captures_iter(content)
      .filter_map(|caps| {
        let whole = caps.get(0)?;
        let path = caps.name("path")?;
        Some(RewriteCandidate {
          span: whole.range(),
          path: path.as_str().to_string(),
        })
      })
      .collect()
  }

  /// Map a URL path onto the mirrored file it names, if that file exists.
  ///
  /// The path is taken literally, query string and fragment included: wget stores
  /// `style.css?v=1` under that exact name, and a bare `style.css` is a different resource.
  /// Directory paths resolve to their `index.html`. Paths that climb out of the root are
  /// never resolved.
  pub fn resolve_local_target(&self, url_path: &str) -> Option<PathBuf> {
    let candidate = normalize_lexically(&self.root.join(url_path.trim_start_matches('/')));
    if !candidate.starts_with(&self.root) {
      return None;
    }

    if candidate.is_file() {
      return Some(candidate);
    }

    if candidate.is_dir() {
      let index = candidate.join(INDEX_HTML_FILE);
      if index.is_file() {
        return Some(index);
      }
    }

    None
  }

  /// Rewrite the references in `content`, which belongs to a file stored in `file_dir`.
  pub fn rewrite_content(&self, file_dir: &Path, content: &str) -> FileRewrite {
    let replacements: Vec<(Range<usize>, String)> = self
      .find_candidates(content)
      .into_iter()
      .filter_map(|candidate| {
        let target = self.resolve_local_target(&candidate.path)?;
        let relative = relative_url_path(file_dir, &target);
        debug!("{} -> {}", &content[candidate.span.clone()], relative);
        Some((candidate.span, relative))
      })
      .collect();

    if replacements.is_empty() {
      return FileRewrite {
        content: content.to_string(),
        replacements: 0,
      };
    }

    FileRewrite {
      content: splice(content, &replacements),
      replacements: replacements.len(),
    }
  }

  /// Rewrite every text asset under the root, writing changed files with `fs::write`.
  pub fn rewrite_tree(&self) -> LinkRewriteReport {
    self.rewrite_tree_with(|path, content| fs::write(path, content))
  }

  /// Rewrite every text asset under the root, persisting changed files through `write`.
  ///
  /// Files that cannot be read or written are logged, counted and skipped.
  pub fn rewrite_tree_with<W>(&self, mut write: W) -> LinkRewriteReport
  where
    W: FnMut(&Path, &str) -> io::Result<()>,
  {
    let mut report = LinkRewriteReport::default();

    for file in collect_files(&self.root, is_text_asset) {
      report.files_scanned += 1;

      let content = match read_text(&file) {
        Ok(content) => content,
        Err(err) => {
          warn!("skipping unreadable file {}: {}", file.display(), err);
          report.failed_files += 1;
          continue;
        }
      };

      let Some(file_dir) = file.parent() else {
        continue;
      };

      let rewrite = self.rewrite_content(file_dir, &content);
      if !rewrite.is_changed() {
        continue;
      }

      if let Err(err) = write(&file, &rewrite.content) {
        warn!("failed to write {}: {}", file.display(), err);
        report.failed_files += 1;
        continue;
      }

      report.files_rewritten += 1;
      report.links_rewritten += rewrite.replacements;
    }

    info!(
      "rewrote {} local links in {} of {} files",
      report.links_rewritten, report.files_rewritten, report.files_scanned
    );
    report
  }
}

/// Point same-host links in the mirror at `output_dir` to the locally stored files.
///
/// Best effort: a base URL without a host or an unresolvable output directory yields an
/// empty report.
pub fn rewrite_links_to_local(output_dir: &Path, base_url: &str) -> LinkRewriteReport {
  match LinkRewriter::new(output_dir, base_url) {
    Some(rewriter) => rewriter.rewrite_tree(),
    None => LinkRewriteReport::default(),
  }
}
