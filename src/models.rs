//! Data structures produced while post-processing a mirrored site.
//!
//! Everything here is derived from the filesystem on each run; nothing is persisted.

use std::ops::Range;

/// Same-host URL found inside a text asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteCandidate {
  /// Byte range covering the scheme/host prefix and the path.
  pub span: Range<usize>,
  /// Absolute URL path including any query string or fragment, starting with `/`.
  pub path: String,
}

/// `<img>` source attribute pointing at an absolute `http`/`https` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
  /// Byte range covering the attribute value only, without quotes.
  pub span: Range<usize>,
  /// Referenced URL.
  pub url: String,
}

/// Result of transforming the contents of a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRewrite {
  /// Content after all replacements were applied.
  pub content: String,
  /// Number of replacements applied; zero means the file must not be written.
  pub replacements: usize,
}

impl FileRewrite {
  /// Whether the file needs to be written back.
  pub fn is_changed(&self) -> bool {
    self.replacements > 0
  }
}

/// Summary of a local-link rewriting pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRewriteReport {
  /// Text assets inspected.
  pub files_scanned: usize,
  /// Files written back with at least one rewritten link.
  pub files_rewritten: usize,
  /// Total same-host references replaced with relative paths.
  pub links_rewritten: usize,
  /// Files skipped because they could not be read or written.
  pub failed_files: usize,
}

/// Summary of an external image localisation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageLocalizeReport {
  /// HTML pages inspected.
  pub files_scanned: usize,
  /// Pages written back with at least one localised image.
  pub files_rewritten: usize,
  /// Image references pointed at a local copy.
  pub references_rewritten: usize,
  /// Remote images fetched during this pass.
  pub downloads: usize,
  /// Image references left untouched because their download failed.
  pub failed_downloads: usize,
  /// Pages skipped because they could not be read or written.
  pub failed_files: usize,
}

/// Outcome of the post-processing passes run over a mirror.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostProcessReport {
  /// Local-link rewriting summary.
  pub links: LinkRewriteReport,
  /// External image summary, absent when the pass was disabled or could not start.
  pub images: Option<ImageLocalizeReport>,
}

/// Outcome of a complete mirror run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorReport {
  /// Exit code reported by wget.
  pub exit_code: i32,
  /// Post-processing summary; absent when wget failed.
  pub post_process: Option<PostProcessReport>,
}
