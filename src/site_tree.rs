//! Walking the mirrored tree and decoding its text assets.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Collect every file under `root` accepted by `include`, sorted by path.
///
/// Directories that cannot be listed are skipped, since a partially readable mirror should
/// still be processed as far as possible. Symlinked directories are not followed.
pub fn collect_files<F>(root: &Path, include: F) -> Vec<PathBuf>
where
  F: Fn(&Path) -> bool,
{
  let mut files = Vec::new();
  collect_files_recursively(root, &include, &mut files);
  files.sort();
  files
}

fn collect_files_recursively<F>(dir: &Path, include: &F, files: &mut Vec<PathBuf>)
where
  F: Fn(&Path) -> bool,
{
  let entries = match fs::read_dir(dir) {
    Ok(entries) => entries,
    Err(err) => {
      debug!("skipping unreadable directory {}: {}", dir.display(), err);
      return;
    }
  };

  for entry in entries.flatten() {
    let path = entry.path();
    let Ok(file_type) = entry.file_type() else {
      continue;
    };

    if file_type.is_dir() {
      collect_files_recursively(&path, include, files);
    } else if (file_type.is_file() || (file_type.is_symlink() && path.is_file())) && include(&path)
    {
      files.push(path);
    }
  }
}

/// Read a text asset, dropping any bytes that are not valid UTF-8.
pub fn read_text(path: &Path) -> io::Result<String> {
  let bytes = fs::read(path)?;
  Ok(decode_text(&bytes))
}

/// Decode UTF-8 text, silently discarding undecodable byte sequences.
pub fn decode_text(bytes: &[u8]) -> String {
  let mut text = String::with_capacity(bytes.len());
  for chunk in bytes.utf8_chunks() {
    text.push_str(chunk.valid());
  }
  text
}
