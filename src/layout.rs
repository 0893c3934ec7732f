//! Placement of the mirror output inside the project root.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::asset_paths::normalize_lexically;
use crate::error::MirrorError;

/// Resolve `output_dir` against `root`, refusing anything that is not strictly inside it.
///
/// The output directory usually does not exist yet, so resolution starts out lexical. The
/// deepest part of the result that already exists is then canonicalised, so a symlink inside
/// the root cannot redirect the mirror elsewhere. The root itself is rejected as well, since
/// cleaning the output would then delete the project.
pub fn resolve_output_dir(root: &Path, output_dir: &Path) -> Result<PathBuf, MirrorError> {
  let root = fs::canonicalize(root).unwrap_or_else(|_| normalize_lexically(root));
  let target = normalize_lexically(&root.join(output_dir));

  if target == root || !target.starts_with(&root) {
    return Err(MirrorError::OutsideRoot { path: target, root });
  }

  let resolved = resolve_existing_prefix(&target);
  if resolved == root || !resolved.starts_with(&root) {
    return Err(MirrorError::OutsideRoot {
      path: resolved,
      root,
    });
  }

  Ok(target)
}

/// Canonicalise the deepest existing ancestor of `path` and re-append the missing tail.
fn resolve_existing_prefix(path: &Path) -> PathBuf {
  let mut existing = path;
  let mut tail = Vec::new();
  loop {
    if let Ok(resolved) = fs::canonicalize(existing) {
      return tail.iter().rev().fold(resolved, |acc: PathBuf, name| acc.join(name));
    }
    match (existing.parent(), existing.file_name()) {
      (Some(parent), Some(name)) => {
        tail.push(name.to_os_string());
        existing = parent;
      }
      _ => return path.to_path_buf(),
    }
  }
}

/// Create the output directory, removing previous contents first when `clean` is set.
pub fn ensure_output_dir(output_dir: &Path, clean: bool) -> Result<(), MirrorError> {
  if clean {
    match fs::remove_dir_all(output_dir) {
      Ok(()) => {}
      Err(err) if err.kind() == ErrorKind::NotFound => {}
      Err(source) => {
        return Err(MirrorError::Io {
          path: output_dir.to_path_buf(),
          source,
        });
      }
    }
  }

  fs::create_dir_all(output_dir).map_err(|source| MirrorError::Io {
    path: output_dir.to_path_buf(),
    source,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn resolves_nested_directories() {
    let root = Path::new("/project");
    let resolved = resolve_output_dir(root, Path::new("out/./site")).unwrap();
    assert_eq!(resolved, PathBuf::from("/project/out/site"));
  }

  #[test]
  fn rejects_directories_escaping_the_root() {
    let root = Path::new("/project");
    let err = resolve_output_dir(root, Path::new("../elsewhere")).unwrap_err();
    assert!(matches!(err, MirrorError::OutsideRoot { .. }));
    assert!(resolve_output_dir(root, Path::new("/tmp/site")).is_err());
  }

  #[test]
  fn rejects_the_root_itself() {
    let root = Path::new("/project");
    assert!(resolve_output_dir(root, Path::new(".")).is_err());
    assert!(resolve_output_dir(root, Path::new("site/..")).is_err());
  }

  #[test]
  fn accepts_absolute_paths_inside_the_root() {
    let root = Path::new("/project");
    let resolved = resolve_output_dir(root, Path::new("/project/site")).unwrap();
    assert_eq!(resolved, PathBuf::from("/project/site"));
  }

  #[cfg(unix)]
  #[test]
  fn rejects_output_symlinked_outside_the_root() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("project");
    let outside = dir.path().join("outside");
    fs::create_dir_all(&root).unwrap();
    fs::create_dir_all(&outside).unwrap();
    std::os::unix::fs::symlink(&outside, root.join("site")).unwrap();

    let err = resolve_output_dir(&root, Path::new("site")).unwrap_err();
    assert!(matches!(err, MirrorError::OutsideRoot { .. }));
    assert!(resolve_output_dir(&root, Path::new("site/nested")).is_err());
  }

  #[cfg(unix)]
  #[test]
  fn accepts_symlinks_that_stay_inside_the_root() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    fs::create_dir_all(root.join("real")).unwrap();
    std::os::unix::fs::symlink(root.join("real"), root.join("site")).unwrap();

    let resolved = resolve_output_dir(&root, Path::new("site")).unwrap();
    assert_eq!(resolved, root.join("site"));
  }

  #[test]
  fn cleans_existing_output() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("site");
    fs::create_dir_all(&output).unwrap();
    fs::write(output.join("stale.html"), "stale").unwrap();

    ensure_output_dir(&output, true).unwrap();

    assert!(output.is_dir());
    assert!(!output.join("stale.html").exists());
  }

  #[test]
  fn keeps_existing_output_without_clean() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("site");
    fs::create_dir_all(&output).unwrap();
    fs::write(output.join("kept.html"), "kept").unwrap();

    ensure_output_dir(&output, false).unwrap();

    assert!(output.join("kept.html").exists());
  }

  #[test]
  fn creates_missing_output() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("nested/site");
    ensure_output_dir(&output, true).unwrap();
    assert!(output.is_dir());
  }
}
