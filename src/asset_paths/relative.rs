use std::iter;
use std::path::{Component, Path, PathBuf};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters of an on-disk name that a browser would otherwise read as URL syntax.
const FILE_NAME_ESCAPES: &AsciiSet = &CONTROLS.add(b'%').add(b'?').add(b'#');

/// Collapse `.` and `..` segments without touching the filesystem.
///
/// Mirrored paths are frequently resolved before the file they name exists (or in order to
/// decide whether it exists), so canonicalisation is not an option. A `..` that would climb
/// above the root of an absolute path is dropped, matching how URLs resolve.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = normalized.components().next_back();
                let climbs_named_dir = matches!(last, Some(Component::Normal(_)));
                let at_root = matches!(last, Some(Component::RootDir | Component::Prefix(_)));
                if climbs_named_dir {
                    normalized.pop();
                } else if !at_root {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Produce the reference a file in `from_dir` should use to reach `target`.
///
/// Both paths are expected to be absolute and normalised. The result always uses forward
/// slashes so that it can be embedded into HTML, CSS or JavaScript regardless of the native
/// directory separator, and characters that would otherwise be read as URL syntax are
/// percent-encoded.
pub fn relative_url_path(from_dir: &Path, target: &Path) -> String {
    let from: Vec<Component> = from_dir.components().collect();
    let to: Vec<Component> = target.components().collect();
    let shared = from
        .iter()
        .zip(&to)
        .take_while(|(left, right)| left == right)
        .count();

    let segments: Vec<String> = iter::repeat("..".to_string())
        .take(from.len() - shared)
        .chain(
            to[shared..]
                .iter()
                .map(|component| escape_segment(&component.as_os_str().to_string_lossy())),
        )
        .collect();

    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

fn escape_segment(segment: &str) -> String {
    utf8_percent_encode(segment, FILE_NAME_ESCAPES).to_string()
}
