use std::path::Path;

use sha2::{Digest, Sha256};
use url::Url;

/// Extension used for downloaded images whose URL path carries none.
pub const DEFAULT_IMAGE_EXTENSION: &str = ".img";

/// Derive the local filename for a remote asset from its URL.
///
/// The name is the hex SHA-256 digest of the URL followed by the extension of the URL's last
/// path segment, so the same URL maps to the same file on every run. When the path has no
/// extension `default_extension` is appended instead.
pub fn content_addressed_name(url: &str, default_extension: &str) -> String {
    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    let extension = url_path_extension(url).unwrap_or_else(|| dotted(default_extension));
    format!("{digest}{extension}")
}

fn url_path_extension(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last_segment = parsed.path_segments()?.next_back()?;
    let extension = Path::new(last_segment).extension()?.to_str()?;
    if extension.is_empty() {
        None
    } else {
        Some(format!(".{extension}"))
    }
}

fn dotted(extension: &str) -> String {
    if extension.is_empty() || extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{extension}")
    }
}
