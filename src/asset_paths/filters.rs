use std::path::Path;

const TEXT_ASSET_EXTENSIONS: &[&str] = &["html", "htm", "css", "js"];
const HTML_ASSET_EXTENSIONS: &[&str] = &["html", "htm"];

/// Determine whether a mirrored file is a text asset that may carry links to the site itself.
pub fn is_text_asset(path: &Path) -> bool {
    has_extension(path, TEXT_ASSET_EXTENSIONS)
}

/// Determine whether a mirrored file is an HTML page.
pub fn is_html_asset(path: &Path) -> bool {
    has_extension(path, HTML_ASSET_EXTENSIONS)
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            allowed
                .iter()
                .any(|candidate| extension.eq_ignore_ascii_case(candidate))
        })
}
