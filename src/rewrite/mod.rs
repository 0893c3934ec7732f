//! Post-processing passes that make a wget mirror browsable without network access.
//!
//! Both passes scan the mirrored tree once, transform each file independently and only
//! write back files whose contents changed. Failures never escape: an unreadable page or
//! an unreachable image simply leaves the original reference in place.

pub mod images;
pub mod links;
mod splice;

use url::Url;

pub use images::{ImageLocalizer, find_image_references, localize_external_images};
pub use links::{LinkRewriter, rewrite_links_to_local};

/// Directory, relative to the output root, that holds downloaded external images.
pub const EXTERNAL_ASSETS_DIR: &str = "external_assets";

/// Host and explicit port of `url`, the part that identifies the mirrored site.
///
/// Returns `None` for unparsable URLs and URLs without a host.
pub(crate) fn url_authority(url: &str) -> Option<String> {
  let parsed = Url::parse(url).ok()?;
  let host = parsed.host_str().filter(|host| !host.is_empty())?;
  Some(match parsed.port() {
    Some(port) => format!("{host}:{port}"),
    None => host.to_string(),
  })
}
