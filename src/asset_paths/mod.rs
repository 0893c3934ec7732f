//! Helpers for resolving and naming paths inside a mirrored site.
//!
//! The responsibilities are split into focused submodules so that the logic for filtering
//! mirrored files, naming downloaded assets and computing relative references can be tested
//! independently. Both rewriting passes share these helpers.

mod filters;
mod naming;
mod relative;

pub use filters::{is_html_asset, is_text_asset};
pub use naming::{DEFAULT_IMAGE_EXTENSION, content_addressed_name};
pub use relative::{normalize_lexically, relative_url_path};
