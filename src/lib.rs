#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod asset_paths;
pub mod config;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod logging;
pub mod mirror;
pub mod models;
pub mod rewrite;
pub mod site_tree;
pub mod wget;

pub use config::MirrorConfig;
pub use error::MirrorError;
pub use fetch::{AssetFetcher, FetchError, HttpFetcher};
pub use mirror::SiteMirror;
pub use models::{ImageLocalizeReport, LinkRewriteReport, MirrorReport, PostProcessReport};
pub use rewrite::{localize_external_images, rewrite_links_to_local};
