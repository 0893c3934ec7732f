use std::cell::RefCell;
use std::fs;
use std::path::Path;

use offline_site_mirror::asset_paths::content_addressed_name;
use offline_site_mirror::{
  AssetFetcher, FetchError, MirrorConfig, SiteMirror, localize_external_images, rewrite_links_to_local,
};
use reqwest::StatusCode;
use tempfile::tempdir;

const BASE_URL: &str = "https://blog.sixhz.top/";

fn write(path: &Path, content: &str) {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(path, content).unwrap();
}

fn read(path: &Path) -> String {
  fs::read_to_string(path).unwrap()
}

#[derive(Default)]
struct RecordingFetcher {
  calls: RefCell<Vec<String>>,
}

impl AssetFetcher for RecordingFetcher {
  fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
    self.calls.borrow_mut().push(url.to_string());
    if url.contains("offline.example") {
      return Err(FetchError::Status {
        url: url.to_string(),
        status: StatusCode::GATEWAY_TIMEOUT,
      });
    }
    Ok(url.as_bytes().to_vec())
  }
}

#[test]
fn anchors_to_mirrored_pages_become_relative() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write(
    &root.join("index.html"),
    r#"<a href="https://blog.sixhz.top/post/1/">First post</a>"#,
  );
  write(&root.join("post/1/index.html"), "<h1>First post</h1>");

  let report = rewrite_links_to_local(root, BASE_URL);

  assert_eq!(
    read(&root.join("index.html")),
    r#"<a href="post/1/index.html">First post</a>"#
  );
  assert_eq!(report.links_rewritten, 1);
  assert_eq!(report.files_rewritten, 1);
}

#[test]
fn references_are_relative_to_the_referencing_file() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write(&root.join("c/style.css"), "body {}");
  write(
    &root.join("a/b/index.html"),
    r#"<link rel="stylesheet" href="https://blog.sixhz.top/c/style.css">"#,
  );
  write(
    &root.join("c/page.html"),
    r#"<link rel="stylesheet" href="//blog.sixhz.top/c/style.css">"#,
  );
  write(
    &root.join("c/theme.css"),
    "@import url(http://blog.sixhz.top/c/style.css);",
  );

  rewrite_links_to_local(root, BASE_URL);

  assert_eq!(
    read(&root.join("a/b/index.html")),
    r#"<link rel="stylesheet" href="../../c/style.css">"#
  );
  assert_eq!(
    read(&root.join("c/page.html")),
    r#"<link rel="stylesheet" href="style.css">"#
  );
  assert_eq!(read(&root.join("c/theme.css")), "@import url(style.css);");
}

#[test]
fn missing_targets_and_other_hosts_are_left_byte_identical() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write(&root.join("logo.png"), "png");
  let page = concat!(
    r#"<img src="https://blog.sixhz.top/missing.png">"#,
    r#"<img src="https://cdn.sixhz.top/logo.png">"#,
    r#"<script src="https://blog.sixhz.top/app.js?v=2"></script>"#,
  );
  write(&root.join("app.js"), "console.log(1);");
  write(&root.join("index.html"), page);

  let report = rewrite_links_to_local(root, BASE_URL);

  assert_eq!(read(&root.join("index.html")), page);
  assert_eq!(report.files_rewritten, 0);
  assert_eq!(report.files_scanned, 2);
}

#[test]
fn rewriting_twice_changes_nothing_the_second_time() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  write(&root.join("css/site.css"), "body {}");
  write(&root.join("about/index.html"), "about");
  write(
    &root.join("index.html"),
    r#"<link href="https://blog.sixhz.top/css/site.css"><a href="http://blog.sixhz.top/about/">About</a>"#,
  );

  let first = rewrite_links_to_local(root, BASE_URL);
  let after_first = read(&root.join("index.html"));
  let second = rewrite_links_to_local(root, BASE_URL);

  assert_eq!(first.links_rewritten, 2);
  assert_eq!(second.links_rewritten, 0);
  assert_eq!(second.files_rewritten, 0);
  assert_eq!(read(&root.join("index.html")), after_first);
  assert_eq!(
    after_first,
    r#"<link href="css/site.css"><a href="about/index.html">About</a>"#
  );
}

#[test]
fn external_images_are_localized_once_across_pages_and_runs() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  let url = "https://images.example.net/cover.jpg";
  write(&root.join("index.html"), &format!(r#"<img src="{url}">"#));
  write(
    &root.join("post/1/index.html"),
    &format!(r#"<p><img alt="cover" src="{url}"></p>"#),
  );

  let fetcher = RecordingFetcher::default();
  let first = localize_external_images(root, BASE_URL, &fetcher);
  let name = content_addressed_name(url, ".img");

  assert_eq!(fetcher.calls.borrow().len(), 1);
  assert_eq!(first.downloads, 1);
  assert_eq!(first.references_rewritten, 2);
  assert_eq!(
    read(&root.join("external_assets").join(&name)),
    url
  );
  assert_eq!(
    read(&root.join("index.html")),
    format!(r#"<img src="external_assets/{name}">"#)
  );
  assert_eq!(
    read(&root.join("post/1/index.html")),
    format!(r#"<p><img alt="cover" src="../../external_assets/{name}"></p>"#)
  );

  let fresh = RecordingFetcher::default();
  write(&root.join("new.html"), &format!(r#"<img src="{url}">"#));
  let second = localize_external_images(root, BASE_URL, &fresh);

  assert!(fresh.calls.borrow().is_empty());
  assert_eq!(second.downloads, 0);
  assert_eq!(
    read(&root.join("new.html")),
    format!(r#"<img src="external_assets/{name}">"#)
  );
}

#[test]
fn extensionless_images_use_the_placeholder_extension() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  let url = "https://avatars.example.net/u/1234?s=64";
  write(&root.join("index.html"), &format!(r#"<img src="{url}">"#));

  let fetcher = RecordingFetcher::default();
  localize_external_images(root, BASE_URL, &fetcher);

  let name = content_addressed_name(url, ".img");
  assert!(name.ends_with(".img"));
  assert!(root.join("external_assets").join(&name).is_file());
}

#[test]
fn unreachable_images_keep_their_remote_url() {
  let dir = tempdir().unwrap();
  let root = dir.path();
  let page = r#"<img src="https://offline.example/a.png"><img src="https://images.example.net/b.png">"#;
  write(&root.join("index.html"), page);

  let fetcher = RecordingFetcher::default();
  let report = localize_external_images(root, BASE_URL, &fetcher);

  let name = content_addressed_name("https://images.example.net/b.png", ".img");
  assert_eq!(report.failed_downloads, 1);
  assert_eq!(
    read(&root.join("index.html")),
    format!(r#"<img src="https://offline.example/a.png"><img src="external_assets/{name}">"#)
  );
}

#[test]
fn post_processing_runs_both_passes() {
  let dir = tempdir().unwrap();
  let project = dir.path();
  let site = project.join("site");
  write(&site.join("css/site.css"), "body {}");
  write(
    &site.join("index.html"),
    r#"<link href="https://blog.sixhz.top/css/site.css"><img src="https://images.example.net/x.gif">"#,
  );

  let mirror = SiteMirror::new(project, MirrorConfig::default());
  let output_dir = mirror.output_dir().unwrap();
  let fetcher = RecordingFetcher::default();
  let report = mirror.post_process_with(&output_dir, Some(&fetcher));

  let name = content_addressed_name("https://images.example.net/x.gif", ".img");
  assert_eq!(report.links.links_rewritten, 1);
  assert_eq!(report.images.unwrap().references_rewritten, 1);
  assert_eq!(
    read(&site.join("index.html")),
    format!(r#"<link href="css/site.css"><img src="external_assets/{name}">"#)
  );
}
