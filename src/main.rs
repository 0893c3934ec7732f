//! Command line entry point for mirroring a site for offline use.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{error, info};

use offline_site_mirror::{MirrorConfig, SiteMirror, logging};

/// Mirror a website into a local static site directory.
#[derive(Debug, Parser)]
#[command(name = "offline-site-mirror", version, about)]
struct Cli {
  /// Root URL to mirror [default: https://blog.sixhz.top/]
  #[arg(long)]
  url: Option<String>,

  /// Directory (relative to the project root) to store the mirrored site [default: site]
  #[arg(long)]
  output_dir: Option<String>,

  /// Remove the output directory before mirroring (default)
  #[arg(long, conflicts_with = "no_clean")]
  clean: bool,

  /// Keep existing output and download into it
  #[arg(long)]
  no_clean: bool,

  /// Use wget spider mode to test links without downloading files
  #[arg(long)]
  spider: bool,

  /// Skip wget and only post-process an existing output directory
  #[arg(long)]
  rewrite_only: bool,

  /// Leave images hosted on other domains untouched
  #[arg(long)]
  no_external_images: bool,

  /// Project root the output directory must stay inside [default: current directory]
  #[arg(long)]
  root: Option<PathBuf>,

  /// Configuration file [default: <root>/mirror.config.json when present]
  #[arg(long)]
  config: Option<PathBuf>,

  /// Log debug details
  #[arg(short, long)]
  verbose: bool,
}

impl Cli {
  fn load_config(&self, root: &Path) -> Result<MirrorConfig> {
    let mut config = match &self.config {
      Some(path) => MirrorConfig::load(path)?,
      None => MirrorConfig::discover(root),
    };

    if let Some(url) = &self.url {
      config.url = url.clone();
    }
    if let Some(output_dir) = &self.output_dir {
      config.output_dir = output_dir.clone();
    }
    if self.clean {
      config.clean = true;
    }
    if self.no_clean {
      config.clean = false;
    }
    if self.spider {
      config.spider = true;
    }
    if self.no_external_images {
      config.localize_external_images = false;
    }

    Ok(config)
  }
}

fn project_root(cli: &Cli) -> Result<PathBuf> {
  let root = match &cli.root {
    Some(root) => root.clone(),
    None => std::env::current_dir().context("failed to determine the current directory")?,
  };
  std::fs::canonicalize(&root)
    .with_context(|| format!("project root {} does not exist", root.display()))
}

fn run(cli: &Cli) -> Result<i32> {
  let root = project_root(cli)?;
  let config = cli.load_config(&root)?;
  let mirror = SiteMirror::new(root, config);

  if cli.rewrite_only {
    let output_dir = mirror.output_dir()?;
    if !output_dir.is_dir() {
      bail!("nothing to rewrite: {} does not exist", output_dir.display());
    }
    let report = mirror.post_process(&output_dir);
    info!("post-processing finished: {report:?}");
    return Ok(0);
  }

  let report = mirror.run()?;
  if let Some(post_process) = &report.post_process {
    info!("post-processing finished: {post_process:?}");
  }
  Ok(report.exit_code)
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  logging::init_logging(cli.verbose);

  match run(&cli) {
    Ok(0) => ExitCode::SUCCESS,
    Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
    Err(err) => {
      error!("{err:#}");
      ExitCode::FAILURE
    }
  }
}
