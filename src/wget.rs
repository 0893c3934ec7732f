//! Locating and running wget, which performs the actual recursive download.

use std::ffi::OsString;
use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

use crate::error::MirrorError;

/// URLs wget must not follow: account and feed endpoints.
pub const DEFAULT_REJECT_REGEX: &str = "/(admin|login|register|action|feed)/";

/// Location of the wget build shipped with the project, relative to the project root.
pub const BUNDLED_WGET_PATH: &str = "tools/mingw64/bin/wget.exe";

/// Pick the wget executable to run.
///
/// Windows prefers the bundled build, everything else prefers the `wget` found on `PATH`;
/// either falls back to the other.
pub fn find_wget(root: &Path, bundled: &str) -> Result<PathBuf, MirrorError> {
    let bundled = root.join(bundled);
    let system = which::which("wget").ok();
    select_wget(cfg!(windows), &bundled, system)
}

fn select_wget(
    prefer_bundled: bool,
    bundled: &Path,
    system: Option<PathBuf>,
) -> Result<PathBuf, MirrorError> {
    let bundled = bundled.exists().then(|| bundled.to_path_buf());

    let found = if prefer_bundled {
        bundled.or(system)
    } else {
        system.or(bundled)
    };

    found.ok_or_else(|| {
        MirrorError::WgetNotFound(if prefer_bundled {
            format!(
                "wget not found. Expected bundled wget at {BUNDLED_WGET_PATH} or a system wget in PATH."
            )
        } else {
            format!("wget not found. Install wget or place it at {BUNDLED_WGET_PATH}.")
        })
    })
}

/// Program and arguments for a single wget invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorCommand {
    /// Executable to run.
    pub program: PathBuf,
    /// Arguments in order.
    pub args: Vec<OsString>,
}

impl MirrorCommand {
    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for MirrorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Build the wget invocation mirroring `url` into `output_dir`.
///
/// Links are converted and extensions adjusted by wget itself; host directories are not
/// created, so the site root lands directly in `output_dir`.
pub fn build_wget_command(
    wget: &Path,
    output_dir: &Path,
    url: &str,
    spider: bool,
    reject_regex: &str,
) -> MirrorCommand {
    let mut args: Vec<OsString> = vec![
        "--mirror".into(),
        "--convert-links".into(),
        "--adjust-extension".into(),
        "--page-requisites".into(),
        "--no-parent".into(),
        format!("--reject-regex={reject_regex}").into(),
        "-P".into(),
        output_dir.as_os_str().to_owned(),
        "-nH".into(),
    ];
    if spider {
        args.push("--spider".into());
    }
    args.push(url.into());

    MirrorCommand {
        program: wget.to_path_buf(),
        args,
    }
}

/// Run `command`, echoing its standard output line by line, and return its exit code.
///
/// Standard error is inherited rather than merged into the echoed stream, so wget's progress
/// output reaches the terminal unbuffered. A process killed by a signal reports `-1`.
pub fn stream_process_output(command: &MirrorCommand) -> Result<i32> {
    stream_process_output_to(command, &mut io::stdout().lock())
}

fn stream_process_output_to<W: Write>(command: &MirrorCommand, out: &mut W) -> Result<i32> {
    let mut child = command
        .to_command()
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| format!("failed to start {}", command.program.display()))?;

    if let Some(stdout) = child.stdout.take() {
        if let Err(err) = echo_lines(stdout, out) {
            // The child would otherwise block on a full pipe and never be reaped.
            let _ = child.kill();
            let _ = child.wait();
            return Err(err);
        }
    }

    let status = child
        .wait()
        .with_context(|| format!("failed to wait for {}", command.program.display()))?;
    Ok(status.code().unwrap_or(-1))
}

fn echo_lines<R: Read, W: Write>(source: R, out: &mut W) -> Result<()> {
    let mut reader = BufReader::new(source);
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .context("failed to read wget output")?;
        if read == 0 {
            return Ok(());
        }
        out.write_all(String::from_utf8_lossy(&line).as_bytes())
            .context("failed to echo wget output")?;
        out.flush().context("failed to echo wget output")?;
    }
}
