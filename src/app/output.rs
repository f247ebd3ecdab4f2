// src/app/output.rs — where sheets land and how they get opened
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command};

use tracing::{debug, info, warn};

use super::error::ScheduleError;

pub const DOC_EXT: &str = "docx";

// Plenty for one folder; past this something is wrong with the directory.
const MAX_SUFFIX: u32 = 10_000;

/// The user's desktop, then `~/Desktop`, then the working directory.
pub fn desktop_dir() -> PathBuf {
    dirs::desktop_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join("Desktop")))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `<prefix>_<YYYYMMDD>.docx` for an ISO date.
pub fn output_filename(prefix: &str, iso_date: &str) -> String {
    format!("{prefix}_{}.{DOC_EXT}", iso_date.trim().replace('-', ""))
}

fn split_name(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(dot) if dot > 0 => (&filename[..dot], &filename[dot..]),
        _ => (filename, ""),
    }
}

fn candidate(dir: &Path, filename: &str, n: u32) -> PathBuf {
    if n == 0 {
        return dir.join(filename);
    }
    let (stem, ext) = split_name(filename);
    dir.join(format!("{stem}_{n}{ext}"))
}

/// First free path among `name.ext`, `name_1.ext`, `name_2.ext`, …
pub fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    (0..MAX_SUFFIX)
        .map(|n| candidate(dir, filename, n))
        .find(|p| !p.exists())
        .unwrap_or_else(|| candidate(dir, filename, MAX_SUFFIX))
}

/// Write `bytes` under a free name in `dir`. Never replaces an existing file.
pub fn save_unique(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, ScheduleError> {
    fs::create_dir_all(dir)?;

    for n in 0..=MAX_SUFFIX {
        let path = candidate(dir, filename, n);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        };
        file.write_all(bytes)?;
        file.flush()?;
        info!("saved {} ({} bytes)", path.display(), bytes.len());
        return Ok(path);
    }

    Err(ScheduleError::Io(io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free name for {filename} in {}", dir.display()),
    )))
}

fn opener(path: &Path) -> Command {
    #[cfg(target_os = "windows")]
    {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    }
    #[cfg(target_os = "macos")]
    {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

/// Hand the file to the platform's default application.
///
/// Only a failure to launch the opener is returned. The opener is reaped on a
/// detached thread, which logs a non-zero exit.
pub fn open_in_default_app(path: &Path) -> Result<(), ScheduleError> {
    let child = opener(path).spawn().map_err(|e| ScheduleError::Open {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let path = path.to_path_buf();
    std::thread::spawn(move || reap_opener(child, &path));
    Ok(())
}

fn reap_opener(mut child: Child, path: &Path) {
    match child.wait() {
        Ok(status) if status.success() => debug!("opened {}", path.display()),
        Ok(status) => warn!("opener for {} exited with {status}", path.display()),
        Err(e) => warn!("opener for {} not reaped: {e}", path.display()),
    }
}

/// Open, and only log when that fails.
pub fn open_or_log(path: &Path) {
    if let Err(e) = open_in_default_app(path) {
        warn!("{e}");
    }
}
