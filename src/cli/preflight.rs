//! Pre-flight checks before the bot starts polling.
//!
//! A missing token is fatal. Missing media tools are only reported: the bot
//! can still answer /start and /help, and every search or download will fail
//! with a user-visible message until the tools are installed.

use crate::config::Settings;
use crate::error::{LydError, Result};
use std::process::Command;

/// Outcome of the tool checks.
#[derive(Debug, Default)]
pub struct Report {
    /// Tools that are missing or broken, with the reason.
    pub problems: Vec<LydError>,
}

impl Report {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Run all checks. Returns `Err` only for fatal problems.
pub fn check(settings: &Settings) -> Result<Report> {
    settings.token()?;

    let mut report = Report::default();
    for tool in [settings.download.ytdlp_path.as_str(), "ffmpeg"] {
        if let Err(e) = check_tool(tool) {
            report.problems.push(e);
        }
    }
    Ok(report)
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    // ffmpeg/ffprobe use -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(LydError::ToolFailed(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(LydError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(LydError::ToolNotFound(format!(
            "{}: {}",
            name, e
        ))),
    }
}
