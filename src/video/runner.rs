//! The seam between planning and the ffmpeg/ffprobe binaries.
//!
//! Operations never spawn processes directly; they hand an [`FfmpegCommand`]
//! to an [`FfmpegRunner`]. [`CommandRunner`] is the production implementation.
//! Tests substitute a recording mock.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("ffmpeg cmd failed ({status}): {command}{}", stderr_suffix(.stderr))]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("probe failed for {}: {reason}", path.display())]
    Probe { path: PathBuf, reason: String },
}

fn stderr_suffix(stderr: &str) -> String {
    let last = stderr.lines().rev().find(|l| !l.trim().is_empty());
    match last {
        Some(line) => format!(": {}", line.trim()),
        None => String::new(),
    }
}

/// Arguments for one ffmpeg invocation, without the program name.
///
/// Arguments are kept as `OsString` so file names reach ffmpeg byte for byte,
/// including names that are not valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FfmpegCommand {
    args: Vec<OsString>,
}

impl FfmpegCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn path(self, path: &Path) -> Self {
        self.arg(path)
    }

    pub fn as_args(&self) -> &[OsString] {
        &self.args
    }

    /// Value following `flag`, if present and valid UTF-8.
    pub fn value_of(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .and_then(|a| a.to_str())
    }

    pub fn contains(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

/// Lossy rendering for logs and error messages.
impl fmt::Display for FfmpegCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ffmpeg")?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Encapsulates all ffmpeg interactions for probing and running commands.
pub trait FfmpegRunner: Sync {
    /// Run ffprobe on the file and return its JSON report.
    fn probe(&self, path: &Path) -> Result<String, RunnerError>;

    /// Run one ffmpeg command to completion.
    fn run(&self, command: &FfmpegCommand) -> Result<(), RunnerError>;
}

/// Runs the real binaries via `std::process::Command`.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl CommandRunner {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl FfmpegRunner for CommandRunner {
    fn probe(&self, path: &Path) -> Result<String, RunnerError> {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "error", "-show_format", "-show_streams", "-of", "json"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| RunnerError::Spawn {
                program: self.ffprobe.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(RunnerError::Probe {
                path: path.to_path_buf(),
                reason: stderr_suffix(&String::from_utf8_lossy(&output.stderr))
                    .trim_start_matches(": ")
                    .to_string(),
            });
        }
        String::from_utf8(output.stdout).map_err(|e| RunnerError::Probe {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn run(&self, command: &FfmpegCommand) -> Result<(), RunnerError> {
        log::debug!("running: {command}");
        let output = Command::new(&self.ffmpeg)
            .args(command.as_args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| RunnerError::Spawn {
                program: self.ffmpeg.display().to_string(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(RunnerError::Failed {
                command: command.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}
