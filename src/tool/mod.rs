use async_trait::async_trait;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::ToolError;

/// Metadata yt-dlp reports for a remote item via `--dump-json`.
///
/// Only the title is consumed; everything else in the dump is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaInfo {
    pub title: Option<String>,
}

/// Seam between the application and the external download tool.
///
/// The real implementation shells out to yt-dlp; tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioTool: Send + Sync {
    /// Query the tool's version string.
    async fn probe_version(&self) -> Result<String, ToolError>;

    /// Best-effort metadata probe for a URL.
    async fn probe_info(&self, url: &str) -> Option<MediaInfo>;

    /// Extract the audio track of `url` into `dest` as `format`.
    ///
    /// One call is one attempt: a non-zero exit maps to `ToolError::Fetch`
    /// carrying the tail of the tool's stderr.
    async fn fetch_audio(&self, url: &str, dest: &Path, format: &str) -> Result<(), ToolError>;
}

/// The yt-dlp binary on the search path.
pub struct YtDlp {
    bin: String,
}

impl YtDlp {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    /// yt-dlp output template: remote title as the filename stem.
    fn output_template(dest: &Path) -> PathBuf {
        dest.join("%(title)s.%(ext)s")
    }
}

#[async_trait]
impl AudioTool for YtDlp {
    async fn probe_version(&self) -> Result<String, ToolError> {
        let output = Command::new(&self.bin)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ToolError::Missing,
                _ => ToolError::Probe(e.to_string()),
            })?;

        if !output.status.success() {
            return Err(ToolError::Probe(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn probe_info(&self, url: &str) -> Option<MediaInfo> {
        let output = Command::new(&self.bin)
            .args(["--dump-json", "--no-playlist", url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .ok()?;

        if !output.status.success() {
            tracing::debug!("metadata probe failed for {}", url);
            return None;
        }

        serde_json::from_slice(&output.stdout).ok()
    }

    async fn fetch_audio(&self, url: &str, dest: &Path, format: &str) -> Result<(), ToolError> {
        tracing::debug!("invoking {} for {}", self.bin, url);

        let template = Self::output_template(dest);
        let template = template.to_string_lossy();

        let output = Command::new(&self.bin)
            .args([
                "-f",
                "bestaudio",
                "--extract-audio",
                "--audio-format",
                format,
                "--no-playlist",
                "--output",
                &template,
                url,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ToolError::Fetch(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ToolError::Fetch(stderr_tail(&stderr)));
        }

        Ok(())
    }
}

/// Last few lines of stderr, enough to say what went wrong without
/// flooding the terminal.
fn stderr_tail(stderr: &str) -> String {
    const LINES: usize = 3;

    let mut lines: Vec<&str> = stderr.lines().rev().take(LINES).collect();
    lines.reverse();
    lines.join("\n").trim().to_string()
}
