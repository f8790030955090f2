use anyhow::Context;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::Result;

/// Directory downloads land in by default, relative to the working directory.
const DEFAULT_DOWNLOAD_DIR: &str = "Download";

/// Runtime settings, assembled once at startup.
///
/// There is no configuration file; defaults mirror the historical
/// behavior, and the download directory and binary name can be
/// overridden through the environment for testing or odd installs.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory extracted audio files are written into
    pub download_dir: PathBuf,

    /// Name (or path) of the yt-dlp binary to invoke
    pub ytdlp_bin: String,

    /// Maximum subprocess attempts per URL
    pub max_attempts: u32,

    /// Fixed pause between consecutive attempts
    pub retry_delay: Duration,

    /// Target audio container passed to --audio-format
    pub audio_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            ytdlp_bin: "yt-dlp".to_string(),
            max_attempts: 3,
            retry_delay: Duration::from_secs(2),
            audio_format: "mp3".to_string(),
        }
    }
}

impl Settings {
    /// Assemble settings from defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(dir) = env::var("TUNEGRAB_DOWNLOAD_DIR") {
            if !dir.is_empty() {
                settings.download_dir = PathBuf::from(dir);
            }
        }

        if let Ok(bin) = env::var("TUNEGRAB_YTDLP") {
            if !bin.is_empty() {
                settings.ytdlp_bin = bin;
            }
        }

        // At least one attempt is always made
        settings.max_attempts = settings.max_attempts.max(1);

        settings
    }

    /// Create the download directory if it does not exist yet.
    ///
    /// Safe to call again when the directory is already present.
    pub fn ensure_download_dir(&self) -> Result<()> {
        fs_err::create_dir_all(&self.download_dir)
            .context("Failed to create the download directory")?;
        Ok(())
    }
}
