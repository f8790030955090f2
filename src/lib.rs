//! tunegrab - an interactive front-end for yt-dlp
//!
//! Presents a small menu with two ways of feeding video URLs to yt-dlp:
//! typing them in by hand, or watching the clipboard and grabbing every
//! URL that lands on it. The audio track of each item is extracted into
//! a local download directory; yt-dlp does all the heavy lifting.

pub mod cli;
pub mod config;
pub mod download;
pub mod menu;
pub mod tool;
pub mod utils;
pub mod watch;

pub use cli::Cli;
pub use config::Settings;
pub use download::{Downloader, Outcome};
pub use tool::{AudioTool, MediaInfo, YtDlp};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Errors raised at the yt-dlp seam
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    #[error("yt-dlp was not found on PATH")]
    Missing,

    #[error("yt-dlp version probe failed: {0}")]
    Probe(String),

    #[error("yt-dlp exited unsuccessfully: {0}")]
    Fetch(String),
}
