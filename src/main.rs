use clap::Parser;
use console::style;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tunegrab::tool::AudioTool;
use tunegrab::{menu, Cli, Downloader, Settings, ToolError, YtDlp};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tunegrab=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let _cli = Cli::parse();

    println!(
        "{} {}",
        style("tunegrab").magenta().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("Grab the audio track of web videos with yt-dlp\n");

    let settings = Settings::from_env();
    if let Err(err) = settings.ensure_download_dir() {
        eprintln!("{} {:#}", style("Error:").red().bold(), err);
        return ExitCode::FAILURE;
    }

    let tool: Arc<dyn AudioTool> = Arc::new(YtDlp::new(settings.ytdlp_bin.clone()));

    // The one intentionally fatal check: no yt-dlp, no program
    println!("Checking dependencies...");
    match tool.probe_version().await {
        Ok(version) => {
            println!(
                "{} (version {})",
                style("Found yt-dlp").green().bold(),
                style(&version).cyan()
            );
        }
        Err(err @ ToolError::Missing) => {
            eprintln!("{} {}", style("Error:").red().bold(), err);
            eprintln!("Install it first: https://github.com/yt-dlp/yt-dlp");
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprintln!("{} {}", style("Error:").red().bold(), err);
            return ExitCode::FAILURE;
        }
    }

    let downloader = Downloader::from_settings(tool, &settings);
    menu::dispatch(&downloader).await;

    ExitCode::SUCCESS
}
