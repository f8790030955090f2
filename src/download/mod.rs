use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::tool::AudioTool;
use crate::utils::{is_valid_url, normalize_url};
use crate::Settings;

/// What a download request ended as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The tool reported success on some attempt
    Completed,
    /// Every attempt failed and the request was abandoned
    GaveUp,
    /// The input never passed validation; no attempt was made
    Rejected,
}

/// Runs the external tool against validated URLs with bounded retries.
///
/// Failure is always local to the request: running out of attempts is an
/// outcome, never an error that escapes to the caller.
pub struct Downloader {
    tool: Arc<dyn AudioTool>,
    dest: PathBuf,
    audio_format: String,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Downloader {
    pub fn new(
        tool: Arc<dyn AudioTool>,
        dest: PathBuf,
        audio_format: String,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            tool,
            dest,
            audio_format,
            // The contract is at least one attempt
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    pub fn from_settings(tool: Arc<dyn AudioTool>, settings: &Settings) -> Self {
        Self::new(
            tool,
            settings.download_dir.clone(),
            settings.audio_format.clone(),
            settings.max_attempts,
            settings.retry_delay,
        )
    }

    /// Download the audio track of `url` into the destination directory.
    ///
    /// Invalid input is reported and skipped without touching the tool.
    /// Attempt failures are reported and retried after a fixed pause;
    /// the pause only runs between consecutive attempts, never after the
    /// last one.
    pub async fn download(&self, url: &str) -> Outcome {
        if !is_valid_url(url) {
            println!(
                "{}",
                style("Please enter a valid http/https URL").yellow()
            );
            return Outcome::Rejected;
        }

        let clean = normalize_url(url);
        println!("{} {}", style("Resolved:").cyan(), clean);

        // Title probe is best-effort; the URL stands in when it fails
        let label = match self.tool.probe_info(&clean).await.and_then(|info| info.title) {
            Some(title) => title,
            None => clean.clone(),
        };

        for attempt in 1..=self.max_attempts {
            let spinner = attempt_spinner(&label, attempt, self.max_attempts);

            match self
                .tool
                .fetch_audio(&clean, &self.dest, &self.audio_format)
                .await
            {
                Ok(()) => {
                    spinner.finish_and_clear();
                    println!(
                        "{} → {}",
                        style("Done").green().bold(),
                        self.resolved_dest().display()
                    );
                    return Outcome::Completed;
                }
                Err(err) => {
                    spinner.finish_and_clear();
                    tracing::warn!(attempt, %err, "download attempt failed");
                    println!(
                        "{}",
                        style(format!(
                            "Attempt {} of {} failed: {}",
                            attempt, self.max_attempts, err
                        ))
                        .red()
                    );

                    if attempt < self.max_attempts {
                        println!(
                            "{}",
                            style(format!("Retrying in {}s...", self.retry_delay.as_secs()))
                                .yellow()
                        );
                        sleep(self.retry_delay).await;
                    } else {
                        println!("{}", style("Giving up on this URL").red().bold());
                    }
                }
            }
        }

        Outcome::GaveUp
    }

    /// Absolute destination path for the success message, best effort.
    fn resolved_dest(&self) -> PathBuf {
        fs_err::canonicalize(&self.dest).unwrap_or_else(|_| self.dest.clone())
    }
}

fn attempt_spinner(label: &str, attempt: u32, max: u32) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!(
        "Grabbing \"{}\" (attempt {}/{})",
        label, attempt, max
    ));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{MediaInfo, MockAudioTool};
    use crate::ToolError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn downloader(tool: MockAudioTool, max_attempts: u32, delay: Duration) -> Downloader {
        Downloader::new(
            Arc::new(tool),
            PathBuf::from("dl"),
            "mp3".to_string(),
            max_attempts,
            delay,
        )
    }

    #[tokio::test]
    async fn invalid_input_never_touches_the_tool() {
        let mut tool = MockAudioTool::new();
        tool.expect_probe_info().never();
        tool.expect_fetch_audio().never();

        let downloader = downloader(tool, 3, Duration::from_secs(2));

        for input in ["", "example.com", "ftp://a.com/x", "not a url"] {
            assert_eq!(downloader.download(input).await, Outcome::Rejected);
        }
    }

    #[tokio::test]
    async fn succeeds_on_third_attempt_without_signaling_failure() {
        let mut tool = MockAudioTool::new();
        tool.expect_probe_info()
            .returning(|_| Some(MediaInfo { title: Some("Some Talk".to_string()) }));

        let calls = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&calls);
        tool.expect_fetch_audio().times(3).returning(move |_, _, _| {
            if seen.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(ToolError::Fetch("transient".to_string()))
            } else {
                Ok(())
            }
        });

        let downloader = downloader(tool, 3, Duration::ZERO);

        assert_eq!(
            downloader.download("https://a.com/watch?v=1").await,
            Outcome::Completed
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_only_between_consecutive_attempts() {
        let mut tool = MockAudioTool::new();
        tool.expect_probe_info().returning(|_| None);
        tool.expect_fetch_audio()
            .times(3)
            .returning(|_, _, _| Err(ToolError::Fetch("network".to_string())));

        let downloader = downloader(tool, 3, Duration::from_secs(2));

        let started = tokio::time::Instant::now();
        let outcome = downloader.download("https://a.com/v").await;

        assert_eq!(outcome, Outcome::GaveUp);
        // three attempts, two pauses: no sleep after the final failure
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_retries_do_not_wait() {
        let mut tool = MockAudioTool::new();
        tool.expect_probe_info().returning(|_| None);
        tool.expect_fetch_audio()
            .times(3)
            .returning(|_, _, _| Err(ToolError::Fetch("network".to_string())));

        let downloader = downloader(tool, 3, Duration::ZERO);

        let started = tokio::time::Instant::now();
        assert_eq!(
            downloader.download("https://a.com/v").await,
            Outcome::GaveUp
        );
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn attempt_count_is_clamped_to_at_least_one() {
        let mut tool = MockAudioTool::new();
        tool.expect_probe_info().returning(|_| None);
        tool.expect_fetch_audio()
            .times(1)
            .returning(|_, _, _| Err(ToolError::Fetch("boom".to_string())));

        let downloader = downloader(tool, 0, Duration::ZERO);

        assert_eq!(
            downloader.download("https://a.com/v").await,
            Outcome::GaveUp
        );
    }

    #[tokio::test]
    async fn passes_the_normalized_url_to_the_tool() {
        let mut tool = MockAudioTool::new();
        tool.expect_probe_info().returning(|_| None);
        tool.expect_fetch_audio()
            .times(1)
            .withf(|url, dest, format| {
                url == "https://a.com/path"
                    && dest == std::path::Path::new("dl")
                    && format == "mp3"
            })
            .returning(|_, _, _| Ok(()));

        let downloader = downloader(tool, 3, Duration::ZERO);

        assert_eq!(
            downloader.download("https://a.com/path?x=1#frag").await,
            Outcome::Completed
        );
    }
}
