//! Clipboard change watching behind a capability seam.
//!
//! The system clipboard is optional: on headless sessions there may be
//! nothing to talk to, in which case clipboard mode stays disabled
//! instead of crashing. Changes travel from a polling thread to the
//! dispatch loop over a bounded channel; when the queue is full (a
//! download is running and the user keeps copying), the newest change is
//! dropped rather than blocking the poller or queueing without bound.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// How often the clipboard is sampled for changes.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Pending change notifications kept while a download is running.
const CHANNEL_CAPACITY: usize = 8;

/// Anything that can be polled for its current text content.
///
/// The real source is the system clipboard; tests script a sequence.
pub trait TextSource: Send + 'static {
    fn read_text(&mut self) -> Option<String>;
}

/// System clipboard backed by arboard.
pub struct SystemClipboard {
    clipboard: arboard::Clipboard,
}

impl SystemClipboard {
    /// Presence check: `None` when no clipboard is reachable (headless
    /// session, missing display server), in which case clipboard mode
    /// must not be entered.
    pub fn detect() -> Option<Self> {
        match arboard::Clipboard::new() {
            Ok(clipboard) => Some(Self { clipboard }),
            Err(err) => {
                tracing::debug!(%err, "clipboard capability unavailable");
                None
            }
        }
    }
}

impl TextSource for SystemClipboard {
    fn read_text(&mut self) -> Option<String> {
        self.clipboard.get_text().ok()
    }
}

/// Handle to a running clipboard watcher thread.
pub struct ClipboardWatcher {
    rx: mpsc::Receiver<String>,
    stop: Arc<AtomicBool>,
}

impl ClipboardWatcher {
    /// Spawn a watcher thread over `source`.
    ///
    /// Whatever is on the clipboard when the watcher starts does not
    /// count as a change; only edits made afterwards are reported.
    pub fn spawn<S: TextSource>(mut source: S) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        thread::spawn(move || {
            let mut last = source.read_text().unwrap_or_default();

            while !stop_flag.load(Ordering::Relaxed) {
                if !forward_change(source.read_text(), &mut last, &tx) {
                    break;
                }
                thread::sleep(POLL_INTERVAL);
            }
        });

        Self { rx, stop }
    }

    /// Receive the next change notification.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }

    /// Ask the watcher thread to wind down.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Drop for ClipboardWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One poll step: forward `current` when it differs from the last text
/// seen. A full queue drops the change (logged at debug) and the change
/// still counts as seen, so draining the queue never replays stale text.
///
/// Returns false once the receiving side is gone.
fn forward_change(current: Option<String>, last: &mut String, tx: &mpsc::Sender<String>) -> bool {
    let Some(text) = current else {
        return true;
    };

    if text.is_empty() || text == *last {
        return true;
    }

    *last = text.clone();
    match tx.try_send(text) {
        Ok(()) => true,
        Err(TrySendError::Full(dropped)) => {
            tracing::debug!("clipboard change dropped, queue full: {:.40}", dropped);
            true
        }
        Err(TrySendError::Closed(_)) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwards_only_changes() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut last = String::new();

        assert!(forward_change(Some("https://a.com".to_string()), &mut last, &tx));
        assert!(forward_change(Some("https://a.com".to_string()), &mut last, &tx));

        assert_eq!(rx.try_recv().unwrap(), "https://a.com");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn empty_and_missing_text_are_ignored() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut last = String::from("prev");

        assert!(forward_change(None, &mut last, &tx));
        assert!(forward_change(Some(String::new()), &mut last, &tx));

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn overflow_drops_the_newest_change_without_blocking() {
        let (tx, mut rx) = mpsc::channel(1);
        let mut last = String::new();

        assert!(forward_change(Some("one".to_string()), &mut last, &tx));
        // queue full: this change is dropped, not queued, not blocking
        assert!(forward_change(Some("two".to_string()), &mut last, &tx));

        assert_eq!(rx.try_recv().unwrap(), "one");
        assert!(rx.try_recv().is_err());

        // the dropped change is gone for good; a later distinct change flows
        assert!(forward_change(Some("three".to_string()), &mut last, &tx));
        assert_eq!(rx.try_recv().unwrap(), "three");
    }

    #[test]
    fn closed_receiver_stops_the_loop() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut last = String::new();

        assert!(!forward_change(Some("one".to_string()), &mut last, &tx));
    }
}
