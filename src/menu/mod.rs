use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

use crate::download::Downloader;
use crate::utils::is_valid_url;
use crate::watch::{ClipboardWatcher, SystemClipboard};

/// Menu entries, in display order.
const MENU_ITEMS: &[&str] = &[
    "Manual mode: type video URLs",
    "Clipboard mode: watch for copied URLs",
    "Quit",
];

/// What the user picked from the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Manual,
    Clipboard,
    Quit,
}

impl Choice {
    fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Choice::Manual),
            1 => Some(Choice::Clipboard),
            2 => Some(Choice::Quit),
            _ => None,
        }
    }
}

/// Present the main menu once and run the selected mode to completion.
pub async fn dispatch(downloader: &Downloader) {
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Menu")
        .items(MENU_ITEMS)
        .default(0)
        .interact_opt();

    let choice = match selection {
        Ok(Some(index)) => Choice::from_index(index),
        // Escape, closed stdin and detached terminals all mean the same
        // thing here: nothing was chosen
        Ok(None) | Err(_) => None,
    };

    match choice {
        Some(Choice::Manual) => manual_mode(downloader).await,
        Some(Choice::Clipboard) => clipboard_mode(downloader).await,
        Some(Choice::Quit) => println!("{}", style("Bye").green()),
        None => println!("{}", style("No option chosen").yellow()),
    }
}

/// Prompt for URLs one line at a time until quit/exit or Ctrl-C.
async fn manual_mode(downloader: &Downloader) {
    println!(
        "{}",
        style("Manual mode (type quit or exit to leave)")
            .magenta()
            .bold()
    );

    loop {
        let line = Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Video URL")
            .allow_empty(true)
            .interact_text();

        let input = match line {
            Ok(input) => input,
            Err(_) => {
                // Ctrl-C at the prompt
                println!("\n{}", style("Interrupted, leaving manual mode").yellow());
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            println!("{}", style("Nothing entered, try again").yellow());
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            break;
        }

        downloader.download(trimmed).await;
    }
}

/// Watch the clipboard and grab every valid URL that lands on it.
///
/// Downloads run synchronously on this loop; changes detected while one
/// is in flight land in the watcher's bounded queue (overflow drops).
async fn clipboard_mode(downloader: &Downloader) {
    let Some(clipboard) = SystemClipboard::detect() else {
        println!(
            "{}",
            style("Clipboard access is unavailable on this system").red()
        );
        return;
    };

    println!("{}", style("Clipboard mode (Ctrl-C to leave)").blue().bold());

    let mut watcher = ClipboardWatcher::spawn(clipboard);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\n{}", style("Interrupted, leaving clipboard mode").yellow());
                break;
            }
            changed = watcher.recv() => {
                match changed {
                    Some(text) => {
                        if is_valid_url(&text) {
                            println!("{} {}", style("URL detected:").cyan(), text);
                            downloader.download(&text).await;
                        } else {
                            tracing::debug!("ignoring clipboard text that is not a URL");
                        }
                    }
                    None => break,
                }
            }
        }
    }

    watcher.stop();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_has_exactly_three_choices() {
        assert_eq!(MENU_ITEMS.len(), 3);
    }

    #[test]
    fn indices_map_onto_choices_in_display_order() {
        assert_eq!(Choice::from_index(0), Some(Choice::Manual));
        assert_eq!(Choice::from_index(1), Some(Choice::Clipboard));
        assert_eq!(Choice::from_index(2), Some(Choice::Quit));
        assert_eq!(Choice::from_index(3), None);
    }
}
