use clap::Parser;

/// Command-line surface.
///
/// All interaction happens through the interactive menu; the only
/// arguments clap contributes are the built-in `--help` and `--version`.
#[derive(Parser, Debug)]
#[command(
    name = "tunegrab",
    about = "Grab the audio track of web videos with yt-dlp",
    version,
    long_about = "Interactive front-end for yt-dlp. Pick a mode from the menu: type video URLs in by hand, or let tunegrab watch the clipboard and grab every URL you copy. The audio track of each item is extracted to mp3 in the download directory."
)]
pub struct Cli {}
