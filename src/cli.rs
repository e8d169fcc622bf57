use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::host::parse_seek_target;

#[derive(Debug, Parser)]
#[command(
    name = "music-menubar",
    about = "Now-playing status and playback controls for Apple Music",
    version,
    after_help = "Set MUSIC_MENUBAR_PREVIEW=1 to use canned playback data."
)]
pub struct Cli {
    #[arg(short = 'c', long = "config", global = true, help = "Configuration file")]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "trace, debug, info, warn, error or off"
    )]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The chosen subcommand, `run` when none was given
    pub fn selected_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    #[command(about = "Poll the player and show status changes (default)")]
    Run,

    #[command(about = "Poll once and print the status")]
    Status {
        #[arg(long, help = "Print the full display state as JSON")]
        json: bool,
    },

    #[command(about = "Toggle playback")]
    PlayPause,

    #[command(about = "Skip to the next track")]
    Next,

    #[command(about = "Go back to the previous track", visible_alias = "prev")]
    Previous,

    #[command(about = "Seek to a position in seconds or M:SS")]
    Seek {
        #[arg(value_parser = parse_seek_target, help = "Target position, e.g. 83.5 or 1:23")]
        position: f64,
    },
}
