//! Terminal host for the poller: renders the display state the way the menu
//! bar label and popover would, and forwards single-letter controls from
//! stdin.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::artwork::{ArtworkClient, ArtworkLookup};
use crate::config::Config;
use crate::models::DisplayState;
use crate::player::{MusicPlayer, ProcessProbe, SysinfoProbe};
use crate::poller::StatusPoller;
use crate::preview::PreviewMusic;
use crate::script::{OsascriptRunner, ScriptRunner};
use crate::utils::format_timestamp;

pub const HOST_HELP: &str =
    "controls: p = play/pause, b = back, n = next, s <secs|m:ss> = seek, q = quit";

/// Build the player bridge, either real or canned
pub fn build_player(config: &Config, preview: bool) -> MusicPlayer {
    let (runner, probe): (Arc<dyn ScriptRunner>, Arc<dyn ProcessProbe>) = if preview {
        let music = Arc::new(PreviewMusic::new(config.player_app.clone()));
        (music.clone(), music)
    } else {
        (Arc::new(OsascriptRunner::new()), Arc::new(SysinfoProbe::new()))
    };
    MusicPlayer::new(
        runner,
        probe,
        config.player_app.clone(),
        config.process_name.clone(),
    )
}

pub fn build_artwork(config: &Config) -> crate::error::Result<ArtworkClient> {
    ArtworkClient::builder()
        .search_url(config.artwork.search_url.clone())
        .size(config.artwork.size)
        .timeout(Duration::from_secs(config.artwork.timeout_secs))
        .build()
}

pub fn build_poller(config: &Config, preview: bool) -> crate::error::Result<StatusPoller> {
    let player = build_player(config, preview);
    let artwork: Arc<dyn ArtworkLookup> = Arc::new(build_artwork(config)?);
    Ok(StatusPoller::new(player, artwork, config.poller_options()))
}

/// A control typed into the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostCommand {
    PlayPause,
    Previous,
    Next,
    Seek(f64),
    Quit,
}

impl HostCommand {
    /// Parse one input line; blank lines yield `None`
    pub fn parse(line: &str) -> anyhow::Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Ok(None);
        };

        let command = match word {
            "p" | "play" | "pause" => Self::PlayPause,
            "b" | "back" | "prev" | "previous" => Self::Previous,
            "n" | "next" => Self::Next,
            "q" | "quit" => Self::Quit,
            "s" | "seek" => {
                let target = words.next().ok_or_else(|| anyhow!("seek needs a position"))?;
                Self::Seek(parse_seek_target(target)?)
            }
            other => bail!("unknown command {other:?}"),
        };
        Ok(Some(command))
    }
}

/// Parse a seek target given as seconds (`83.5`) or `M:SS` (`1:23`)
///
/// The seconds part of `M:SS` must be below 60.
pub fn parse_seek_target(raw: &str) -> anyhow::Result<f64> {
    let seconds = match raw.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u64 = minutes.parse()?;
            let seconds: f64 = seconds.parse()?;
            if !(0.0..60.0).contains(&seconds) {
                bail!("invalid seek position {raw:?}, seconds must be below 60");
            }
            minutes as f64 * 60.0 + seconds
        }
        None => raw.parse()?,
    };
    if !seconds.is_finite() || seconds < 0.0 {
        bail!("invalid seek position {raw:?}");
    }
    Ok(seconds)
}

/// Turns display updates into terminal lines, skipping repeats
#[derive(Debug, Default)]
pub struct Renderer {
    last_line: Option<String>,
    last_artwork: String,
}

impl Renderer {
    pub fn render(&mut self, state: &DisplayState) -> Vec<String> {
        let mut lines = Vec::new();

        let icon = if state.is_playing { "▶" } else { "⏸" };
        let line = format!("{icon} {}", state.status);
        if self.last_line.as_deref() != Some(line.as_str()) {
            lines.push(line.clone());
            self.last_line = Some(line);
        }

        if state.artwork_url != self.last_artwork {
            self.last_artwork = state.artwork_url.clone();
            if !state.artwork_url.is_empty() {
                lines.push(format!("  artwork: {}", state.artwork_url));
            }
        }
        lines
    }
}

/// Progress line for a seek slider, e.g. `0:10 / 2:05`
pub fn progress(state: &DisplayState) -> String {
    format!(
        "{} / {}",
        format_timestamp(state.position),
        format_timestamp(state.duration)
    )
}

/// Returns false when the host should exit
async fn dispatch(poller: &StatusPoller, command: HostCommand) -> bool {
    match command {
        HostCommand::PlayPause => poller.play_pause().await,
        HostCommand::Previous => poller.previous_track().await,
        HostCommand::Next => poller.next_track().await,
        HostCommand::Seek(position) => {
            poller.seek(position).await;
            println!("  seek: {}", progress(&poller.display()));
        }
        HostCommand::Quit => return false,
    }
    true
}

/// Poll until the user quits or Ctrl-C arrives
pub async fn run_host(poller: &StatusPoller) -> anyhow::Result<()> {
    let mut rx = poller.subscribe();
    let mut renderer = Renderer::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    println!("{HOST_HELP}");
    for line in renderer.render(&poller.display()) {
        println!("{line}");
    }
    poller.start();

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                for line in renderer.render(&state) {
                    println!("{line}");
                }
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match HostCommand::parse(&line) {
                    Ok(Some(command)) => {
                        if !dispatch(poller, command).await {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => println!("  {e}; {HOST_HELP}"),
                },
                Ok(None) => {
                    info!("stdin closed, controls disabled");
                    stdin_open = false;
                }
                Err(e) => {
                    warn!("cannot read stdin: {e}");
                    stdin_open = false;
                }
            },
            _ = &mut ctrl_c => break,
        }
    }

    poller.stop();
    Ok(())
}
