pub mod artwork;
pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod logger;
pub mod models;
pub mod player;
pub mod poller;
pub mod preview;
pub mod script;
pub mod utils;

use anyhow::bail;
use log::info;

use crate::cli::Command;
use crate::config::Config;
use crate::models::NOT_RUNNING_STATUS;
use crate::player::MusicPlayer;
use crate::preview::{is_preview, PREVIEW_BANNER};

/// Execute a parsed command against the configured player
pub async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    let preview = is_preview();
    if preview {
        eprintln!("{PREVIEW_BANNER}");
    }

    match command {
        Command::Run => {
            let poller = host::build_poller(&config, preview)?;
            info!("watching {} every {:?}", config.player_app, config.poll_interval());
            host::run_host(&poller).await?;
        }
        Command::Status { json } => {
            let poller = host::build_poller(&config, preview)?;
            let outcome = poller.tick().await;
            info!("status tick: {outcome:?}");

            let display = poller.display();
            if json {
                println!("{}", serde_json::to_string_pretty(&display)?);
            } else {
                println!("{}", display.status);
            }
        }
        Command::PlayPause => running_player(&config, preview).await?.play_pause().await?,
        Command::Next => running_player(&config, preview).await?.next_track().await?,
        Command::Previous => running_player(&config, preview).await?.previous_track().await?,
        Command::Seek { position } => running_player(&config, preview).await?.seek(position).await?,
    }
    Ok(())
}

/// Player for a one-shot control. Fails while the player is not running,
/// since any `tell application` would launch it.
async fn running_player(config: &Config, preview: bool) -> anyhow::Result<MusicPlayer> {
    let player = host::build_player(config, preview);
    if !player.is_running().await {
        bail!(NOT_RUNNING_STATUS);
    }
    Ok(player)
}
