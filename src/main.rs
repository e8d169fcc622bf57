use clap::Parser;
use music_menubar_lib::cli::Cli;
use music_menubar_lib::config::Config;
use music_menubar_lib::logger::init_logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    init_logger(cli.log_level.as_deref().unwrap_or(&config.log_level))?;

    music_menubar_lib::run(cli.selected_command(), config).await
}
