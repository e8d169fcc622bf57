use std::str::FromStr;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer as _};

/// Map a level name to a filter, falling back to `info`
pub fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::INFO)
}

/// Install the console subscriber
///
/// Records emitted through the `log` macros are forwarded to it as well.
/// Output goes to stderr so stdout stays clean for `status --json`.
pub fn init_logger(level: &str) -> anyhow::Result<()> {
    let level = parse_level(level);

    let stderr_layer = tracing_subscriber::fmt::Layer::default()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(level);

    tracing_subscriber::registry().with(stderr_layer).try_init()?;
    Ok(())
}
