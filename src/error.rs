//! Error types for the player bridge, artwork lookup and configuration

/// Result type alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `osascript` could not be spawned
    #[error("failed to launch script interpreter: {0}")]
    Spawn(#[from] std::io::Error),

    /// The script ran but reported an error
    #[error("script failed: {0}")]
    Script(String),

    /// Combined metadata did not contain the expected five fields
    #[error("expected 5 metadata fields, got {0}")]
    FieldCount(usize),

    /// Seek target was NaN or infinite
    #[error("invalid seek position: {0}")]
    InvalidSeek(f64),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration could not be parsed
    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration value was rejected
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
