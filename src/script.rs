//! AppleScript sources for the player and the bridge that executes them

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};

/// Executes AppleScript source and returns its textual result
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    async fn run(&self, source: &str) -> Result<String>;
}

/// Runs scripts through the `osascript` command line tool
#[derive(Debug, Clone)]
pub struct OsascriptRunner {
    program: String,
}

impl OsascriptRunner {
    pub fn new() -> Self {
        Self {
            program: "osascript".to_string(),
        }
    }

    /// Use another interpreter binary (e.g. a full path)
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for OsascriptRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScriptRunner for OsascriptRunner {
    async fn run(&self, source: &str) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("-e")
            .arg(source)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::script(stderr));
        }

        // osascript terminates its result with a single newline
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.strip_suffix('\n').unwrap_or(&stdout).to_string())
    }
}

/// Report the player state as its four character code
///
/// `playing` is `kPSP`; paused, stopped and the seeking states get their own codes.
pub fn player_state_script(app: &str) -> String {
    format!(
        r#"
        tell application "{app}"
            set currentState to player state
            if currentState is playing then return "kPSP"
            if currentState is paused then return "kPSp"
            if currentState is fast forwarding then return "kPSF"
            if currentState is rewinding then return "kPSR"
            return "kPSS"
        end tell
    "#
    )
}

/// Name, artist, duration, position and album joined by newlines
pub fn current_track_script(app: &str) -> String {
    format!(
        r#"
        set output to ""
        tell application "{app}"
            set song_name to name of current track
            set song_artist to artist of current track
            set song_duration to duration of current track
            set song_position to player position
            set song_album to album of current track
            set output to "" & song_name & "\n" & song_artist & "\n" & song_duration & "\n" & song_position & "\n" & song_album
        end tell
        return output
    "#
    )
}

pub fn play_pause_script(app: &str) -> String {
    format!(r#"tell application "{app}" to playpause"#)
}

pub fn previous_track_script(app: &str) -> String {
    format!(r#"tell application "{app}" to back track"#)
}

pub fn next_track_script(app: &str) -> String {
    format!(r#"tell application "{app}" to next track"#)
}

/// Seek to `position` seconds, embedded as a literal number
pub fn seek_script(app: &str, position: f64) -> String {
    format!("{}{position}", seek_prefix(app))
}

/// Seek script up to the embedded number
pub(crate) fn seek_prefix(app: &str) -> String {
    format!(r#"tell application "{app}" to set player position to "#)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripts_target_the_configured_app() {
        assert!(player_state_script("Music").contains(r#"tell application "Music""#));
        assert!(current_track_script("iTunes").contains(r#"tell application "iTunes""#));
        assert_eq!(
            play_pause_script("Music"),
            r#"tell application "Music" to playpause"#
        );
        assert_eq!(
            previous_track_script("Music"),
            r#"tell application "Music" to back track"#
        );
        assert_eq!(
            next_track_script("Music"),
            r#"tell application "Music" to next track"#
        );
    }

    #[test]
    fn metadata_fields_are_newline_joined_in_order() {
        let script = current_track_script("Music");
        let joined = r#""" & song_name & "\n" & song_artist & "\n" & song_duration & "\n" & song_position & "\n" & song_album"#;
        assert!(script.contains(joined));
    }

    #[test]
    fn seek_embeds_literal_number() {
        assert_eq!(
            seek_script("Music", 42.5),
            r#"tell application "Music" to set player position to 42.5"#
        );
        assert_eq!(
            seek_script("Music", 10.0),
            r#"tell application "Music" to set player position to 10"#
        );
    }

    #[tokio::test]
    async fn missing_interpreter_is_an_error() {
        let runner = OsascriptRunner::with_program("/nonexistent/osascript-for-tests");
        let result = runner.run("return 1").await;
        assert!(matches!(result, Err(Error::Spawn(_))));
    }
}
