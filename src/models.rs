use serde::Serialize;

use crate::error::{Error, Result};
use crate::utils::{format_timestamp, parse_leading_float};

/// Status shown before the first poll has produced anything
pub const STARTUP_STATUS: &str = "Hello!";
/// Status shown while the player process is not alive
pub const NOT_RUNNING_STATUS: &str = "Apple Music is not running";
/// Status shown once the player is known to be idle
pub const NOTHING_PLAYING_STATUS: &str = "Nothing is currently playing";

/// Raw run-state token reported while the player is playing
pub const PLAYING_TOKEN: &str = "kPSP";

/// Number of newline separated fields in the combined metadata reply
pub const METADATA_FIELDS: usize = 5;

/// Whether `status` is one of the idle sentinels, i.e. no real status was set yet
pub fn is_idle_sentinel(status: &str) -> bool {
    status == NOT_RUNNING_STATUS || status == STARTUP_STATUS
}

/// Map a raw run-state token to the playing flag. Only an exact match counts.
pub fn is_playing_token(raw: &str) -> bool {
    raw == PLAYING_TOKEN
}

/// Last known player state, overwritten in place on every poll tick
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct PlaybackSnapshot {
    /// Whether the player process is alive
    pub is_running: bool,
    /// Whether the player reported the playing token
    pub is_playing: bool,
    pub track_name: String,
    pub artist_name: String,
    pub album_name: String,
    /// Track duration in seconds
    pub duration_seconds: f64,
    /// Elapsed time in seconds
    pub position_seconds: f64,
    /// Sized artwork URL, empty until a lookup succeeds
    pub artwork_url: String,
}

/// Everything a renderer needs: the menu bar label, controls and cover art
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DisplayState {
    /// Formatted status line (menu bar title)
    pub status: String,
    /// Drives the play/pause button
    pub is_playing: bool,
    /// Seek slider value in seconds
    pub position: f64,
    /// Seek slider upper bound in seconds
    pub duration: f64,
    /// Cover art URL, may be stale or empty
    pub artwork_url: String,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            status: STARTUP_STATUS.to_string(),
            is_playing: false,
            position: 0.0,
            duration: 0.0,
            artwork_url: String::new(),
        }
    }
}

/// One reply of the combined metadata query
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TrackInfo {
    pub name: String,
    pub artist: String,
    pub duration: f64,
    pub position: f64,
    pub album: String,
}

impl TrackInfo {
    /// Parse `name\nartist\nduration\nposition\nalbum`
    ///
    /// Empty fields are dropped before counting, so a blank reply or a track
    /// without an album is rejected. Numbers go through
    /// [`parse_leading_float`] and never fail.
    pub fn parse(raw: &str) -> Result<Self> {
        let fields: Vec<&str> = raw.split('\n').filter(|field| !field.is_empty()).collect();
        if fields.len() != METADATA_FIELDS {
            return Err(Error::FieldCount(fields.len()));
        }

        Ok(Self {
            name: fields[0].to_string(),
            artist: fields[1].to_string(),
            duration: parse_leading_float(fields[2]),
            position: parse_leading_float(fields[3]),
            album: fields[4].to_string(),
        })
    }

    /// Free-text query used to find cover art for this track
    pub fn artwork_query(&self) -> String {
        format!("{} - {} - {}", self.name, self.artist, self.album)
    }

    /// `Name - Artist (0:10 / 2:05)`
    pub fn status_line(&self) -> String {
        format!(
            "{} - {} ({} / {})",
            self.name,
            self.artist,
            format_timestamp(self.position),
            format_timestamp(self.duration)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_five_fields_in_order() {
        let info = TrackInfo::parse("Song\nArtist\n125.0\n10.0\nAlbum").unwrap();
        assert_eq!(
            info,
            TrackInfo {
                name: "Song".into(),
                artist: "Artist".into(),
                duration: 125.0,
                position: 10.0,
                album: "Album".into(),
            }
        );
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(matches!(
            TrackInfo::parse("Song\nArtist\n125.0\n10.0"),
            Err(Error::FieldCount(4))
        ));
        assert!(matches!(
            TrackInfo::parse("Song\nArtist\n125.0\n10.0\nAlbum\nExtra"),
            Err(Error::FieldCount(6))
        ));
        assert!(matches!(TrackInfo::parse(""), Err(Error::FieldCount(0))));
    }

    #[test]
    fn drops_empty_fields() {
        assert!(matches!(
            TrackInfo::parse("\n\n0\n0\n"),
            Err(Error::FieldCount(2))
        ));
        assert!(matches!(
            TrackInfo::parse("Song\nArtist\n125\n10\n"),
            Err(Error::FieldCount(4))
        ));

        let info = TrackInfo::parse("Song\n\nArtist\n125\n10\nAlbum\n").unwrap();
        assert_eq!(info.artist, "Artist");
        assert_eq!(info.album, "Album");
    }

    #[test]
    fn zeroes_bad_numbers() {
        let info = TrackInfo::parse("Song\nArtist\nmissing value\n3,5\nAlbum").unwrap();
        assert_eq!(info.duration, 0.0);
        assert_eq!(info.position, 3.5);
    }

    #[test]
    fn status_line_and_query() {
        let info = TrackInfo::parse("Song\nArtist\n125.0\n10.0\nAlbum").unwrap();
        assert_eq!(info.status_line(), "Song - Artist (0:10 / 2:05)");
        assert_eq!(info.artwork_query(), "Song - Artist - Album");
    }

    #[test]
    fn only_exact_token_means_playing() {
        assert!(is_playing_token("kPSP"));
        assert!(!is_playing_token("kPSp"));
        assert!(!is_playing_token("kPSS"));
        assert!(!is_playing_token(""));
        assert!(!is_playing_token("kPSP\n"));
    }

    #[test]
    fn idle_sentinels() {
        assert!(is_idle_sentinel(STARTUP_STATUS));
        assert!(is_idle_sentinel(NOT_RUNNING_STATUS));
        assert!(!is_idle_sentinel(NOTHING_PLAYING_STATUS));
        assert!(!is_idle_sentinel("Song - Artist (0:10 / 2:05)"));
    }
}
