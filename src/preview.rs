//! Canned in-memory player used when `MUSIC_MENUBAR_PREVIEW=1`
//!
//! Lets the display host run on machines without Apple Music. It answers the
//! same scripts the real player does and keeps a fake clock running.

use std::env;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::player::ProcessProbe;
use crate::script::{self, ScriptRunner};
use crate::utils::parse_leading_float;

pub const PREVIEW_ENV: &str = "MUSIC_MENUBAR_PREVIEW";
pub const PREVIEW_BANNER: &str = "Preview mode: showing canned playback data, not Apple Music";

/// Whether the preview flag is set in the environment
pub fn is_preview() -> bool {
    env::var(PREVIEW_ENV).is_ok_and(|value| value == "1")
}

const TRACKS: &[(&str, &str, &str, f64)] = &[
    ("So What", "Miles Davis", "Kind of Blue", 562.0),
    ("Giant Steps", "John Coltrane", "Giant Steps", 286.0),
    ("Take Five", "The Dave Brubeck Quartet", "Time Out", 324.0),
];

struct PreviewState {
    track: usize,
    position: f64,
    playing: bool,
    last_update: Instant,
}

impl PreviewState {
    fn advance(&mut self) {
        let now = Instant::now();
        if self.playing {
            self.position += now.duration_since(self.last_update).as_secs_f64();
        }
        self.last_update = now;

        let duration = self.duration();
        if self.position >= duration {
            self.track = (self.track + 1) % TRACKS.len();
            self.position = (self.position - duration) % self.duration();
        }
    }

    fn duration(&self) -> f64 {
        TRACKS[self.track].3
    }
}

pub struct PreviewMusic {
    app_name: String,
    state: Mutex<PreviewState>,
}

impl PreviewMusic {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            state: Mutex::new(PreviewState {
                track: 0,
                position: 0.0,
                playing: true,
                last_update: Instant::now(),
            }),
        }
    }
}

#[async_trait]
impl ScriptRunner for PreviewMusic {
    async fn run(&self, source: &str) -> Result<String> {
        let app = &self.app_name;
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.advance();

        if source == script::player_state_script(app) {
            return Ok(if state.playing { "kPSP" } else { "kPSp" }.to_string());
        }
        if source == script::current_track_script(app) {
            let (name, artist, album, duration) = TRACKS[state.track];
            return Ok(format!(
                "{name}\n{artist}\n{duration}\n{}\n{album}",
                state.position
            ));
        }
        if source == script::play_pause_script(app) {
            state.playing = !state.playing;
        } else if source == script::next_track_script(app) {
            state.track = (state.track + 1) % TRACKS.len();
            state.position = 0.0;
        } else if source == script::previous_track_script(app) {
            state.track = (state.track + TRACKS.len() - 1) % TRACKS.len();
            state.position = 0.0;
        } else if let Some(target) = source.strip_prefix(script::seek_prefix(app).as_str()) {
            // Seeking to the end rolls over to the next track
            state.position = parse_leading_float(target).clamp(0.0, state.duration());
        } else {
            return Err(Error::script("preview player does not understand this script"));
        }
        Ok(String::new())
    }
}

impl ProcessProbe for PreviewMusic {
    fn is_running(&self, _name: &str) -> bool {
        true
    }
}
