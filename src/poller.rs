//! Playback status poller
//!
//! Every tick walks the same steps: is the player alive, is it playing, what
//! is the current track. The result is folded into a [`DisplayState`] that is
//! published through a `watch` channel, so renderers only ever see complete
//! states. Cover art is looked up in the background whenever the track name
//! changes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, trace, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::artwork::ArtworkLookup;
use crate::models::{
    is_idle_sentinel, is_playing_token, DisplayState, PlaybackSnapshot, TrackInfo,
    NOTHING_PLAYING_STATUS, NOT_RUNNING_STATUS,
};
use crate::player::MusicPlayer;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct PollerOptions {
    /// Time between two ticks
    pub interval: Duration,
    /// Drop artwork results that arrive after a newer lookup was issued.
    /// When false, whichever lookup completes last wins.
    pub discard_stale_artwork: bool,
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            discard_stale_artwork: true,
        }
    }
}

/// How a single tick ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Player process not found
    NotRunning,
    /// Player alive but paused or stopped
    NotPlaying,
    /// Metadata query failed or was malformed
    MetadataUnavailable,
    /// Player reported a blank track name, nothing published
    AwaitingTrackName,
    /// A fresh status line was published
    Published,
}

struct Shared {
    player: MusicPlayer,
    artwork: Arc<dyn ArtworkLookup>,
    display: watch::Sender<DisplayState>,
    snapshot: Mutex<PlaybackSnapshot>,
    /// Sequence number of the latest artwork lookup issued
    artwork_seq: AtomicU64,
    discard_stale_artwork: bool,
}

/// Owns the polling task and the published display state
pub struct StatusPoller {
    shared: Arc<Shared>,
    interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StatusPoller {
    pub fn new(player: MusicPlayer, artwork: Arc<dyn ArtworkLookup>, options: PollerOptions) -> Self {
        let (display, _) = watch::channel(DisplayState::default());
        Self {
            shared: Arc::new(Shared {
                player,
                artwork,
                display,
                snapshot: Mutex::new(PlaybackSnapshot::default()),
                artwork_seq: AtomicU64::new(0),
                discard_stale_artwork: options.discard_stale_artwork,
            }),
            // tokio intervals panic on a zero period
            interval: options.interval.max(Duration::from_millis(1)),
            task: Mutex::new(None),
        }
    }

    /// Observe display updates
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.shared.display.subscribe()
    }

    /// Current display state
    pub fn display(&self) -> DisplayState {
        self.shared.display.borrow().clone()
    }

    /// Last known player state
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.shared.snapshot().clone()
    }

    /// Number of artwork lookups issued so far
    pub fn artwork_requests(&self) -> u64 {
        self.shared.artwork_seq.load(Ordering::SeqCst)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling. Calling it while already started does nothing.
    pub fn start(&self) {
        let mut task = lock(&self.task);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let period = self.interval;
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let outcome = shared.tick().await;
                trace!("poll tick: {outcome:?}");
            }
        }));
        info!("status poller started, polling every {} ms", period.as_millis());
    }

    /// Stop polling. In-flight artwork lookups still complete.
    pub fn stop(&self) {
        if let Some(handle) = lock(&self.task).take() {
            handle.abort();
            info!("status poller stopped");
        }
    }

    pub fn is_started(&self) -> bool {
        lock(&self.task)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Run one poll cycle now
    pub async fn tick(&self) -> TickOutcome {
        self.shared.tick().await
    }

    /// Toggle play/pause; the playing flag flips right away
    pub async fn play_pause(&self) {
        let mut playing = false;
        self.shared.display.send_modify(|display| {
            display.is_playing = !display.is_playing;
            playing = display.is_playing;
        });
        self.shared.snapshot().is_playing = playing;

        if let Err(e) = self.shared.player.play_pause().await {
            debug!("play/pause failed: {e}");
        }
    }

    pub async fn previous_track(&self) {
        if let Err(e) = self.shared.player.previous_track().await {
            debug!("previous track failed: {e}");
        }
    }

    pub async fn next_track(&self) {
        if let Err(e) = self.shared.player.next_track().await {
            debug!("next track failed: {e}");
        }
    }

    /// Seek to `position` seconds; the local position moves right away
    pub async fn seek(&self, position: f64) {
        if !position.is_finite() {
            warn!("ignoring seek to {position}");
            return;
        }

        self.shared
            .display
            .send_modify(|display| display.position = position);
        self.shared.snapshot().position_seconds = position;

        if let Err(e) = self.shared.player.seek(position).await {
            debug!("seek failed: {e}");
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.task).take() {
            handle.abort();
        }
    }
}

impl Shared {
    fn snapshot(&self) -> MutexGuard<'_, PlaybackSnapshot> {
        lock(&self.snapshot)
    }

    async fn tick(self: &Arc<Self>) -> TickOutcome {
        if !self.player.is_running().await {
            self.snapshot().is_running = false;
            self.display.send_if_modified(|display| {
                replace(&mut display.status, NOT_RUNNING_STATUS)
            });
            return TickOutcome::NotRunning;
        }
        self.snapshot().is_running = true;

        // A failed query keeps the previous flag
        match self.player.player_state().await {
            Ok(token) => {
                let playing = is_playing_token(&token);
                self.snapshot().is_playing = playing;
                self.display.send_if_modified(|display| {
                    let changed = display.is_playing != playing;
                    display.is_playing = playing;
                    changed
                });
            }
            Err(e) => debug!("player state query failed: {e}"),
        }

        let playing = self.display.borrow().is_playing;
        if !playing {
            self.display.send_if_modified(|display| {
                is_idle_sentinel(&display.status)
                    && replace(&mut display.status, NOTHING_PLAYING_STATUS)
            });
            return TickOutcome::NotPlaying;
        }

        let raw = match self.player.current_track().await {
            Ok(raw) => raw,
            Err(e) => {
                debug!("track query failed: {e}");
                return TickOutcome::MetadataUnavailable;
            }
        };
        let track = match TrackInfo::parse(&raw) {
            Ok(track) => track,
            Err(e) => {
                debug!("ignoring track metadata: {e}");
                return TickOutcome::MetadataUnavailable;
            }
        };

        let changed = {
            let mut snapshot = self.snapshot();
            let changed = snapshot.track_name != track.name;
            snapshot.track_name = track.name.clone();
            snapshot.artist_name = track.artist.clone();
            snapshot.album_name = track.album.clone();
            snapshot.duration_seconds = track.duration;
            snapshot.position_seconds = track.position;
            changed
        };
        if changed {
            self.spawn_artwork_lookup(track.artwork_query());
        }

        // Music can report blank metadata right after launch
        if track.name.trim().is_empty() {
            return TickOutcome::AwaitingTrackName;
        }

        let status = track.status_line();
        self.display.send_modify(|display| {
            display.status = status;
            display.position = track.position;
            display.duration = track.duration;
        });
        TickOutcome::Published
    }

    fn spawn_artwork_lookup(self: &Arc<Self>, query: String) {
        let seq = self.artwork_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            match shared.artwork.lookup(&query).await {
                Ok(Some(url)) => {
                    shared.apply_artwork(seq, url);
                }
                Ok(None) => debug!("no artwork for {query:?}"),
                Err(e) => debug!("artwork lookup for {query:?} failed: {e}"),
            }
        });
    }

    fn apply_artwork(&self, seq: u64, url: String) -> bool {
        if self.discard_stale_artwork && seq < self.artwork_seq.load(Ordering::SeqCst) {
            debug!("discarding stale artwork #{seq}");
            return false;
        }

        self.snapshot().artwork_url = url.clone();
        self.display.send_modify(|display| display.artwork_url = url);
        true
    }
}

/// Overwrite `slot` with `value`, reporting whether it changed
fn replace(slot: &mut String, value: &str) -> bool {
    if slot == value {
        return false;
    }
    *slot = value.to_string();
    true
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
