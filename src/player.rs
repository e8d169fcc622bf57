use std::sync::{Arc, Mutex};

use log::debug;
use sysinfo::{ProcessesToUpdate, System};

use crate::error::{Error, Result};
use crate::script::{self, ScriptRunner};

/// Answers whether a process with the given name is alive
pub trait ProcessProbe: Send + Sync {
    fn is_running(&self, name: &str) -> bool;
}

/// Process table lookup backed by `sysinfo`
///
/// Keeps one `System` around to avoid re-initialization on every tick.
pub struct SysinfoProbe {
    system: Mutex<System>,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessProbe for SysinfoProbe {
    fn is_running(&self, name: &str) -> bool {
        let Ok(mut sys) = self.system.lock() else {
            return false;
        };
        sys.refresh_processes(ProcessesToUpdate::All, true);
        sys.processes().values().any(|p| p.name() == name)
    }
}

/// Scripting bridge to a single media player application
#[derive(Clone)]
pub struct MusicPlayer {
    runner: Arc<dyn ScriptRunner>,
    probe: Arc<dyn ProcessProbe>,
    app_name: String,
    process_name: String,
}

impl MusicPlayer {
    pub fn new(
        runner: Arc<dyn ScriptRunner>,
        probe: Arc<dyn ProcessProbe>,
        app_name: impl Into<String>,
        process_name: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            probe,
            app_name: app_name.into(),
            process_name: process_name.into(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Whether the player process is alive. The probe runs on the blocking pool.
    pub async fn is_running(&self) -> bool {
        let probe = Arc::clone(&self.probe);
        let name = self.process_name.clone();
        match tokio::task::spawn_blocking(move || probe.is_running(&name)).await {
            Ok(running) => running,
            Err(e) => {
                debug!("process probe panicked: {e}");
                false
            }
        }
    }

    /// Raw run-state token, e.g. `kPSP`
    pub async fn player_state(&self) -> Result<String> {
        self.runner
            .run(&script::player_state_script(&self.app_name))
            .await
    }

    /// Raw combined metadata reply, see [`crate::models::TrackInfo::parse`]
    pub async fn current_track(&self) -> Result<String> {
        self.runner
            .run(&script::current_track_script(&self.app_name))
            .await
    }

    pub async fn play_pause(&self) -> Result<()> {
        self.send(script::play_pause_script(&self.app_name)).await
    }

    pub async fn previous_track(&self) -> Result<()> {
        self.send(script::previous_track_script(&self.app_name)).await
    }

    pub async fn next_track(&self) -> Result<()> {
        self.send(script::next_track_script(&self.app_name)).await
    }

    /// Seek to an absolute position in seconds
    pub async fn seek(&self, position: f64) -> Result<()> {
        if !position.is_finite() {
            return Err(Error::InvalidSeek(position));
        }
        self.send(script::seek_script(&self.app_name, position)).await
    }

    async fn send(&self, source: String) -> Result<()> {
        self.runner.run(&source).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Default)]
    struct RecordingRunner {
        scripts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ScriptRunner for RecordingRunner {
        async fn run(&self, source: &str) -> Result<String> {
            self.scripts.lock().unwrap().push(source.to_string());
            Ok(String::new())
        }
    }

    struct FixedProbe(bool);

    impl ProcessProbe for FixedProbe {
        fn is_running(&self, _name: &str) -> bool {
            self.0
        }
    }

    fn player(runner: Arc<RecordingRunner>, running: bool) -> MusicPlayer {
        MusicPlayer::new(runner, Arc::new(FixedProbe(running)), "Music", "Music")
    }

    #[tokio::test]
    async fn controls_send_one_script_each() {
        let runner = Arc::new(RecordingRunner::default());
        let player = player(runner.clone(), true);

        player.play_pause().await.unwrap();
        player.previous_track().await.unwrap();
        player.next_track().await.unwrap();
        player.seek(12.5).await.unwrap();

        let scripts = runner.scripts.lock().unwrap();
        assert_eq!(
            *scripts,
            vec![
                script::play_pause_script("Music"),
                script::previous_track_script("Music"),
                script::next_track_script("Music"),
                script::seek_script("Music", 12.5),
            ]
        );
    }

    #[tokio::test]
    async fn non_finite_seek_is_rejected_locally() {
        let runner = Arc::new(RecordingRunner::default());
        let player = player(runner.clone(), true);

        assert!(matches!(
            player.seek(f64::NAN).await,
            Err(Error::InvalidSeek(_))
        ));
        assert!(player.seek(f64::INFINITY).await.is_err());
        assert!(runner.scripts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn run_state_comes_from_probe() {
        let runner = Arc::new(RecordingRunner::default());
        assert!(player(runner.clone(), true).is_running().await);
        assert!(!player(runner, false).is_running().await);
    }

    #[test]
    fn sysinfo_probe_does_not_find_bogus_process() {
        let probe = SysinfoProbe::new();
        assert!(!probe.is_running("definitely-not-a-real-process-name"));
    }
}
