//! # Player Stack
//!
//! Typed assembly of the decorator stack.
//!
//! ```text
//!   MultiAudioPlayer          (outermost, optional)
//!     └─ PlaybackModePlayer   (optional)
//!          └─ PlaylistPlayer  (optional)
//!               └─ base player
//! ```
//!
//! [`PlayerStack`] keeps a handle to each component that was requested, so
//! callers reach the extra surfaces through [`PlayerStack::playlist`],
//! [`PlayerStack::playback_mode`] and [`PlayerStack::multi_audio`] instead of
//! guessing which decorator they hold.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bridge_traits::MemoryEngine;
//! use core_playback::{EnginePlayer, MediaPlayer, PlaybackMode, PlayerStack};
//! use core_runtime::config::PlayerConfig;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let base = EnginePlayer::new(Arc::new(MemoryEngine::new()), PlayerConfig::default()).await;
//! let stack = PlayerStack::builder(base)
//!     .with_playlist()
//!     .with_playback_mode()
//!     .build()
//!     .await;
//!
//! if let Some(mode) = stack.playback_mode() {
//!     mode.set_playback_mode(PlaybackMode::Shuffle);
//! }
//! stack.play_next().await;
//! stack.release().await;
//! # }
//! ```

use crate::decorators::{MultiAudioPlayer, PlaybackModePlayer, PlaylistPlayer};
use crate::events::PlayerEventStream;
use crate::multi_audio::MultiAudioRegistry;
use crate::playback_mode::PlaybackModeController;
use crate::player::{MediaPlayer, SharedPlayer};
use crate::playlist::{Playlist, PlaylistObserver};
use crate::sequencing::Sequencer;
use crate::state::{PlaybackMode, PlaybackState};
use async_trait::async_trait;
use core_library::Track;
use core_runtime::config::{PlayerConfig, ShuffleRegeneration};
use std::sync::Arc;
use tracing::debug;

/// Builder for [`PlayerStack`].
pub struct PlayerStackBuilder {
    base: SharedPlayer,
    playlist: bool,
    playback_mode: bool,
    multi_audio: bool,
    initial_mode: PlaybackMode,
    regeneration: ShuffleRegeneration,
    shuffle_seed: Option<u64>,
}

impl PlayerStackBuilder {
    pub fn with_playlist(mut self) -> Self {
        self.playlist = true;
        self
    }

    pub fn with_playback_mode(mut self) -> Self {
        self.playback_mode = true;
        self
    }

    pub fn with_multi_audio(mut self) -> Self {
        self.multi_audio = true;
        self
    }

    /// Take the initial mode and shuffle regeneration policy from `config`.
    pub fn with_config(mut self, config: &PlayerConfig) -> Self {
        self.initial_mode = PlaybackMode::from_config(config);
        self.regeneration = config.shuffle_regeneration;
        self
    }

    pub fn initial_mode(mut self, mode: PlaybackMode) -> Self {
        self.initial_mode = mode;
        self
    }

    /// Seed the shuffle generator for reproducible orders.
    pub fn shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub async fn build(self) -> PlayerStack {
        let mut player = self.base;

        let playlist = self.playlist.then(|| Arc::new(Playlist::new()));
        if let Some(playlist) = &playlist {
            player = Arc::new(PlaylistPlayer::with_playlist(player, Arc::clone(playlist)));
        }

        let playback_mode = self.playback_mode.then(|| {
            let sequencer = match self.shuffle_seed {
                Some(seed) => Sequencer::with_seed(seed),
                None => Sequencer::new(),
            };
            let controller = Arc::new(PlaybackModeController::with_sequencer(
                sequencer,
                self.regeneration,
            ));
            controller.set_playback_mode(self.initial_mode);
            controller
        });
        if let Some(controller) = &playback_mode {
            player = Arc::new(PlaybackModePlayer::with_controller(
                player,
                Arc::clone(controller),
            ));
            if let Some(playlist) = &playlist {
                playlist.add_observer(Arc::clone(controller) as Arc<dyn PlaylistObserver>);
            }
        }

        let multi_audio = if self.multi_audio {
            let registry = Arc::new(MultiAudioRegistry::new());
            player = Arc::new(MultiAudioPlayer::with_registry(player, Arc::clone(&registry)).await);
            Some(registry)
        } else {
            None
        };

        debug!(
            playlist = playlist.is_some(),
            playback_mode = playback_mode.is_some(),
            multi_audio = multi_audio.is_some(),
            "Player stack assembled"
        );

        PlayerStack {
            player,
            playlist,
            playback_mode,
            multi_audio,
        }
    }
}

/// A base player plus the decorators requested from [`PlayerStackBuilder`].
pub struct PlayerStack {
    player: SharedPlayer,
    playlist: Option<Arc<Playlist>>,
    playback_mode: Option<Arc<PlaybackModeController>>,
    multi_audio: Option<Arc<MultiAudioRegistry>>,
}

impl PlayerStack {
    pub fn builder<P: MediaPlayer + 'static>(base: P) -> PlayerStackBuilder {
        PlayerStackBuilder {
            base: Arc::new(base),
            playlist: false,
            playback_mode: false,
            multi_audio: false,
            initial_mode: PlaybackMode::Normal,
            regeneration: ShuffleRegeneration::default(),
            shuffle_seed: None,
        }
    }

    /// Outermost layer.
    pub fn player(&self) -> &SharedPlayer {
        &self.player
    }

    pub fn playlist(&self) -> Option<&Arc<Playlist>> {
        self.playlist.as_ref()
    }

    pub fn playback_mode(&self) -> Option<&Arc<PlaybackModeController>> {
        self.playback_mode.as_ref()
    }

    pub fn multi_audio(&self) -> Option<&Arc<MultiAudioRegistry>> {
        self.multi_audio.as_ref()
    }

    /// Play the track after the current one.
    ///
    /// Uses the playback mode when present and playlist order otherwise.
    /// Returns `None`, without touching the player, when there is no playlist
    /// or nothing comes next.
    pub async fn play_next(&self) -> Option<Track> {
        let next = self.pick(true)?;
        self.player.play_track(next.clone()).await;
        Some(next)
    }

    /// Mirror of [`PlayerStack::play_next`].
    pub async fn play_previous(&self) -> Option<Track> {
        let previous = self.pick(false)?;
        self.player.play_track(previous.clone()).await;
        Some(previous)
    }

    fn pick(&self, forward: bool) -> Option<Track> {
        let playlist = self.playlist.as_ref()?;
        let snapshot = playlist.snapshot();

        match &self.playback_mode {
            Some(mode) => {
                let current = self.player.current_track();
                if forward {
                    mode.get_next_track(current.as_ref(), &snapshot.tracks, snapshot.current_index)
                } else {
                    mode.get_previous_track(
                        current.as_ref(),
                        &snapshot.tracks,
                        snapshot.current_index,
                    )
                }
            }
            None if forward => playlist.next_track(),
            None => playlist.previous_track(),
        }
    }
}

impl std::fmt::Debug for PlayerStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerStack")
            .field("playlist", &self.playlist)
            .field("playback_mode", &self.playback_mode)
            .field("multi_audio", &self.multi_audio)
            .finish()
    }
}

#[async_trait]
impl MediaPlayer for PlayerStack {
    fn playback_state(&self) -> PlaybackState {
        self.player.playback_state()
    }

    fn current_position(&self) -> u64 {
        self.player.current_position()
    }

    fn duration(&self) -> u64 {
        self.player.duration()
    }

    fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    fn current_track(&self) -> Option<Track> {
        self.player.current_track()
    }

    fn subscribe(&self) -> PlayerEventStream {
        self.player.subscribe()
    }

    async fn play_track(&self, track: Track) {
        self.player.play_track(track).await
    }

    async fn pause(&self) {
        self.player.pause().await
    }

    async fn resume(&self) {
        self.player.resume().await
    }

    async fn stop(&self) {
        self.player.stop().await
    }

    async fn seek_to(&self, position_ms: u64) {
        self.player.seek_to(position_ms).await
    }

    async fn set_volume(&self, volume: f32) {
        self.player.set_volume(volume).await
    }

    async fn set_playback_speed(&self, speed: f32) {
        self.player.set_playback_speed(speed).await
    }

    async fn release(&self) {
        self.player.release().await
    }

    async fn set_playlist(&self, tracks: Vec<Track>, start_index: usize) {
        self.player.set_playlist(tracks, start_index).await
    }

    async fn skip_to_next(&self) {
        self.player.skip_to_next().await
    }

    async fn skip_to_previous(&self) {
        self.player.skip_to_previous().await
    }
}
