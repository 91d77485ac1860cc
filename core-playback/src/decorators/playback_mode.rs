use crate::events::PlayerEventStream;
use crate::playback_mode::PlaybackModeController;
use crate::player::MediaPlayer;
use crate::state::{PlaybackMode, PlaybackState};
use async_trait::async_trait;
use core_async::sync::watch;
use core_library::Track;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Adds a [`PlaybackModeController`] to a player.
///
/// Next/previous queries use the inner player's current track for
/// `RepeatOne`; the playlist is supplied by the caller.
pub struct PlaybackModePlayer<P> {
    inner: P,
    mode: Arc<PlaybackModeController>,
    released: AtomicBool,
}

impl<P: MediaPlayer> PlaybackModePlayer<P> {
    pub fn new(inner: P) -> Self {
        Self::with_controller(inner, Arc::new(PlaybackModeController::new()))
    }

    pub fn with_controller(inner: P, mode: Arc<PlaybackModeController>) -> Self {
        Self {
            inner,
            mode,
            released: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn controller(&self) -> &Arc<PlaybackModeController> {
        &self.mode
    }

    pub fn set_playback_mode(&self, mode: PlaybackMode) {
        self.mode.set_playback_mode(mode);
    }

    pub fn playback_mode(&self) -> PlaybackMode {
        self.mode.playback_mode()
    }

    pub fn subscribe_mode(&self) -> watch::Receiver<PlaybackMode> {
        self.mode.subscribe()
    }

    pub fn reshuffle(&self) {
        self.mode.reshuffle();
    }

    pub fn get_next_track(&self, playlist: &[Track], current_index: Option<usize>) -> Option<Track> {
        let current = self.inner.current_track();
        self.mode
            .get_next_track(current.as_ref(), playlist, current_index)
    }

    pub fn get_previous_track(
        &self,
        playlist: &[Track],
        current_index: Option<usize>,
    ) -> Option<Track> {
        let current = self.inner.current_track();
        self.mode
            .get_previous_track(current.as_ref(), playlist, current_index)
    }
}

#[async_trait]
impl<P: MediaPlayer> MediaPlayer for PlaybackModePlayer<P> {
    fn playback_state(&self) -> PlaybackState {
        self.inner.playback_state()
    }

    fn current_position(&self) -> u64 {
        self.inner.current_position()
    }

    fn duration(&self) -> u64 {
        self.inner.duration()
    }

    fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    fn current_track(&self) -> Option<Track> {
        self.inner.current_track()
    }

    fn subscribe(&self) -> PlayerEventStream {
        self.inner.subscribe()
    }

    async fn play_track(&self, track: Track) {
        self.inner.play_track(track).await
    }

    async fn pause(&self) {
        self.inner.pause().await
    }

    async fn resume(&self) {
        self.inner.resume().await
    }

    async fn stop(&self) {
        self.inner.stop().await
    }

    async fn seek_to(&self, position_ms: u64) {
        self.inner.seek_to(position_ms).await
    }

    async fn set_volume(&self, volume: f32) {
        self.inner.set_volume(volume).await
    }

    async fn set_playback_speed(&self, speed: f32) {
        self.inner.set_playback_speed(speed).await
    }

    async fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("Releasing playback mode layer");
        self.inner.release().await;
        self.mode.release();
    }

    async fn set_playlist(&self, tracks: Vec<Track>, start_index: usize) {
        self.inner.set_playlist(tracks, start_index).await
    }

    async fn skip_to_next(&self) {
        self.inner.skip_to_next().await
    }

    async fn skip_to_previous(&self) {
        self.inner.skip_to_previous().await
    }
}
