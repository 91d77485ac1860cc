use crate::events::PlayerEventStream;
use crate::player::MediaPlayer;
use crate::playlist::{Playlist, PlaylistSnapshot};
use crate::state::PlaybackState;
use async_trait::async_trait;
use core_async::sync::watch;
use core_library::Track;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Adds a [`Playlist`] to a player.
///
/// `play_track` also selects the played track in the playlist.
pub struct PlaylistPlayer<P> {
    inner: P,
    playlist: Arc<Playlist>,
    released: AtomicBool,
}

impl<P: MediaPlayer> PlaylistPlayer<P> {
    pub fn new(inner: P) -> Self {
        Self::with_playlist(inner, Arc::new(Playlist::new()))
    }

    pub fn with_playlist(inner: P, playlist: Arc<Playlist>) -> Self {
        Self {
            inner,
            playlist,
            released: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn playlist(&self) -> &Arc<Playlist> {
        &self.playlist
    }

    pub fn add_track(&self, track: Track, position: Option<usize>) {
        self.playlist.add_track(track, position);
    }

    pub fn add_tracks(&self, tracks: Vec<Track>, position: Option<usize>) {
        self.playlist.add_tracks(tracks, position);
    }

    pub fn remove_track(&self, id: &str) -> Option<Track> {
        self.playlist.remove_track(id)
    }

    pub fn move_track(&self, from: usize, to: usize) -> bool {
        self.playlist.move_track(from, to)
    }

    pub fn clear_playlist(&self) {
        self.playlist.clear();
    }

    pub fn set_current_index(&self, index: Option<usize>) -> bool {
        self.playlist.set_current_index(index)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.playlist.current_index()
    }

    pub fn get_current_playlist(&self) -> Vec<Track> {
        self.playlist.tracks()
    }

    pub fn subscribe_playlist(&self) -> watch::Receiver<PlaylistSnapshot> {
        self.playlist.subscribe()
    }

    /// Play the entry after the current one. Returns the track played.
    pub async fn play_next(&self) -> Option<Track> {
        let next = self.playlist.next_track()?;
        self.play_track(next.clone()).await;
        Some(next)
    }

    /// Play the entry before the current one. Returns the track played.
    pub async fn play_previous(&self) -> Option<Track> {
        let previous = self.playlist.previous_track()?;
        self.play_track(previous.clone()).await;
        Some(previous)
    }
}

#[async_trait]
impl<P: MediaPlayer> MediaPlayer for PlaylistPlayer<P> {
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
        self.inner.play_track(track.clone()).await;
        self.playlist.set_current_track(&track);
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
        debug!("Releasing playlist layer");
        self.inner.release().await;
        self.playlist.release();
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EnginePlayer;
    use bridge_traits::MemoryEngine;
    use core_runtime::config::PlayerConfig;

    fn track(id: &str) -> Track {
        Track::new(id, format!("Song {id}"), "Artist", "Album", 1000, format!("mem://{id}"))
    }

    async fn player() -> PlaylistPlayer<EnginePlayer> {
        let engine = Arc::new(MemoryEngine::new());
        PlaylistPlayer::new(EnginePlayer::new(engine, PlayerConfig::default()).await)
    }

    #[tokio::test]
    async fn test_play_track_selects_entry() {
        let player = player().await;
        player.add_tracks(vec![track("1"), track("2"), track("3")], None);

        player.play_track(track("2")).await;

        assert_eq!(player.current_index(), Some(1));
        assert_eq!(player.current_track(), Some(track("2")));
    }

    #[tokio::test]
    async fn test_play_next_and_previous() {
        let player = player().await;
        player.add_tracks(vec![track("1"), track("2")], None);

        assert_eq!(player.play_next().await, Some(track("1")));
        assert_eq!(player.play_next().await, Some(track("2")));
        assert_eq!(player.play_next().await, None);
        assert_eq!(player.play_previous().await, Some(track("1")));
        assert_eq!(player.current_track(), Some(track("1")));
    }

    #[tokio::test]
    async fn test_release_twice() {
        let player = player().await;
        player.add_track(track("1"), None);

        player.release().await;
        player.release().await;

        assert!(player.get_current_playlist().is_empty());
        assert!(player.inner().is_released());
    }

    #[tokio::test]
    async fn test_released_player_stays_empty() {
        let player = player().await;
        player.add_track(track("1"), None);
        player.play_track(track("1")).await;
        assert_eq!(player.current_track(), Some(track("1")));

        player.release().await;
        player.add_track(track("2"), None);

        assert_eq!(player.get_current_playlist().len(), 0);
        assert_eq!(player.current_index(), None);
        assert_eq!(player.current_track(), None);
    }
}
