use crate::error::Result;
use crate::events::PlayerEventStream;
use crate::multi_audio::{MultiAudioRegistry, PlayerId};
use crate::player::{MediaPlayer, SharedPlayer};
use crate::state::PlaybackState;
use async_trait::async_trait;
use core_library::Track;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Adds a [`MultiAudioRegistry`] to a player.
///
/// The wrapped player is registered as the main player. The base contract
/// still targets the wrapped player only; sub-players are driven through the
/// targeted and aggregate operations. Releasing the decorator releases the
/// registry and with it every registered player.
pub struct MultiAudioPlayer<P> {
    inner: Arc<P>,
    registry: Arc<MultiAudioRegistry>,
    released: AtomicBool,
}

impl<P: MediaPlayer + 'static> MultiAudioPlayer<P> {
    pub async fn new(inner: P) -> Self {
        Self::with_registry(inner, Arc::new(MultiAudioRegistry::new())).await
    }

    pub async fn with_registry(inner: P, registry: Arc<MultiAudioRegistry>) -> Self {
        let inner = Arc::new(inner);
        registry
            .set_main_player(Arc::clone(&inner) as SharedPlayer)
            .await;
        Self {
            inner,
            registry,
            released: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn registry(&self) -> &Arc<MultiAudioRegistry> {
        &self.registry
    }

    /// # Errors
    ///
    /// Rejects the reserved name `"main"`.
    pub async fn add_sub_player(&self, name: impl Into<String>, player: SharedPlayer) -> Result<()> {
        self.registry.add_sub_player(name, player).await
    }

    pub async fn remove_sub_player(&self, name: &str) -> bool {
        self.registry.remove_sub_player(name).await
    }

    pub fn set_active_player(&self, id: Option<PlayerId>) -> bool {
        self.registry.set_active_player(id)
    }

    pub fn active_player_id(&self) -> Option<PlayerId> {
        self.registry.active_player_id()
    }

    pub fn get_player(&self, id: &PlayerId) -> Option<SharedPlayer> {
        self.registry.get_player(id)
    }

    pub async fn play_track_on_player(&self, id: &PlayerId, track: Track) -> bool {
        self.registry.play_track_on_player(id, track).await
    }

    pub async fn pause_player(&self, id: &PlayerId) -> bool {
        self.registry.pause_player(id).await
    }

    pub async fn resume_player(&self, id: &PlayerId) -> bool {
        self.registry.resume_player(id).await
    }

    pub async fn stop_player(&self, id: &PlayerId) -> bool {
        self.registry.stop_player(id).await
    }

    pub async fn set_player_volume(&self, id: &PlayerId, volume: f32) -> bool {
        self.registry.set_player_volume(id, volume).await
    }

    pub async fn set_player_speed(&self, id: &PlayerId, speed: f32) -> bool {
        self.registry.set_player_speed(id, speed).await
    }

    pub async fn seek_player_to(&self, id: &PlayerId, position_ms: u64) -> bool {
        self.registry.seek_player_to(id, position_ms).await
    }

    pub async fn pause_all(&self) {
        self.registry.pause_all().await;
    }

    pub async fn stop_all(&self) {
        self.registry.stop_all().await;
    }

    pub async fn set_volume_for_all(&self, volume: f32) {
        self.registry.set_volume_for_all(volume).await;
    }

    pub async fn set_playback_speed_for_all(&self, speed: f32) {
        self.registry.set_playback_speed_for_all(speed).await;
    }
}

#[async_trait]
impl<P: MediaPlayer + 'static> MediaPlayer for MultiAudioPlayer<P> {
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
        debug!("Releasing multi-audio layer");
        // The inner player is the registry's main player, or was released
        // when it was replaced.
        self.registry.release().await;
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
    use bridge_traits::{EngineCommand, MemoryEngine};
    use core_runtime::config::PlayerConfig;

    fn track(id: &str) -> Track {
        Track::new(id, format!("Song {id}"), "Artist", "Album", 1000, format!("mem://{id}"))
    }

    async fn engine_player(engine: &Arc<MemoryEngine>) -> EnginePlayer {
        EnginePlayer::new(engine.clone(), PlayerConfig::default()).await
    }

    #[tokio::test]
    async fn test_wrapped_player_is_main() {
        let engine = Arc::new(MemoryEngine::new());
        let player = MultiAudioPlayer::new(engine_player(&engine).await).await;

        assert_eq!(player.active_player_id(), Some(PlayerId::Main));
        assert!(player.registry().has_main_player());

        player.play_track(track("1")).await;
        assert_eq!(engine.loaded_uri().as_deref(), Some("mem://1"));
    }

    #[tokio::test]
    async fn test_sub_player_targeting() {
        let main_engine = Arc::new(MemoryEngine::new());
        let bg_engine = Arc::new(MemoryEngine::new());
        let player = MultiAudioPlayer::new(engine_player(&main_engine).await).await;
        player
            .add_sub_player("bg", Arc::new(engine_player(&bg_engine).await))
            .await
            .unwrap();

        let bg = PlayerId::parse("bg");
        assert!(player.play_track_on_player(&bg, track("x")).await);
        assert!(player.set_player_volume(&bg, 0.3).await);

        assert_eq!(player.active_player_id(), Some(bg));
        assert_eq!(bg_engine.loaded_uri().as_deref(), Some("mem://x"));
        assert_eq!(bg_engine.volume(), 0.3);
        assert!(main_engine.loaded_uri().is_none());
    }

    #[tokio::test]
    async fn test_targeted_controls_reach_only_the_target() {
        let main_engine = Arc::new(MemoryEngine::new());
        let bg_engine = Arc::new(MemoryEngine::new());
        let player = MultiAudioPlayer::new(engine_player(&main_engine).await).await;
        player
            .add_sub_player("bg", Arc::new(engine_player(&bg_engine).await))
            .await
            .unwrap();
        let bg = PlayerId::parse("bg");
        assert!(player.play_track_on_player(&bg, track("x")).await);

        assert!(player.pause_player(&bg).await);
        assert!(player.resume_player(&bg).await);
        assert!(player.set_player_speed(&bg, 1.5).await);
        assert!(player.seek_player_to(&bg, 500).await);
        assert!(player.stop_player(&bg).await);

        let commands = bg_engine.commands();
        for expected in [
            EngineCommand::Pause,
            EngineCommand::Resume,
            EngineCommand::SetSpeed(1.5),
            EngineCommand::Seek(500),
            EngineCommand::Stop,
        ] {
            assert!(commands.contains(&expected), "missing {expected:?}");
        }
        assert!(!main_engine.commands().iter().any(|c| matches!(
            c,
            EngineCommand::Pause | EngineCommand::Stop | EngineCommand::Seek(_)
        )));

        let missing = PlayerId::parse("missing");
        assert!(!player.pause_player(&missing).await);
        assert!(!player.resume_player(&missing).await);
        assert!(!player.stop_player(&missing).await);
        assert!(!player.set_player_speed(&missing, 1.0).await);
        assert!(!player.seek_player_to(&missing, 0).await);
    }

    #[tokio::test]
    async fn test_release_releases_every_player_once() {
        let main_engine = Arc::new(MemoryEngine::new());
        let fx_engine = Arc::new(MemoryEngine::new());
        let player = MultiAudioPlayer::new(engine_player(&main_engine).await).await;
        player
            .add_sub_player("fx", Arc::new(engine_player(&fx_engine).await))
            .await
            .unwrap();

        player.release().await;
        player.release().await;

        for engine in [&main_engine, &fx_engine] {
            let releases = engine
                .commands()
                .into_iter()
                .filter(|c| *c == EngineCommand::Release)
                .count();
            assert_eq!(releases, 1);
        }
        assert_eq!(player.registry().player_count(), 0);
    }
}
