//! Forwarding tests for the decorators
//!
//! Each decorator is wrapped around a mocked player and must hand every base
//! operation to it unchanged, exactly once.

use async_trait::async_trait;
use core_playback::{
    MediaPlayer, MultiAudioPlayer, PlaybackMode, PlaybackModePlayer, PlaybackState,
    PlayerEvent, PlayerEventBus, PlayerEventStream, PlaylistPlayer, Track,
};
use mockall::mock;
use mockall::predicate::eq;
use std::sync::Arc;

mock! {
    pub Inner {}

    #[async_trait]
    impl MediaPlayer for Inner {
        fn playback_state(&self) -> PlaybackState;
        fn current_position(&self) -> u64;
        fn duration(&self) -> u64;
        fn is_playing(&self) -> bool;
        fn current_track(&self) -> Option<Track>;
        fn subscribe(&self) -> PlayerEventStream;
        async fn play_track(&self, track: Track);
        async fn pause(&self);
        async fn resume(&self);
        async fn stop(&self);
        async fn seek_to(&self, position_ms: u64);
        async fn set_volume(&self, volume: f32);
        async fn set_playback_speed(&self, speed: f32);
        async fn release(&self);
        async fn set_playlist(&self, tracks: Vec<Track>, start_index: usize);
        async fn skip_to_next(&self);
        async fn skip_to_previous(&self);
    }
}

fn track(id: &str) -> Track {
    Track::new(id, format!("Song {id}"), "Artist", "Album", 1000, format!("mem://{id}"))
}

/// Mock expecting each control call exactly once with the given arguments.
fn strict_inner() -> MockInner {
    let mut inner = MockInner::new();
    inner.expect_playback_state().return_const(PlaybackState::Paused);
    inner.expect_current_position().return_const(1234u64);
    inner.expect_duration().return_const(5000u64);
    inner.expect_is_playing().return_const(false);
    inner
        .expect_current_track()
        .returning(|| Some(track("current")));
    inner
        .expect_play_track()
        .with(eq(track("1")))
        .times(1)
        .return_const(());
    inner.expect_pause().times(1).return_const(());
    inner.expect_resume().times(1).return_const(());
    inner.expect_stop().times(1).return_const(());
    inner
        .expect_seek_to()
        .with(eq(42u64))
        .times(1)
        .return_const(());
    inner
        .expect_set_volume()
        .with(eq(0.5f32))
        .times(1)
        .return_const(());
    inner
        .expect_set_playback_speed()
        .with(eq(1.5f32))
        .times(1)
        .return_const(());
    inner
        .expect_set_playlist()
        .withf(|tracks, start| tracks.len() == 2 && *start == 1)
        .times(1)
        .return_const(());
    inner.expect_skip_to_next().times(1).return_const(());
    inner.expect_skip_to_previous().times(1).return_const(());
    inner.expect_release().times(1).return_const(());
    inner
}

async fn drive<P: MediaPlayer>(player: &P) {
    assert_eq!(player.playback_state(), PlaybackState::Paused);
    assert_eq!(player.current_position(), 1234);
    assert_eq!(player.duration(), 5000);
    assert!(!player.is_playing());
    assert_eq!(player.current_track(), Some(track("current")));

    player.play_track(track("1")).await;
    player.pause().await;
    player.resume().await;
    player.stop().await;
    player.seek_to(42).await;
    player.set_volume(0.5).await;
    player.set_playback_speed(1.5).await;
    player.set_playlist(vec![track("a"), track("b")], 1).await;
    player.skip_to_next().await;
    player.skip_to_previous().await;
    player.release().await;
    player.release().await;
}

#[tokio::test]
async fn test_playlist_player_forwards() {
    let player = PlaylistPlayer::new(strict_inner());
    drive(&player).await;
}

#[tokio::test]
async fn test_playback_mode_player_forwards() {
    let player = PlaybackModePlayer::new(strict_inner());
    drive(&player).await;
    assert_eq!(player.playback_mode(), PlaybackMode::Normal);
}

#[tokio::test]
async fn test_multi_audio_player_forwards() {
    let player = MultiAudioPlayer::new(strict_inner()).await;
    drive(&player).await;
}

#[tokio::test]
async fn test_events_are_forwarded_verbatim() {
    let bus = Arc::new(PlayerEventBus::default());
    let source = Arc::clone(&bus);
    let mut inner = MockInner::new();
    inner.expect_subscribe().returning(move || source.subscribe());

    let player = PlaylistPlayer::new(PlaybackModePlayer::new(inner));
    let mut events = player.subscribe();

    bus.emit(PlayerEvent::PositionChanged(7)).unwrap();
    bus
        .emit(PlayerEvent::error("Failed to pause playback", None))
        .unwrap();

    assert_eq!(
        events.drain(),
        vec![
            PlayerEvent::PositionChanged(7),
            PlayerEvent::error("Failed to pause playback", None),
        ]
    );
}
