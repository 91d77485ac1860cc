//! # Playback-Mode Component
//!
//! Holds the current [`PlaybackMode`] and the [`Sequencer`] that answers
//! next/previous queries for it. The component does not own a playlist:
//! callers pass a snapshot and current index with every query, so it works
//! standalone or next to a [`Playlist`](crate::Playlist).

use crate::playlist::{PlaylistObserver, PlaylistSnapshot};
use crate::sequencing::Sequencer;
use crate::state::PlaybackMode;
use core_async::sync::watch;
use core_library::Track;
use core_runtime::config::ShuffleRegeneration;
use parking_lot::Mutex;
use tracing::{debug, info};

pub struct PlaybackModeController {
    mode: watch::Sender<PlaybackMode>,
    sequencer: Mutex<Sequencer>,
    regeneration: ShuffleRegeneration,
}

impl Default for PlaybackModeController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackModeController {
    pub fn new() -> Self {
        Self::with_sequencer(Sequencer::new(), ShuffleRegeneration::default())
    }

    pub fn with_sequencer(sequencer: Sequencer, regeneration: ShuffleRegeneration) -> Self {
        let (mode, _) = watch::channel(PlaybackMode::default());
        Self {
            mode,
            sequencer: Mutex::new(sequencer),
            regeneration,
        }
    }

    pub fn with_regeneration(mut self, regeneration: ShuffleRegeneration) -> Self {
        self.regeneration = regeneration;
        self
    }

    pub fn playback_mode(&self) -> PlaybackMode {
        *self.mode.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackMode> {
        self.mode.subscribe()
    }

    pub fn regeneration(&self) -> ShuffleRegeneration {
        self.regeneration
    }

    /// Switch mode. Selecting `Shuffle`, even when already shuffling, starts a
    /// fresh permutation on the next query.
    pub fn set_playback_mode(&self, mode: PlaybackMode) {
        let previous = self.mode.send_replace(mode);
        if mode == PlaybackMode::Shuffle {
            self.sequencer.lock().reset_shuffle();
        }
        if previous != mode {
            info!(?previous, ?mode, "Playback mode changed");
        }
    }

    pub fn get_next_track(
        &self,
        current_track: Option<&Track>,
        playlist: &[Track],
        current_index: Option<usize>,
    ) -> Option<Track> {
        let mode = self.playback_mode();
        self.sequencer
            .lock()
            .next_track(mode, current_track, playlist, current_index)
    }

    pub fn get_previous_track(
        &self,
        current_track: Option<&Track>,
        playlist: &[Track],
        current_index: Option<usize>,
    ) -> Option<Track> {
        let mode = self.playback_mode();
        self.sequencer
            .lock()
            .previous_track(mode, current_track, playlist, current_index)
    }

    /// Drop the shuffle permutation so the next query generates a new one.
    pub fn reshuffle(&self) {
        self.sequencer.lock().reset_shuffle();
    }

    /// Shuffle order currently in use, if any.
    pub fn shuffle_order(&self) -> Option<Vec<usize>> {
        self.sequencer
            .lock()
            .shuffle_order()
            .map(|order| order.order().to_vec())
    }

    /// Forget sequencing state. The mode itself is kept.
    pub fn release(&self) {
        self.sequencer.lock().reset_shuffle();
    }
}

impl PlaylistObserver for PlaybackModeController {
    fn on_playlist_changed(&self, snapshot: &PlaylistSnapshot) {
        if self.regeneration != ShuffleRegeneration::Eager
            || self.playback_mode() != PlaybackMode::Shuffle
        {
            return;
        }
        debug!(len = snapshot.len(), "Regenerating shuffle order");
        self.sequencer
            .lock()
            .regenerate(snapshot.len(), snapshot.current_index);
    }
}

impl std::fmt::Debug for PlaybackModeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackModeController")
            .field("mode", &self.playback_mode())
            .field("regeneration", &self.regeneration)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracks(n: usize) -> Vec<Track> {
        (0..n)
            .map(|i| Track::new(i.to_string(), format!("T{i}"), "A", "B", 1, format!("{i}.mp3")))
            .collect()
    }

    fn seeded() -> PlaybackModeController {
        PlaybackModeController::with_sequencer(Sequencer::with_seed(5), ShuffleRegeneration::Eager)
    }

    #[test]
    fn test_defaults_to_normal() {
        let controller = PlaybackModeController::new();
        assert_eq!(controller.playback_mode(), PlaybackMode::Normal);

        let list = tracks(3);
        let next = controller.get_next_track(Some(&list[0]), &list, Some(0));
        assert_eq!(next, Some(list[1].clone()));
    }

    #[test]
    fn test_repeat_one() {
        let controller = seeded();
        controller.set_playback_mode(PlaybackMode::RepeatOne);

        let list = tracks(3);
        let current = &list[2];
        assert_eq!(
            controller.get_next_track(Some(current), &list, Some(2)),
            Some(current.clone())
        );
        assert_eq!(
            controller.get_previous_track(Some(current), &list, Some(2)),
            Some(current.clone())
        );
    }

    #[test]
    fn test_selecting_shuffle_resets_order() {
        let controller = seeded();
        controller.set_playback_mode(PlaybackMode::Shuffle);

        let list = tracks(4);
        controller.get_next_track(None, &list, None);
        assert!(controller.shuffle_order().is_some());

        controller.set_playback_mode(PlaybackMode::Shuffle);
        assert!(controller.shuffle_order().is_none());
    }

    #[test]
    fn test_eager_regeneration_on_playlist_change() {
        let controller = seeded();
        controller.set_playback_mode(PlaybackMode::Shuffle);

        let snapshot = PlaylistSnapshot {
            tracks: tracks(5),
            current_index: Some(2),
        };
        controller.on_playlist_changed(&snapshot);

        let order = controller.shuffle_order().unwrap();
        assert_eq!(order.len(), 5);
        assert_eq!(order[0], 2);
    }

    #[test]
    fn test_lazy_policy_ignores_playlist_change() {
        let controller = seeded().with_regeneration(ShuffleRegeneration::Lazy);
        controller.set_playback_mode(PlaybackMode::Shuffle);

        controller.on_playlist_changed(&PlaylistSnapshot {
            tracks: tracks(5),
            current_index: None,
        });
        assert!(controller.shuffle_order().is_none());
    }

    #[test]
    fn test_normal_mode_ignores_playlist_change() {
        let controller = seeded();
        controller.on_playlist_changed(&PlaylistSnapshot {
            tracks: tracks(2),
            current_index: None,
        });
        assert!(controller.shuffle_order().is_none());
    }

    #[tokio::test]
    async fn test_mode_is_observable() {
        let controller = seeded();
        let mut rx = controller.subscribe();

        controller.set_playback_mode(PlaybackMode::RepeatOne);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), PlaybackMode::RepeatOne);
    }
}
