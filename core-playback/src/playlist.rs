//! # Playlist Component
//!
//! An ordered list of tracks plus the index of the current one. The list may
//! contain the same track more than once; entries are told apart by position.
//!
//! After every mutation `current_index` is either `None` or in bounds, and it
//! keeps pointing at the same entry whenever that entry is still present.
//!
//! State is published through a `watch` channel. Observers registered with
//! [`Playlist::add_observer`] are told about structural changes (add, remove,
//! move, clear) after the new state is visible.

use crate::sequencing::{next_in_order, previous_in_order};
use core_async::sync::watch;
use core_library::Track;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Point-in-time view of a playlist.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaylistSnapshot {
    pub tracks: Vec<Track>,
    pub current_index: Option<usize>,
}

impl PlaylistSnapshot {
    pub fn current_track(&self) -> Option<&Track> {
        self.current_index.and_then(|index| self.tracks.get(index))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Notified after structural playlist changes.
pub trait PlaylistObserver: Send + Sync {
    fn on_playlist_changed(&self, snapshot: &PlaylistSnapshot);
}

pub struct Playlist {
    state: watch::Sender<PlaylistSnapshot>,
    observers: RwLock<Vec<Arc<dyn PlaylistObserver>>>,
    released: AtomicBool,
}

impl Default for Playlist {
    fn default() -> Self {
        Self::new()
    }
}

impl Playlist {
    pub fn new() -> Self {
        let (state, _) = watch::channel(PlaylistSnapshot::default());
        Self {
            state,
            observers: RwLock::new(Vec::new()),
            released: AtomicBool::new(false),
        }
    }

    pub fn add_observer(&self, observer: Arc<dyn PlaylistObserver>) {
        self.observers.write().push(observer);
    }

    /// Receiver that sees every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<PlaylistSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> PlaylistSnapshot {
        self.state.borrow().clone()
    }

    pub fn tracks(&self) -> Vec<Track> {
        self.state.borrow().tracks.clone()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.borrow().current_index
    }

    pub fn current_track(&self) -> Option<Track> {
        self.state.borrow().current_track().cloned()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty()
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Insert `track` at `position`, or at the end when `None`.
    pub fn add_track(&self, track: Track, position: Option<usize>) {
        self.add_tracks(vec![track], position);
    }

    /// Insert `tracks` in order starting at `position` (clamped to the
    /// length), or at the end when `None`.
    pub fn add_tracks(&self, tracks: Vec<Track>, position: Option<usize>) {
        if tracks.is_empty() || self.is_released() {
            return;
        }

        let count = tracks.len();
        self.state.send_modify(|state| {
            let at = position.map_or(state.tracks.len(), |p| p.min(state.tracks.len()));
            let tail = state.tracks.split_off(at);
            state.tracks.extend(tracks);
            state.tracks.extend(tail);
            if let Some(current) = state.current_index {
                if at <= current {
                    state.current_index = Some(current + count);
                }
            }
        });
        debug!(count, ?position, "Added tracks to playlist");
        self.notify_observers();
    }

    /// Remove the first entry with `id`. Returns the removed track.
    pub fn remove_track(&self, id: &str) -> Option<Track> {
        if self.is_released() {
            return None;
        }
        let mut removed = None;
        self.state.send_if_modified(|state| {
            let Some(index) = state.tracks.iter().position(|t| t.id == id) else {
                return false;
            };
            removed = Some(state.tracks.remove(index));

            state.current_index = match state.current_index {
                Some(current) if current == index => {
                    if state.tracks.is_empty() {
                        None
                    } else {
                        Some(current.min(state.tracks.len() - 1))
                    }
                }
                Some(current) if current > index => Some(current - 1),
                other => other,
            };
            true
        });

        if removed.is_some() {
            debug!(track_id = id, "Removed track from playlist");
            self.notify_observers();
        }
        removed
    }

    /// Move the entry at `from` to `to`. No-op unless both are in range.
    pub fn move_track(&self, from: usize, to: usize) -> bool {
        if self.is_released() {
            return false;
        }
        let moved = self.state.send_if_modified(|state| {
            let len = state.tracks.len();
            if from >= len || to >= len {
                return false;
            }

            let track = state.tracks.remove(from);
            state.tracks.insert(to, track);

            state.current_index = state.current_index.map(|current| {
                if current == from {
                    to
                } else if from < current && current <= to {
                    current - 1
                } else if to <= current && current < from {
                    current + 1
                } else {
                    current
                }
            });
            true
        });

        if moved {
            debug!(from, to, "Moved playlist entry");
            self.notify_observers();
        }
        moved
    }

    /// Select the entry at `index`, or clear the selection with `None`.
    ///
    /// Out-of-range indices are ignored.
    pub fn set_current_index(&self, index: Option<usize>) -> bool {
        if self.is_released() {
            return false;
        }
        self.state.send_if_modified(|state| match index {
            Some(i) if i >= state.tracks.len() => false,
            _ if state.current_index == index => false,
            _ => {
                state.current_index = index;
                true
            }
        })
    }

    /// Select the first entry whose id matches `track`. No-op if absent.
    pub fn set_current_track(&self, track: &Track) -> bool {
        let index = self
            .state
            .borrow()
            .tracks
            .iter()
            .position(|t| t.same_track(track));
        match index {
            Some(index) => {
                self.set_current_index(Some(index));
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        if self.is_released() {
            return;
        }
        let cleared = self.state.send_if_modified(|state| {
            if state.tracks.is_empty() && state.current_index.is_none() {
                return false;
            }
            state.tracks.clear();
            state.current_index = None;
            true
        });
        if cleared {
            self.notify_observers();
        }
    }

    /// Next entry in playlist order.
    pub fn next_track(&self) -> Option<Track> {
        let state = self.state.borrow();
        next_in_order(&state.tracks, state.current_index).cloned()
    }

    /// Previous entry in playlist order.
    pub fn previous_track(&self) -> Option<Track> {
        let state = self.state.borrow();
        previous_in_order(&state.tracks, state.current_index).cloned()
    }

    /// Clear the list and drop observers. Idempotent.
    ///
    /// Mutators are no-ops afterwards.
    pub fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        self.observers.write().clear();
        self.state.send_replace(PlaylistSnapshot::default());
    }

    fn notify_observers(&self) {
        let observers = self.observers.read().clone();
        if observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for observer in observers {
            observer.on_playlist_changed(&snapshot);
        }
    }
}

impl std::fmt::Debug for Playlist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Playlist")
            .field("len", &state.tracks.len())
            .field("current_index", &state.current_index)
            .field("observers", &self.observers.read().len())
            .finish()
    }
}
