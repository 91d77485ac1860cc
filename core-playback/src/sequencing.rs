//! # Sequencing Engine
//!
//! Decides which track comes next or previous for a [`PlaybackMode`].
//!
//! ## Policies
//!
//! - **Normal**: walk the playlist in order; no wrap-around.
//! - **RepeatOne**: both directions return the current track.
//! - **Shuffle**: walk a random permutation of the playlist indices with a
//!   cursor. The permutation is generated on first use, after the mode is
//!   re-selected, after it is exhausted, and whenever the playlist length no
//!   longer matches the length it was generated for.
//!
//! An empty playlist yields `None` in every mode.
//!
//! The engine never owns the playlist; callers pass a snapshot and the
//! current index on every query.

use crate::state::PlaybackMode;
use core_library::Track;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::trace;

/// Next track in playlist order.
pub fn next_in_order(playlist: &[Track], current_index: Option<usize>) -> Option<&Track> {
    match current_index {
        None => playlist.first(),
        Some(index) => playlist.get(index.checked_add(1)?),
    }
}

/// Previous track in playlist order.
pub fn previous_in_order(playlist: &[Track], current_index: Option<usize>) -> Option<&Track> {
    let index = current_index?;
    if index == 0 {
        return None;
    }
    playlist.get(index - 1)
}

/// A random permutation of playlist indices and a cursor into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffleOrder {
    order: Vec<usize>,
    /// Position of the last visited entry; `None` before the first.
    cursor: Option<usize>,
}

impl ShuffleOrder {
    /// Shuffle `0..len`.
    ///
    /// A valid `current_index` is moved to the front and counts as visited,
    /// so the first `advance` never repeats the track that is playing.
    pub fn generate<R>(len: usize, current_index: Option<usize>, rng: &mut R) -> Self
    where
        R: rand::Rng + ?Sized,
    {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(rng);

        let cursor = match current_index.filter(|&index| index < len) {
            Some(current) => {
                if let Some(position) = order.iter().position(|&i| i == current) {
                    order.swap(0, position);
                }
                Some(0)
            }
            None => None,
        };

        Self { order, cursor }
    }

    /// Number of indices in the permutation.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Step forward. `None` once every entry has been visited.
    pub fn advance(&mut self) -> Option<usize> {
        let next = self.cursor.map_or(0, |cursor| cursor + 1);
        let index = *self.order.get(next)?;
        self.cursor = Some(next);
        Some(index)
    }

    /// Step back. `None` at the first entry.
    pub fn rewind(&mut self) -> Option<usize> {
        let cursor = self.cursor.filter(|&cursor| cursor > 0)?;
        self.cursor = Some(cursor - 1);
        self.order.get(cursor - 1).copied()
    }

    pub fn is_exhausted(&self) -> bool {
        match self.cursor {
            Some(cursor) => cursor + 1 >= self.order.len(),
            None => self.order.is_empty(),
        }
    }
}

/// Stateful sequencer holding the shuffle permutation between queries.
#[derive(Debug)]
pub struct Sequencer {
    shuffle: Option<ShuffleOrder>,
    rng: StdRng,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            shuffle: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic shuffle orders, for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            shuffle: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Drop the permutation; the next shuffle query generates a fresh one.
    pub fn reset_shuffle(&mut self) {
        self.shuffle = None;
    }

    /// Generate a fresh permutation now.
    pub fn regenerate(&mut self, len: usize, current_index: Option<usize>) {
        let order = ShuffleOrder::generate(len, current_index, &mut self.rng);
        trace!(len, ?current_index, order = ?order.order(), "Generated shuffle order");
        self.shuffle = Some(order);
    }

    pub fn shuffle_order(&self) -> Option<&ShuffleOrder> {
        self.shuffle.as_ref()
    }

    pub fn next_track(
        &mut self,
        mode: PlaybackMode,
        current_track: Option<&Track>,
        playlist: &[Track],
        current_index: Option<usize>,
    ) -> Option<Track> {
        if playlist.is_empty() {
            return None;
        }

        match mode {
            PlaybackMode::Normal => next_in_order(playlist, current_index).cloned(),
            PlaybackMode::RepeatOne => current_track.cloned(),
            PlaybackMode::Shuffle => {
                let order = self.order_for(playlist.len(), current_index);
                match order.advance() {
                    Some(index) => playlist.get(index).cloned(),
                    None => {
                        // Exhausted: the next query starts a new round.
                        self.shuffle = None;
                        None
                    }
                }
            }
        }
    }

    pub fn previous_track(
        &mut self,
        mode: PlaybackMode,
        current_track: Option<&Track>,
        playlist: &[Track],
        current_index: Option<usize>,
    ) -> Option<Track> {
        if playlist.is_empty() {
            return None;
        }

        match mode {
            PlaybackMode::Normal => previous_in_order(playlist, current_index).cloned(),
            PlaybackMode::RepeatOne => current_track.cloned(),
            PlaybackMode::Shuffle => {
                let order = self.order_for(playlist.len(), current_index);
                order.rewind().and_then(|index| playlist.get(index).cloned())
            }
        }
    }

    fn order_for(&mut self, len: usize, current_index: Option<usize>) -> &mut ShuffleOrder {
        let stale = self
            .shuffle
            .as_ref()
            .map_or(true, |order| order.len() != len);
        if stale {
            self.regenerate(len, current_index);
        }
        self.shuffle
            .get_or_insert_with(|| ShuffleOrder::generate(len, current_index, &mut self.rng))
    }
}
