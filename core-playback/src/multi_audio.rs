//! # Multi-Audio Registry
//!
//! Holds one optional main player and any number of named sub-players, plus
//! the id of the player that currently has focus.
//!
//! ## Invariants
//!
//! - The active id is `None`, [`PlayerId::Main`] while a main player is
//!   registered, or the name of a registered sub-player.
//! - The name `"main"` can never be used for a sub-player.
//! - Replacing or removing a player releases it.
//!
//! Locks are never held across an `.await`: every operation snapshots the
//! players it needs, then drives them.

use crate::error::{PlaybackError, Result};
use crate::player::{MediaPlayer, SharedPlayer};
use core_async::sync::watch;
use core_library::Track;
use futures::future::join_all;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Reserved name of the main player.
pub const MAIN_PLAYER_NAME: &str = "main";

/// Identifies a player in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum PlayerId {
    Main,
    Named(String),
}

impl PlayerId {
    /// `"main"` parses to [`PlayerId::Main`], anything else to a named id.
    pub fn parse(id: &str) -> Self {
        if id == MAIN_PLAYER_NAME {
            PlayerId::Main
        } else {
            PlayerId::Named(id.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PlayerId::Main => MAIN_PLAYER_NAME,
            PlayerId::Named(name) => name,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        PlayerId::parse(id)
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        if id == MAIN_PLAYER_NAME {
            PlayerId::Main
        } else {
            PlayerId::Named(id)
        }
    }
}

impl From<PlayerId> for String {
    fn from(id: PlayerId) -> Self {
        match id {
            PlayerId::Main => MAIN_PLAYER_NAME.to_string(),
            PlayerId::Named(name) => name,
        }
    }
}

#[derive(Default)]
struct Players {
    main: Option<SharedPlayer>,
    subs: HashMap<String, SharedPlayer>,
}

impl Players {
    fn get(&self, id: &PlayerId) -> Option<SharedPlayer> {
        match id {
            PlayerId::Main => self.main.clone(),
            PlayerId::Named(name) => self.subs.get(name).cloned(),
        }
    }

    fn contains(&self, id: &PlayerId) -> bool {
        match id {
            PlayerId::Main => self.main.is_some(),
            PlayerId::Named(name) => self.subs.contains_key(name),
        }
    }

    fn all(&self) -> Vec<SharedPlayer> {
        self.main
            .iter()
            .chain(self.subs.values())
            .cloned()
            .collect()
    }
}

fn same_instance(a: &SharedPlayer, b: &SharedPlayer) -> bool {
    Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
}

pub struct MultiAudioRegistry {
    players: Mutex<Players>,
    active: watch::Sender<Option<PlayerId>>,
}

impl Default for MultiAudioRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiAudioRegistry {
    pub fn new() -> Self {
        let (active, _) = watch::channel(None);
        Self {
            players: Mutex::new(Players::default()),
            active,
        }
    }

    /// Install the main player, releasing the previous one.
    pub async fn set_main_player(&self, player: SharedPlayer) {
        let previous = self.players.lock().main.replace(Arc::clone(&player));
        self.active.send_if_modified(|active| {
            if active.is_none() {
                *active = Some(PlayerId::Main);
                true
            } else {
                false
            }
        });

        if let Some(previous) = previous.filter(|p| !same_instance(p, &player)) {
            debug!("Releasing replaced main player");
            previous.release().await;
        }
        info!("Main player registered");
    }

    /// Register a sub-player under `name`, releasing any player it replaces.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::ReservedPlayerId`] for `"main"`.
    pub async fn add_sub_player(&self, name: impl Into<String>, player: SharedPlayer) -> Result<()> {
        let name = name.into();
        if name == MAIN_PLAYER_NAME {
            return Err(PlaybackError::ReservedPlayerId(name));
        }

        let previous = self
            .players
            .lock()
            .subs
            .insert(name.clone(), Arc::clone(&player));
        if let Some(previous) = previous.filter(|p| !same_instance(p, &player)) {
            debug!(player = %name, "Releasing replaced sub-player");
            previous.release().await;
        }
        info!(player = %name, "Sub-player registered");
        Ok(())
    }

    /// Unregister and release a sub-player. Returns whether it existed.
    pub async fn remove_sub_player(&self, name: &str) -> bool {
        let (removed, has_main) = {
            let mut players = self.players.lock();
            (players.subs.remove(name), players.main.is_some())
        };
        let Some(removed) = removed else {
            return false;
        };

        self.active.send_if_modified(|active| {
            let focused = matches!(active, Some(PlayerId::Named(current)) if current == name);
            if focused {
                *active = has_main.then_some(PlayerId::Main);
            }
            focused
        });

        removed.release().await;
        info!(player = name, "Sub-player removed");
        true
    }

    /// Focus `id`, or clear focus with `None`. Ignored for unknown ids.
    pub fn set_active_player(&self, id: Option<PlayerId>) -> bool {
        if let Some(target) = &id {
            if !self.players.lock().contains(target) {
                debug!(player = %target, "Ignoring focus on unknown player");
                return false;
            }
        }
        self.active.send_replace(id);
        true
    }

    pub fn active_player_id(&self) -> Option<PlayerId> {
        self.active.borrow().clone()
    }

    pub fn subscribe_active(&self) -> watch::Receiver<Option<PlayerId>> {
        self.active.subscribe()
    }

    /// The focused player, if any.
    pub fn active_player(&self) -> Option<SharedPlayer> {
        let id = self.active_player_id()?;
        self.get_player(&id)
    }

    pub fn get_player(&self, id: &PlayerId) -> Option<SharedPlayer> {
        self.players.lock().get(id)
    }

    pub fn main_player(&self) -> Option<SharedPlayer> {
        self.players.lock().main.clone()
    }

    pub fn has_main_player(&self) -> bool {
        self.players.lock().main.is_some()
    }

    /// Names of the registered sub-players, sorted.
    pub fn sub_player_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.players.lock().subs.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered players, main included.
    pub fn player_count(&self) -> usize {
        let players = self.players.lock();
        players.subs.len() + usize::from(players.main.is_some())
    }

    // ------------------------------------------------------------------------
    // Aggregate operations
    // ------------------------------------------------------------------------

    pub async fn pause_all(&self) {
        let players = self.players.lock().all();
        debug!(count = players.len(), "Pausing all players");
        join_all(players.iter().map(|p| p.pause())).await;
    }

    pub async fn stop_all(&self) {
        let players = self.players.lock().all();
        debug!(count = players.len(), "Stopping all players");
        join_all(players.iter().map(|p| p.stop())).await;
    }

    pub async fn set_volume_for_all(&self, volume: f32) {
        let players = self.players.lock().all();
        join_all(players.iter().map(|p| p.set_volume(volume))).await;
    }

    pub async fn set_playback_speed_for_all(&self, speed: f32) {
        let players = self.players.lock().all();
        join_all(players.iter().map(|p| p.set_playback_speed(speed))).await;
    }

    // ------------------------------------------------------------------------
    // Targeted operations. Each returns whether `id` resolved to a player.
    // ------------------------------------------------------------------------

    /// Play on `id` and focus it.
    pub async fn play_track_on_player(&self, id: &PlayerId, track: Track) -> bool {
        let Some(player) = self.get_player(id) else {
            return false;
        };
        player.play_track(track).await;
        self.set_active_player(Some(id.clone()));
        true
    }

    pub async fn pause_player(&self, id: &PlayerId) -> bool {
        match self.get_player(id) {
            Some(player) => {
                player.pause().await;
                true
            }
            None => false,
        }
    }

    pub async fn resume_player(&self, id: &PlayerId) -> bool {
        match self.get_player(id) {
            Some(player) => {
                player.resume().await;
                true
            }
            None => false,
        }
    }

    pub async fn stop_player(&self, id: &PlayerId) -> bool {
        match self.get_player(id) {
            Some(player) => {
                player.stop().await;
                true
            }
            None => false,
        }
    }

    pub async fn set_player_volume(&self, id: &PlayerId, volume: f32) -> bool {
        match self.get_player(id) {
            Some(player) => {
                player.set_volume(volume).await;
                true
            }
            None => false,
        }
    }

    pub async fn set_player_speed(&self, id: &PlayerId, speed: f32) -> bool {
        match self.get_player(id) {
            Some(player) => {
                player.set_playback_speed(speed).await;
                true
            }
            None => false,
        }
    }

    pub async fn seek_player_to(&self, id: &PlayerId, position_ms: u64) -> bool {
        match self.get_player(id) {
            Some(player) => {
                player.seek_to(position_ms).await;
                true
            }
            None => false,
        }
    }

    /// Release every player and clear all state. Idempotent.
    pub async fn release(&self) {
        let players = {
            let mut players = self.players.lock();
            std::mem::take(&mut *players).all()
        };
        self.active.send_replace(None);
        if players.is_empty() {
            return;
        }

        info!(count = players.len(), "Releasing all players");
        join_all(players.iter().map(|p| p.release())).await;
    }
}

impl fmt::Debug for MultiAudioRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiAudioRegistry")
            .field("has_main", &self.has_main_player())
            .field("sub_players", &self.sub_player_ids())
            .field("active", &self.active_player_id())
            .finish()
    }
}
