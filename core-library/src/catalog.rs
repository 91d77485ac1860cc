//! Track catalog.
//!
//! The catalog is a pure data source. Players never call back into it; a
//! session loads tracks from it and hands them to the player stack.

use crate::error::{LibraryError, Result};
use crate::models::Track;
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

/// Read-only source of tracks.
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    /// All tracks, in catalog order.
    async fn get_tracks(&self) -> Result<Vec<Track>>;

    /// Look up a single track. `Ok(None)` when the id is unknown.
    async fn get_track_by_id(&self, id: &str) -> Result<Option<Track>>;

    /// Tracks whose title, artist or album contains `query`,
    /// case-insensitively. An empty query matches every track.
    async fn search_tracks(&self, query: &str) -> Result<Vec<Track>>;
}

/// Catalog held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    tracks: RwLock<Vec<Track>>,
}

impl InMemoryCatalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks: RwLock::new(tracks),
        }
    }

    /// Catalog with the three SoundHelix sample tracks.
    pub fn with_sample_tracks() -> Self {
        Self::new(sample_tracks())
    }

    /// Append a track.
    ///
    /// # Errors
    ///
    /// Rejects tracks that fail [`Track::validate`] or reuse an existing id.
    pub fn insert(&self, track: Track) -> Result<()> {
        track
            .validate()
            .map_err(|message| LibraryError::InvalidInput {
                field: "track".to_string(),
                message,
            })?;

        let mut tracks = self.tracks.write();
        if tracks.iter().any(|t| t.same_track(&track)) {
            return Err(LibraryError::InvalidInput {
                field: "id".to_string(),
                message: format!("Track id {} already exists", track.id),
            });
        }
        tracks.push(track);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tracks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.read().is_empty()
    }
}

#[async_trait]
impl TrackCatalog for InMemoryCatalog {
    async fn get_tracks(&self) -> Result<Vec<Track>> {
        Ok(self.tracks.read().clone())
    }

    async fn get_track_by_id(&self, id: &str) -> Result<Option<Track>> {
        Ok(self.tracks.read().iter().find(|t| t.id == id).cloned())
    }

    async fn search_tracks(&self, query: &str) -> Result<Vec<Track>> {
        let needle = query.to_lowercase();
        let tracks = self.tracks.read();
        let found: Vec<Track> = tracks
            .iter()
            .filter(|t| needle.is_empty() || t.matches_lowercase(&needle))
            .cloned()
            .collect();
        debug!(query, matches = found.len(), "Catalog search");
        Ok(found)
    }
}

/// Sample tracks streamed from soundhelix.com.
pub fn sample_tracks() -> Vec<Track> {
    [(1, 180_000), (2, 200_000), (3, 220_000)]
        .into_iter()
        .map(|(n, duration_ms)| {
            Track::new(
                n.to_string(),
                format!("Sample Song {n}"),
                format!("Sample Artist {n}"),
                format!("Sample Album {n}"),
                duration_ms,
                format!("https://www.soundhelix.com/examples/mp3/SoundHelix-Song-{n}.mp3"),
            )
        })
        .collect()
}
