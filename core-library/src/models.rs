//! Domain models for the music library

use serde::{Deserialize, Serialize};

/// A playable track.
///
/// Tracks are immutable values. Identity is the `id`: two tracks with the same
/// `id` are the same logical track even when other fields differ, which is
/// why equality-by-identity goes through [`Track::same_track`] rather than
/// `==`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Track {
    /// Opaque unique identifier
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Playable source locator
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_art_uri: Option<String>,
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        duration_ms: u64,
        uri: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            duration_ms,
            uri: uri.into(),
            album_art_uri: None,
        }
    }

    pub fn with_album_art(mut self, uri: impl Into<String>) -> Self {
        self.album_art_uri = Some(uri.into());
        self
    }

    /// Whether `other` denotes the same logical track.
    pub fn same_track(&self, other: &Track) -> bool {
        self.id == other.id
    }

    /// Validate track data
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Track id cannot be empty".to_string());
        }

        if self.title.trim().is_empty() {
            return Err("Track title cannot be empty".to_string());
        }

        if self.uri.trim().is_empty() {
            return Err("Track uri cannot be empty".to_string());
        }

        Ok(())
    }

    /// Case-insensitive substring match over title, artist and album.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        [&self.title, &self.artist, &self.album]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}
