//! # Player Configuration
//!
//! Configuration for players built by the playback core.
//!
//! ## Overview
//!
//! [`PlayerConfig`] is constructed through [`PlayerConfigBuilder`]. Every field
//! has a default, so `PlayerConfig::builder().build()` is valid; `build()`
//! fails fast with an actionable [`Error::Config`] when a value is out of
//! range instead of silently clamping it.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::config::{PlayerConfig, RepeatMode};
//! use std::time::Duration;
//!
//! let config = PlayerConfig::builder()
//!     .position_poll_interval(Duration::from_millis(500))
//!     .default_volume(0.8)
//!     .repeat_mode(RepeatMode::One)
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.default_volume, 0.8);
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::PlayerConfig;
//!
//! PlayerConfig::builder()
//!     .default_speed(4.0)
//!     .build()
//!     .expect("speed outside 0.5..=2.0 is rejected");
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lowest volume accepted by players.
pub const MIN_VOLUME: f32 = 0.0;
/// Highest volume accepted by players.
pub const MAX_VOLUME: f32 = 1.0;
/// Slowest playback speed accepted by players.
pub const MIN_SPEED: f32 = 0.5;
/// Fastest playback speed accepted by players.
pub const MAX_SPEED: f32 = 2.0;

const DEFAULT_POSITION_POLL_INTERVAL: Duration = Duration::from_secs(1);
const MIN_POSITION_POLL_INTERVAL: Duration = Duration::from_millis(50);
const MAX_POSITION_POLL_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_EVENT_BUFFER_CAPACITY: usize = 1024;
const MAX_EVENT_BUFFER_CAPACITY: usize = 65_536;

/// Repeat behaviour a player starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    #[default]
    Off,
    /// Repeat the current track indefinitely.
    One,
}

/// When the shuffle order is rebuilt after the playlist changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleRegeneration {
    /// Rebuild on every structural playlist change while shuffling.
    #[default]
    Eager,
    /// Rebuild only when the order is exhausted, the mode is re-selected, or
    /// the playlist size no longer matches.
    Lazy,
}

/// Player configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Period of position reporting while playing.
    pub position_poll_interval: Duration,

    /// Per-subscriber event buffer before the oldest events are overwritten.
    pub event_buffer_capacity: usize,

    /// Volume applied to the engine when the player is created.
    pub default_volume: f32,

    /// Playback speed applied to the engine when the player is created.
    pub default_speed: f32,

    pub repeat_mode: RepeatMode,

    /// Start in shuffle mode. Takes precedence over `repeat_mode`.
    pub shuffle: bool,

    pub shuffle_regeneration: ShuffleRegeneration,

    /// Start playing the first track as soon as a track list is loaded.
    pub auto_play: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            position_poll_interval: DEFAULT_POSITION_POLL_INTERVAL,
            event_buffer_capacity: DEFAULT_EVENT_BUFFER_CAPACITY,
            default_volume: MAX_VOLUME,
            default_speed: 1.0,
            repeat_mode: RepeatMode::Off,
            shuffle: false,
            shuffle_regeneration: ShuffleRegeneration::Eager,
            auto_play: false,
        }
    }
}

impl PlayerConfig {
    /// Creates a new builder for constructing a `PlayerConfig`.
    pub fn builder() -> PlayerConfigBuilder {
        PlayerConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Poll interval is between 50ms and 60s
    /// - Event buffer capacity is between 1 and 65,536
    /// - Default volume is within `[0.0, 1.0]`
    /// - Default speed is within `[0.5, 2.0]`
    pub fn validate(&self) -> Result<()> {
        if self.position_poll_interval < MIN_POSITION_POLL_INTERVAL {
            return Err(Error::Config(format!(
                "Position poll interval must be at least {}ms",
                MIN_POSITION_POLL_INTERVAL.as_millis()
            )));
        }

        if self.position_poll_interval > MAX_POSITION_POLL_INTERVAL {
            return Err(Error::Config(
                "Position poll interval exceeds maximum of 60 seconds".to_string(),
            ));
        }

        if self.event_buffer_capacity == 0 {
            return Err(Error::Config(
                "Event buffer capacity must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_capacity > MAX_EVENT_BUFFER_CAPACITY {
            return Err(Error::Config(format!(
                "Event buffer capacity exceeds maximum of {MAX_EVENT_BUFFER_CAPACITY}"
            )));
        }

        if !(MIN_VOLUME..=MAX_VOLUME).contains(&self.default_volume) {
            return Err(Error::Config(format!(
                "Default volume {} is out of range. Use a value between {MIN_VOLUME} and {MAX_VOLUME}.",
                self.default_volume
            )));
        }

        if !(MIN_SPEED..=MAX_SPEED).contains(&self.default_speed) {
            return Err(Error::Config(format!(
                "Default speed {} is out of range. Use a value between {MIN_SPEED} and {MAX_SPEED}.",
                self.default_speed
            )));
        }

        Ok(())
    }
}

/// Builder for [`PlayerConfig`]. Unset fields take their defaults.
#[derive(Debug, Default)]
pub struct PlayerConfigBuilder {
    position_poll_interval: Option<Duration>,
    event_buffer_capacity: Option<usize>,
    default_volume: Option<f32>,
    default_speed: Option<f32>,
    repeat_mode: Option<RepeatMode>,
    shuffle: Option<bool>,
    shuffle_regeneration: Option<ShuffleRegeneration>,
    auto_play: Option<bool>,
}

impl PlayerConfigBuilder {
    pub fn position_poll_interval(mut self, interval: Duration) -> Self {
        self.position_poll_interval = Some(interval);
        self
    }

    pub fn event_buffer_capacity(mut self, capacity: usize) -> Self {
        self.event_buffer_capacity = Some(capacity);
        self
    }

    pub fn default_volume(mut self, volume: f32) -> Self {
        self.default_volume = Some(volume);
        self
    }

    pub fn default_speed(mut self, speed: f32) -> Self {
        self.default_speed = Some(speed);
        self
    }

    pub fn repeat_mode(mut self, mode: RepeatMode) -> Self {
        self.repeat_mode = Some(mode);
        self
    }

    pub fn shuffle(mut self, enabled: bool) -> Self {
        self.shuffle = Some(enabled);
        self
    }

    pub fn shuffle_regeneration(mut self, policy: ShuffleRegeneration) -> Self {
        self.shuffle_regeneration = Some(policy);
        self
    }

    pub fn auto_play(mut self, enabled: bool) -> Self {
        self.auto_play = Some(enabled);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid value.
    pub fn build(self) -> Result<PlayerConfig> {
        let defaults = PlayerConfig::default();
        let config = PlayerConfig {
            position_poll_interval: self
                .position_poll_interval
                .unwrap_or(defaults.position_poll_interval),
            event_buffer_capacity: self
                .event_buffer_capacity
                .unwrap_or(defaults.event_buffer_capacity),
            default_volume: self.default_volume.unwrap_or(defaults.default_volume),
            default_speed: self.default_speed.unwrap_or(defaults.default_speed),
            repeat_mode: self.repeat_mode.unwrap_or(defaults.repeat_mode),
            shuffle: self.shuffle.unwrap_or(defaults.shuffle),
            shuffle_regeneration: self
                .shuffle_regeneration
                .unwrap_or(defaults.shuffle_regeneration),
            auto_play: self.auto_play.unwrap_or(defaults.auto_play),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PlayerConfig::builder().build().unwrap();
        assert_eq!(config, PlayerConfig::default());
        assert_eq!(config.position_poll_interval, Duration::from_secs(1));
        assert_eq!(config.event_buffer_capacity, 1024);
        assert_eq!(config.default_volume, 1.0);
        assert_eq!(config.default_speed, 1.0);
        assert_eq!(config.shuffle_regeneration, ShuffleRegeneration::Eager);
    }

    #[test]
    fn test_builder_overrides() {
        let config = PlayerConfig::builder()
            .position_poll_interval(Duration::from_millis(250))
            .event_buffer_capacity(32)
            .default_volume(0.25)
            .default_speed(1.5)
            .repeat_mode(RepeatMode::One)
            .shuffle(true)
            .shuffle_regeneration(ShuffleRegeneration::Lazy)
            .auto_play(true)
            .build()
            .unwrap();

        assert_eq!(config.position_poll_interval, Duration::from_millis(250));
        assert_eq!(config.event_buffer_capacity, 32);
        assert_eq!(config.default_volume, 0.25);
        assert_eq!(config.default_speed, 1.5);
        assert_eq!(config.repeat_mode, RepeatMode::One);
        assert!(config.shuffle);
        assert_eq!(config.shuffle_regeneration, ShuffleRegeneration::Lazy);
        assert!(config.auto_play);
    }

    #[test]
    fn test_rejects_out_of_range_volume() {
        let err = PlayerConfig::builder()
            .default_volume(1.5)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("volume")));
    }

    #[test]
    fn test_rejects_out_of_range_speed() {
        assert!(PlayerConfig::builder().default_speed(0.25).build().is_err());
        assert!(PlayerConfig::builder().default_speed(2.0).build().is_ok());
    }

    #[test]
    fn test_rejects_bad_poll_interval() {
        assert!(PlayerConfig::builder()
            .position_poll_interval(Duration::from_millis(10))
            .build()
            .is_err());
        assert!(PlayerConfig::builder()
            .position_poll_interval(Duration::from_secs(120))
            .build()
            .is_err());
    }

    #[test]
    fn test_rejects_zero_event_capacity() {
        let err = PlayerConfig::builder()
            .event_buffer_capacity(0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Event buffer capacity"));
    }

    #[test]
    fn test_config_serialization() {
        let config = PlayerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"repeat_mode\":\"off\""));
        let parsed: PlayerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
