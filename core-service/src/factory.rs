//! Config-driven construction of players, stacks and sessions.

use crate::error::Result;
use crate::session::PlayerSession;
use bridge_traits::MediaEngine;
use core_library::TrackCatalog;
use core_playback::{EnginePlayer, PlayerStack};
use core_runtime::config::PlayerConfig;
use std::sync::Arc;
use tracing::info;

/// Entry point for hosts that only hold an engine and a configuration.
pub struct PlayerFactory;

impl PlayerFactory {
    /// Base player over `engine`, with the configured volume and speed applied.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Runtime`](crate::ServiceError::Runtime) when
    /// `config` fails validation.
    pub async fn create(engine: Arc<dyn MediaEngine>, config: PlayerConfig) -> Result<EnginePlayer> {
        config.validate()?;
        let player = EnginePlayer::new(engine, config).await;
        info!(player_id = %player.id(), "Player created");
        Ok(player)
    }

    /// Fully decorated stack: playlist, playback mode and multi-audio.
    ///
    /// The initial playback mode and shuffle policy come from `config`.
    pub async fn create_stack(
        engine: Arc<dyn MediaEngine>,
        config: PlayerConfig,
    ) -> Result<PlayerStack> {
        let base = Self::create(engine, config.clone()).await?;
        Ok(PlayerStack::builder(base)
            .with_playlist()
            .with_playback_mode()
            .with_multi_audio()
            .with_config(&config)
            .build()
            .await)
    }

    /// Session over a fully decorated stack.
    ///
    /// Must be called from within a runtime context.
    pub async fn create_session(
        engine: Arc<dyn MediaEngine>,
        catalog: Arc<dyn TrackCatalog>,
        config: PlayerConfig,
    ) -> Result<PlayerSession> {
        let stack = Self::create_stack(engine, config.clone()).await?;
        Ok(PlayerSession::new(stack, catalog, &config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServiceError;
    use bridge_traits::MemoryEngine;
    use core_playback::{MediaPlayer, PlaybackMode};
    use core_runtime::config::RepeatMode;
    use std::time::Duration;

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let engine = Arc::new(MemoryEngine::new());
        let config = PlayerConfig::builder()
            .default_volume(0.4)
            .default_speed(1.5)
            .build()
            .unwrap();

        let player = PlayerFactory::create(engine.clone(), config).await.unwrap();

        assert_eq!(engine.volume(), 0.4);
        assert_eq!(engine.speed(), 1.5);
        assert_eq!(player.config().default_volume, 0.4);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_config() {
        let engine = Arc::new(MemoryEngine::new());
        let config = PlayerConfig {
            position_poll_interval: Duration::from_millis(1),
            ..PlayerConfig::default()
        };

        let result = PlayerFactory::create(engine.clone(), config).await;

        assert!(matches!(result, Err(ServiceError::Runtime(_))));
        assert!(!engine.has_listener());
    }

    #[tokio::test]
    async fn test_create_stack_takes_mode_from_config() {
        let cases = [
            (RepeatMode::Off, false, PlaybackMode::Normal),
            (RepeatMode::One, false, PlaybackMode::RepeatOne),
            (RepeatMode::One, true, PlaybackMode::Shuffle),
        ];

        for (repeat_mode, shuffle, expected) in cases {
            let config = PlayerConfig::builder()
                .repeat_mode(repeat_mode)
                .shuffle(shuffle)
                .build()
                .unwrap();
            let stack = PlayerFactory::create_stack(Arc::new(MemoryEngine::new()), config)
                .await
                .unwrap();

            assert_eq!(stack.playback_mode().unwrap().playback_mode(), expected);
            assert!(stack.playlist().is_some());
            assert!(stack.multi_audio().unwrap().has_main_player());
            stack.release().await;
        }
    }
}
