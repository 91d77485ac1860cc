//! Session walkthrough against the in-memory engine
//!
//! Loads the sample catalog, walks the playlist in shuffle mode and prints
//! the view state after each step.
//!
//! Run with:
//! ```bash
//! cargo run -p core-service --example session_demo
//!
//! # JSON logs
//! cargo run -p core-service --example session_demo -- json
//! ```

use bridge_traits::logging::LogLevel;
use bridge_traits::MemoryEngine;
use core_library::InMemoryCatalog;
use core_runtime::config::PlayerConfig;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_service::{PlayerFactory, PlayerIntent, PlayerViewState};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let format = match env::args().nth(1).as_deref() {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };
    init_logging(
        LoggingConfig::default()
            .with_format(format)
            .with_level(LogLevel::Debug),
    )?;

    let config = PlayerConfig::builder()
        .shuffle(true)
        .position_poll_interval(Duration::from_millis(200))
        .build()?;
    let engine = Arc::new(MemoryEngine::new());
    let session = PlayerFactory::create_session(
        engine.clone(),
        Arc::new(InMemoryCatalog::with_sample_tracks()),
        config,
    )
    .await?;

    session.load_tracks().await?;
    for _ in 0..3 {
        session.handle_intent(PlayerIntent::SkipToNext).await;
        engine.advance(1_000);
        tokio::time::sleep(Duration::from_millis(250)).await;
        print_state(&session.state());
    }

    session.handle_intent(PlayerIntent::PauseTrack).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    print_state(&session.state());

    session.release().await;
    info!("Demo finished");
    Ok(())
}

fn print_state(state: &PlayerViewState) {
    let title = state
        .current_track
        .as_ref()
        .map_or("<none>", |track| track.title.as_str());
    println!(
        "{title:<16} playing={:<5} position={}ms error={:?}",
        state.is_playing, state.playback_position, state.error
    );
}
