//! Ball Arena headless driver
//!
//! Runs the configured roster for a number of matches back to back and
//! logs what happens. Everything is read from the environment (and a
//! `.env` file if present); see [`AppConfig`].

use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ball_arena::{
    game::events::{GameEvent, GameEventData},
    session::ControllerState,
    AppConfig, InputEvent, MatchController, MatchOutcome, FRAME_DT, TICK_RATE, VERSION,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    info!("Ball Arena v{}", VERSION);
    info!("Tick Rate: {} Hz ({})", TICK_RATE, if config.realtime { "realtime" } else { "headless" });

    tokio::select! {
        result = run_matches(&config) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, stopping");
        }
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_new(log_level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Play every configured match.
async fn run_matches(config: &AppConfig) -> anyhow::Result<()> {
    let mut controller = MatchController::new(config.match_config());

    let mut ticker = config.realtime.then(|| {
        let mut ticker = interval(Duration::from_secs_f64(FRAME_DT));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });

    let (mut wins, mut draws, mut aborted) = (0u32, 0u32, 0u32);

    for index in 1..=config.matches {
        info!("=== Match {}/{} ===", index, config.matches);

        let mut inputs = vec![InputEvent::StartMatch(config.roster.clone())];
        let mut frames = 0u64;

        loop {
            match ticker.as_mut() {
                Some(ticker) => {
                    ticker.tick().await;
                }
                // Let the shutdown signal get polled
                None => tokio::task::yield_now().await,
            }

            let report = controller.advance(FRAME_DT, &inputs)?;
            inputs.clear();

            if report.simulated {
                frames += 1;
            }
            for event in &report.events {
                log_event(event);
            }

            if let Some(summary) = report.finished {
                match summary.outcome {
                    MatchOutcome::Winner { .. } => wins += 1,
                    _ => draws += 1,
                }
                info!("Summary: {}", serde_json::to_string(&summary)?);
                info!("Final State Hash: {}", summary.state_hash);
            }

            match controller.state() {
                ControllerState::Selecting => break,
                // Nobody is watching the celebration in headless mode
                ControllerState::RoundEnd { .. } if ticker.is_none() => {
                    inputs.push(InputEvent::Restart);
                }
                ControllerState::RoundEnd { .. } => {}
                ControllerState::Running if frames >= config.max_frames => {
                    warn!("Match {} hit the {} frame cap, aborting", index, config.max_frames);
                    controller.abort_match()?;
                    aborted += 1;
                    break;
                }
                ControllerState::Running => {}
            }
        }
    }

    info!("=== Results ===");
    info!("Decided: {}, no survivors: {}, aborted: {}", wins, draws, aborted);
    Ok(())
}

fn log_event(event: &GameEvent) {
    match &event.data {
        GameEventData::FighterEliminated { fighter, kind, health } => {
            info!("Frame {}: {} ({}) eliminated at {} health", event.frame, fighter, kind.display_name(), health);
        }
        GameEventData::Exploded { creeper, position } => {
            info!("Frame {}: {} exploded at {}", event.frame, creeper, position);
        }
        GameEventData::MatchEnded { outcome, frames } => {
            info!("Match ended after {} frames: {:?}", frames, outcome);
        }
        GameEventData::FightersCollided { first, second, ability } => {
            debug!("Frame {}: {} hit {} ({:?})", event.frame, first, second, ability);
        }
        GameEventData::ProjectileFired { owner, .. } => {
            debug!("Frame {}: {} fired", event.frame, owner);
        }
        GameEventData::ProjectileHit { owner, target, .. } => {
            debug!("Frame {}: {} burned {}", event.frame, owner, target);
        }
    }
}
