//! # Ball Arena
//!
//! Frame-stepped simulation core for a two-fighter arena brawler.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        BALL ARENA                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Simulation primitives                   │
//! │  ├── vec2.rs       - 2D vector math                          │
//! │  ├── rng.rs        - Seeded Xorshift128+ PRNG                │
//! │  └── hash.rs       - State hashing                           │
//! │                                                              │
//! │  game/             - Combat rules (deterministic)            │
//! │  ├── state.rs      - Fighters, projectiles, match state      │
//! │  ├── tick.rs       - Frame pipeline                          │
//! │  ├── physics.rs    - Motion, walls, elastic collisions       │
//! │  ├── status.rs     - Poison, fire, visibility                │
//! │  ├── projectile.rs - Blaze shots                             │
//! │  ├── ability.rs    - Collision ability table                 │
//! │  ├── collision.rs  - Fighter pair pass                       │
//! │  ├── effect.rs     - Hit sparks and explosions               │
//! │  ├── snapshot.rs   - Render view                             │
//! │  ├── events.rs     - Frame events                            │
//! │  └── input.rs      - Roster and restart inputs               │
//! │                                                              │
//! │  session/          - Match lifecycle                         │
//! │  └── controller.rs - Selecting / running / round end         │
//! │                                                              │
//! │  config.rs         - Driver environment config               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Driving a Match
//!
//! The caller owns the clock. Each call to
//! [`MatchController::advance`](session::MatchController::advance) moves
//! simulation time forward, applies inputs and simulates one frame:
//!
//! ```
//! use ball_arena::{CharacterKind, MatchConfig, MatchController, FRAME_DT};
//!
//! let mut controller = MatchController::new(MatchConfig::default());
//! controller.start_match(&[CharacterKind::Blaze, CharacterKind::Steve]).unwrap();
//! for _ in 0..60 {
//!     controller.advance(FRAME_DT, &[]).unwrap();
//! }
//! let view = controller.snapshot();
//! assert!(view.clock > 0.99);
//! ```
//!
//! ## Determinism
//!
//! With a pinned seed and the same sequence of time steps the simulation
//! produces identical state. All randomness comes from the per-match
//! seeded generator and fighters are always visited in roster order.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod session;
pub mod config;

// Re-export commonly used types
pub use crate::core::vec2::Vec2;
pub use crate::core::rng::DeterministicRng;
pub use crate::game::state::{CharacterKind, FighterId, MatchOutcome, MatchState};
pub use crate::game::tick::MatchConfig;
pub use crate::game::input::InputEvent;
pub use crate::session::{MatchController, MatchError};
pub use crate::config::AppConfig;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Combat frame rate (Hz)
pub const TICK_RATE: u32 = 60;

/// Seconds per combat frame
pub const FRAME_DT: f64 = 1.0 / TICK_RATE as f64;
