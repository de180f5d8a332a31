//! Game Logic Module
//!
//! All combat simulation code. Deterministic for a given seed and
//! sequence of frame times.
//!
//! ## Module Structure
//!
//! - `state`: Fighters, projectiles, effects, match state
//! - `physics`: Motion, wall bounces, elastic collisions
//! - `status`: Poison, fire and Herobrine visibility
//! - `projectile`: Blaze shots
//! - `ability`: Priority-ordered collision abilities
//! - `collision`: Per-frame fighter pair pass
//! - `effect`: Hit sparks and explosions
//! - `tick`: Frame pipeline
//! - `snapshot`: Read-only render view
//! - `events`: Events reported to the driver
//! - `input`: Between-match inputs

pub mod input;
pub mod state;
pub mod tick;
pub mod physics;
pub mod status;
pub mod projectile;
pub mod ability;
pub mod collision;
pub mod effect;
pub mod snapshot;
pub mod events;

// Re-export key types
pub use input::InputEvent;
pub use state::{CharacterKind, FighterId, FighterState, MatchOutcome, MatchPhase, MatchState};
pub use tick::{MatchConfig, TickResult};
pub use snapshot::MatchSnapshot;
pub use events::GameEvent;
