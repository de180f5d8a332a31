//! Core simulation primitives.
//!
//! Vector math, the per-match random generator and state hashing.
//! Nothing in here knows about fighters or rules.

pub mod vec2;
pub mod rng;
pub mod hash;

// Re-export core types
pub use vec2::Vec2;
pub use rng::DeterministicRng;
pub use hash::{compute_state_hash, StateHash};
