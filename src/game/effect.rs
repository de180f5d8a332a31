//! Transient Effects
//!
//! Hit sparks and creeper explosions. They are purely visual: the
//! simulation spawns and expires them by time, the renderer reads them
//! through the snapshot.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::state::{EffectKind, MatchState, SimTime, TransientEffect};

/// Lifetime and size of each effect type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EffectConfig {
    /// Hit spark lifetime (seconds)
    pub hit_duration: f64,
    /// Hit spark final radius
    pub hit_radius: f64,
    /// Explosion lifetime (seconds)
    pub explosion_duration: f64,
    /// Explosion final radius
    pub explosion_radius: f64,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            hit_duration: 0.15,
            hit_radius: 32.0,
            explosion_duration: 0.5,
            explosion_radius: 120.0,
        }
    }
}

impl EffectConfig {
    /// Build an effect of the given kind starting at `now`.
    pub fn make(&self, kind: EffectKind, position: Vec2, now: SimTime) -> TransientEffect {
        let (duration, max_radius) = match kind {
            EffectKind::HitSpark => (self.hit_duration, self.hit_radius),
            EffectKind::Explosion => (self.explosion_duration, self.explosion_radius),
        };

        TransientEffect {
            kind,
            position,
            start_time: now,
            duration,
            max_radius,
            active: true,
        }
    }
}

/// Spawn a hit spark at a collision point.
pub fn spawn_hit_spark(state: &mut MatchState, position: Vec2, now: SimTime, config: &EffectConfig) {
    state.effects.push(config.make(EffectKind::HitSpark, position, now));
}

/// Spawn an explosion at a blast center.
pub fn spawn_explosion(state: &mut MatchState, position: Vec2, now: SimTime, config: &EffectConfig) {
    state.effects.push(config.make(EffectKind::Explosion, position, now));
}

/// Expire effects whose lifetime has passed.
pub fn update_effects(effects: &mut [TransientEffect], now: SimTime) {
    for effect in effects.iter_mut() {
        effect.update(now);
    }
}
