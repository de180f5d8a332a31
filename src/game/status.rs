//! Status Effects
//!
//! Poison and fire are damage-over-time statuses that deal one point of
//! damage per elapsed second of simulation time. Herobrine's visibility
//! window also decays here.

use serde::{Serialize, Deserialize};

use crate::core::hash::StateHasher;
use crate::game::state::{CharacterKind, FighterState, SimTime};

/// Damage-over-time configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Seconds between damage ticks
    pub tick_interval: f64,
    /// Damage per poison tick
    pub poison_damage: i32,
    /// Damage per fire tick
    pub fire_damage: i32,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            tick_interval: 1.0,
            poison_damage: 1,
            fire_damage: 1,
        }
    }
}

/// A countdown status (poison or fire).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Currently ticking
    pub active: bool,
    /// Damage ticks left
    pub remaining: u32,
    /// Time of the last tick (or of application)
    pub last_tick: SimTime,
}

impl StatusEffect {
    /// Start (or restart) the status with `ticks` ticks left.
    pub fn apply(&mut self, ticks: u32, now: SimTime) {
        self.active = ticks > 0;
        self.remaining = ticks;
        self.last_tick = now;
    }

    /// Remove the status immediately.
    pub fn clear(&mut self) {
        self.active = false;
        self.remaining = 0;
    }

    /// Advance to `now`, returning how many damage ticks fired.
    ///
    /// At most one tick fires per call, so a long frame never deals a
    /// burst of catch-up damage.
    pub fn process(&mut self, now: SimTime, interval: f64) -> u32 {
        if !self.active {
            return 0;
        }
        if now - self.last_tick < interval {
            return 0;
        }

        self.remaining = self.remaining.saturating_sub(1);
        self.last_tick = now;
        if self.remaining == 0 {
            self.active = false;
        }
        1
    }

    /// Hash this status.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_bool(self.active);
        hasher.update_u32(self.remaining);
        hasher.update_f64(self.last_tick);
    }
}

/// Apply one frame of status processing to a fighter.
///
/// Order is poison, fire, then visibility. Returns the total damage dealt.
pub fn process_status_effects(fighter: &mut FighterState, now: SimTime, config: &StatusConfig) -> i32 {
    let mut damage = 0;

    let poison_ticks = fighter.poison.process(now, config.tick_interval);
    damage += poison_ticks as i32 * config.poison_damage;

    let fire_ticks = fighter.fire.process(now, config.tick_interval);
    damage += fire_ticks as i32 * config.fire_damage;

    if damage > 0 {
        fighter.take_damage(damage);
    }

    if fighter.kind == CharacterKind::Herobrine && fighter.visible && now >= fighter.visible_until {
        fighter.visible = false;
    }

    damage
}
